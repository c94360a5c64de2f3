use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Serialize;

use crate::error::ValidationError;

const INVALID_NUMBER: &str = "Salary must be a valid number";
const NEGATIVE: &str = "Salary must be greater than or equal to 0";

/// Annual gross income. Always finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Salary(Decimal);

impl Salary {
    pub fn new(value: Decimal) -> Result<Self, ValidationError> {
        if value < Decimal::ZERO {
            return Err(ValidationError::Salary(NEGATIVE));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<f64> for Salary {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() {
            return Err(ValidationError::Salary(INVALID_NUMBER));
        }
        let decimal = Decimal::from_f64(value).ok_or(ValidationError::Salary(INVALID_NUMBER))?;
        Self::new(decimal)
    }
}

impl FromStr for Salary {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decimal = s
            .trim()
            .parse::<Decimal>()
            .map_err(|_| ValidationError::Salary(INVALID_NUMBER))?;
        Self::new(decimal)
    }
}

impl fmt::Display for Salary {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
