use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ValidationError;

/// Years for which bracket data can be requested.
pub const SUPPORTED_TAX_YEARS: [i32; 4] = [2019, 2020, 2021, 2022];

/// A validated tax year.
///
/// Construction is the only place the year is checked; everything downstream
/// can rely on [`TaxYear::value`] being a supported year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TaxYear(i32);

impl TaxYear {
    /// Validates `value` against [`SUPPORTED_TAX_YEARS`].
    pub fn new(value: i32) -> Result<Self, ValidationError> {
        Self::new_in(value, &SUPPORTED_TAX_YEARS)
    }

    /// Validates `value` against a caller-supplied set of years.
    pub fn new_in(
        value: i32,
        supported: &[i32],
    ) -> Result<Self, ValidationError> {
        if !supported.contains(&value) {
            return Err(ValidationError::Year("Year not supported"));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

impl FromStr for TaxYear {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<i32>()
            .map_err(|_| ValidationError::Year("Year must be integer"))?;
        Self::new(value)
    }
}

impl fmt::Display for TaxYear {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
