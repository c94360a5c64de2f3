use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Flat, serializable form of a [`TaxBracket`].
///
/// This is the shape used inside cache snapshots and by the external rate
/// authority. A missing `max` means the bracket is open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracketPrimitives {
    pub min: Decimal,
    #[serde(default)]
    pub max: Option<Decimal>,
    pub rate: Decimal,
}

/// An income range taxed at a single marginal rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaxBracket {
    min: Decimal,
    max: Option<Decimal>,
    rate: Decimal,
}

impl TaxBracket {
    /// # Errors
    ///
    /// Returns [`ValidationError::Bracket`] if:
    /// - `min` is negative
    /// - `max` is present and not strictly greater than `min`
    /// - `rate` is outside `[0, 1]`
    pub fn new(
        min: Decimal,
        max: Option<Decimal>,
        rate: Decimal,
    ) -> Result<Self, ValidationError> {
        if min < Decimal::ZERO {
            return Err(ValidationError::Bracket(
                "Tax bracket min must be a positive number",
            ));
        }
        if max.is_some_and(|max| max <= min) {
            return Err(ValidationError::Bracket(
                "Tax bracket max must be greater than min",
            ));
        }
        if rate < Decimal::ZERO || rate > Decimal::ONE {
            return Err(ValidationError::Bracket(
                "Tax bracket rate must be between 0 and 1",
            ));
        }
        Ok(Self { min, max, rate })
    }

    pub fn from_primitives(primitives: TaxBracketPrimitives) -> Result<Self, ValidationError> {
        Self::new(primitives.min, primitives.max, primitives.rate)
    }

    pub fn min(&self) -> Decimal {
        self.min
    }

    /// Upper bound, or `None` for the open-ended top bracket.
    pub fn max(&self) -> Option<Decimal> {
        self.max
    }

    pub fn rate(&self) -> Decimal {
        self.rate
    }

    pub fn is_open_ended(&self) -> bool {
        self.max.is_none()
    }

    pub fn to_primitives(&self) -> TaxBracketPrimitives {
        TaxBracketPrimitives {
            min: self.min,
            max: self.max,
            rate: self.rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn builds_closed_bracket() {
        let bracket = TaxBracket::new(dec!(0), Some(dec!(50197)), dec!(0.15)).unwrap();

        assert_eq!(bracket.min(), dec!(0));
        assert_eq!(bracket.max(), Some(dec!(50197)));
        assert_eq!(bracket.rate(), dec!(0.15));
        assert!(!bracket.is_open_ended());
    }

    #[test]
    fn builds_open_ended_bracket() {
        let bracket = TaxBracket::new(dec!(221708), None, dec!(0.33)).unwrap();

        assert!(bracket.is_open_ended());
    }

    #[test]
    fn rejects_negative_min() {
        assert_eq!(
            TaxBracket::new(dec!(-1), Some(dec!(10)), dec!(0.1)),
            Err(ValidationError::Bracket(
                "Tax bracket min must be a positive number"
            ))
        );
    }

    #[test]
    fn rejects_max_equal_to_min() {
        assert_eq!(
            TaxBracket::new(dec!(100), Some(dec!(100)), dec!(0.1)),
            Err(ValidationError::Bracket(
                "Tax bracket max must be greater than min"
            ))
        );
    }

    #[test]
    fn rejects_max_below_min() {
        assert!(TaxBracket::new(dec!(100), Some(dec!(50)), dec!(0.1)).is_err());
    }

    #[test]
    fn rejects_rate_above_one() {
        assert_eq!(
            TaxBracket::new(dec!(0), None, dec!(1.01)),
            Err(ValidationError::Bracket(
                "Tax bracket rate must be between 0 and 1"
            ))
        );
    }

    #[test]
    fn rejects_negative_rate() {
        assert!(TaxBracket::new(dec!(0), None, dec!(-0.01)).is_err());
    }

    #[test]
    fn accepts_rate_bounds() {
        assert!(TaxBracket::new(dec!(0), Some(dec!(1)), dec!(0)).is_ok());
        assert!(TaxBracket::new(dec!(0), Some(dec!(1)), dec!(1)).is_ok());
    }

    #[test]
    fn primitives_deserialize_without_max() {
        let primitives: TaxBracketPrimitives =
            serde_json::from_str(r#"{"min": 221708, "rate": 0.33}"#).unwrap();

        assert_eq!(
            primitives,
            TaxBracketPrimitives {
                min: dec!(221708),
                max: None,
                rate: dec!(0.33),
            }
        );
    }

    #[test]
    fn primitives_preserve_bracket() {
        let bracket = TaxBracket::new(dec!(50197), Some(dec!(100392)), dec!(0.205)).unwrap();

        assert_eq!(TaxBracket::from_primitives(bracket.to_primitives()), Ok(bracket));
    }
}
