use serde::{Deserialize, Serialize};

use super::{TaxBracket, TaxBracketPrimitives, TaxYear};
use crate::error::ValidationError;

/// Flat representation of a [`TaxRate`] used as the cache payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRateSnapshot {
    pub year: i32,
    pub brackets: Vec<TaxBracketPrimitives>,
}

/// The bracket table that applies to one tax year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxRate {
    year: TaxYear,
    brackets: Vec<TaxBracket>,
}

impl TaxRate {
    /// Pairs a year with already-validated brackets.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::BracketTable`] if the brackets are not in
    /// ascending `min` order, overlap, or an open-ended bracket is not last.
    pub fn new(
        year: TaxYear,
        brackets: Vec<TaxBracket>,
    ) -> Result<Self, ValidationError> {
        Self::validate_brackets(&brackets)?;
        Ok(Self { year, brackets })
    }

    /// Checks that a table is usable as a whole: ascending `min`, no
    /// overlap, and only the last bracket open-ended. Gaps are allowed.
    pub fn validate_brackets(brackets: &[TaxBracket]) -> Result<(), ValidationError> {
        for (index, pair) in brackets.windows(2).enumerate() {
            let (prev, next) = (&pair[0], &pair[1]);

            let Some(prev_max) = prev.max() else {
                return Err(ValidationError::BracketTable(format!(
                    "open-ended bracket at position {index} is not the last bracket"
                )));
            };
            if next.min() < prev.min() {
                return Err(ValidationError::BracketTable(format!(
                    "bracket at position {} starts below its predecessor",
                    index + 1
                )));
            }
            if next.min() < prev_max {
                return Err(ValidationError::BracketTable(format!(
                    "bracket at position {} overlaps its predecessor",
                    index + 1
                )));
            }
        }
        Ok(())
    }

    /// Rebuilds a rate from its snapshot, revalidating the year and every
    /// bracket.
    pub fn from_snapshot(snapshot: TaxRateSnapshot) -> Result<Self, ValidationError> {
        let year = TaxYear::new(snapshot.year)?;
        let brackets = snapshot
            .brackets
            .into_iter()
            .map(TaxBracket::from_primitives)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(year, brackets)
    }

    pub fn year(&self) -> TaxYear {
        self.year
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    pub fn to_snapshot(&self) -> TaxRateSnapshot {
        TaxRateSnapshot {
            year: self.year.value(),
            brackets: self.brackets.iter().map(TaxBracket::to_primitives).collect(),
        }
    }
}
