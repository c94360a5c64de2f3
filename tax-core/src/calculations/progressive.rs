//! Progressive (marginal-rate) tax calculation.
//!
//! Each bracket taxes only the slice of the salary that falls inside it:
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Salary ≤ 0: no tax, no bands |
//! | 2    | For each bracket with `min < salary`, cap the upper bound at the salary (open-ended brackets use the salary) |
//! | 3    | Taxable slice = `min(salary, upper) - min`; skip empty slices |
//! | 4    | Band tax = slice × rate, rounded per band; the running total stays unrounded |
//! | 5    | Total tax and effective rate (total / salary) rounded half up to 2 dp |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::calculations::ProgressiveTaxCalculator;
//! use tax_core::{Salary, TaxBracket};
//!
//! let brackets = vec![
//!     TaxBracket::new(dec!(0), Some(dec!(50197)), dec!(0.15)).unwrap(),
//!     TaxBracket::new(dec!(50197), Some(dec!(100392)), dec!(0.205)).unwrap(),
//!     TaxBracket::new(dec!(100392), None, dec!(0.26)).unwrap(),
//! ];
//!
//! let calculator = ProgressiveTaxCalculator::new(&brackets);
//! let result = calculator.calculate(Salary::new(dec!(100000)).unwrap());
//!
//! assert_eq!(result.total_tax, dec!(17739.17));
//! assert_eq!(result.effective_rate, dec!(0.18));
//! assert_eq!(result.bands.len(), 2);
//! ```

use rust_decimal::Decimal;

use crate::calculations::common::round_half_up;
use crate::models::{BandTaxResult, Salary, TaxBracket, TaxCalculation};

/// Calculator over an ordered bracket table.
///
/// The brackets are trusted as given: they are not sorted and their
/// contiguity is not checked here.
#[derive(Debug, Clone)]
pub struct ProgressiveTaxCalculator<'a> {
    tax_brackets: &'a [TaxBracket],
}

impl<'a> ProgressiveTaxCalculator<'a> {
    pub fn new(tax_brackets: &'a [TaxBracket]) -> Self {
        Self { tax_brackets }
    }

    /// Computes the total tax, the effective rate and the per-band breakdown.
    pub fn calculate(
        &self,
        salary: Salary,
    ) -> TaxCalculation {
        let salary = salary.value();

        if salary <= Decimal::ZERO {
            return TaxCalculation::zero();
        }

        let mut total_tax = Decimal::ZERO;
        let mut bands = Vec::new();

        for bracket in self.tax_brackets {
            if salary <= bracket.min() {
                continue;
            }

            let taxable_income = self.taxable_in_band(salary, bracket);
            if taxable_income <= Decimal::ZERO {
                continue;
            }

            let tax = taxable_income * bracket.rate();
            total_tax += tax;

            bands.push(BandTaxResult {
                min: bracket.min(),
                max: bracket.max(),
                rate: bracket.rate(),
                taxable_income,
                tax: round_half_up(tax),
            });
        }

        TaxCalculation {
            total_tax: round_half_up(total_tax),
            effective_rate: self.effective_rate(total_tax, salary),
            bands,
        }
    }

    /// Portion of `salary` that falls inside `bracket`.
    fn taxable_in_band(
        &self,
        salary: Decimal,
        bracket: &TaxBracket,
    ) -> Decimal {
        let upper = bracket.max().unwrap_or(salary);
        salary.min(upper) - bracket.min()
    }

    fn effective_rate(
        &self,
        total_tax: Decimal,
        salary: Decimal,
    ) -> Decimal {
        round_half_up(total_tax / salary)
    }
}
