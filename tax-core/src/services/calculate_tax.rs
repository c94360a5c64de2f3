use tracing::info;

use super::tax_rate_lookup::GetTaxRateByYear;
use crate::calculations::ProgressiveTaxCalculator;
use crate::error::TaxError;
use crate::models::{CalculateTaxResult, Salary, TaxYear};

/// The "calculate tax for (year, salary)" use case.
#[derive(Clone)]
pub struct CalculateTax {
    tax_rates: GetTaxRateByYear,
}

impl CalculateTax {
    pub fn new(tax_rates: GetTaxRateByYear) -> Self {
        Self { tax_rates }
    }

    /// # Errors
    ///
    /// * [`TaxError::NotFound`] — no bracket data exists for `year`.
    /// * [`TaxError::RateSource`] — the brackets could not be resolved.
    pub async fn execute(
        &self,
        year: TaxYear,
        salary: Salary,
    ) -> Result<CalculateTaxResult, TaxError> {
        let tax_rate = self
            .tax_rates
            .execute(year)
            .await?
            .ok_or(TaxError::NotFound { year: year.value() })?;

        let calculation = ProgressiveTaxCalculator::new(tax_rate.brackets()).calculate(salary);

        info!(
            year = year.value(),
            %salary,
            total_tax = %calculation.total_tax,
            bands = calculation.bands.len(),
            "tax calculated"
        );

        Ok(CalculateTaxResult {
            year: year.value(),
            salary: salary.value(),
            total_tax: calculation.total_tax,
            effective_rate: calculation.effective_rate,
            taxes_by_band: calculation.bands,
        })
    }
}
