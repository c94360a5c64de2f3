use rust_decimal::Decimal;
use serde::Serialize;

/// Contribution of a single bracket to the total tax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BandTaxResult {
    #[serde(with = "rust_decimal::serde::float")]
    pub min: Decimal,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub max: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float")]
    pub rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub taxable_income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax: Decimal,
}

/// Output of the progressive calculator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxCalculation {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_tax: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub effective_rate: Decimal,
    pub bands: Vec<BandTaxResult>,
}

impl TaxCalculation {
    pub fn zero() -> Self {
        Self {
            total_tax: Decimal::ZERO,
            effective_rate: Decimal::ZERO,
            bands: Vec::new(),
        }
    }
}

/// Caller-facing result of "calculate tax for (year, salary)".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateTaxResult {
    pub year: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub salary: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_tax: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub effective_rate: Decimal,
    pub taxes_by_band: Vec<BandTaxResult>,
}
