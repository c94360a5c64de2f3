//! Use cases composing the ports with the calculator.

pub mod calculate_tax;
pub mod tax_rate_lookup;

pub use calculate_tax::CalculateTax;
pub use tax_rate_lookup::{GetTaxRateByYear, cache_key};
