mod salary;
mod tax_bracket;
mod tax_calculation;
mod tax_rate;
mod tax_year;

pub use salary::Salary;
pub use tax_bracket::{TaxBracket, TaxBracketPrimitives};
pub use tax_calculation::{BandTaxResult, CalculateTaxResult, TaxCalculation};
pub use tax_rate::{TaxRate, TaxRateSnapshot};
pub use tax_year::{SUPPORTED_TAX_YEARS, TaxYear};
