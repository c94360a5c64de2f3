//! Wiring between configuration, the cache backend, the remote rate source
//! and the use cases.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use tax_api_client::{
    ExternalTaxApiClient, ExternalTaxApiConfig, ExternalTaxRateAdapter, HttpTransport,
};
use tax_cache_sqlite::SqliteCacheFactory;
use tax_core::ports::{CacheConfig, CacheRegistry, MemoryCacheFactory};
use tax_core::services::{CalculateTax, GetTaxRateByYear};
use tax_core::{
    CacheError, CalculateTaxResult, Salary, TaxBracket, TaxError, TaxRate, TaxRateCache,
    TaxServiceConfig, TaxYear,
};
use tracing::debug;

/// Registry with every cache backend this binary ships.
pub fn build_registry() -> CacheRegistry {
    let mut registry = CacheRegistry::new();
    registry.register(Box::new(MemoryCacheFactory));
    registry.register(Box::new(SqliteCacheFactory));
    registry
}

pub async fn open_cache(config: &CacheConfig) -> Result<Arc<dyn TaxRateCache>, CacheError> {
    debug!(backend = %config.backend, "opening tax rate cache");
    let cache = build_registry().create(config).await?;
    Ok(Arc::from(cache))
}

/// Both caller-facing operations over one shared cache and rate source.
#[derive(Clone)]
pub struct TaxService {
    tax_rates: GetTaxRateByYear,
    calculate_tax: CalculateTax,
}

impl TaxService {
    pub fn new(
        config: &TaxServiceConfig,
        cache: Arc<dyn TaxRateCache>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let client = ExternalTaxApiClient::new(transport, ExternalTaxApiConfig::from(config));
        let source = Arc::new(ExternalTaxRateAdapter::new(client));
        let tax_rates = GetTaxRateByYear::new(cache, source, config.cache_ttl);

        Self {
            calculate_tax: CalculateTax::new(tax_rates.clone()),
            tax_rates,
        }
    }

    /// `year` and `salary` arrive as raw text and are validated here.
    pub async fn calculate(
        &self,
        year: &str,
        salary: &str,
    ) -> Result<CalculateTaxResult, TaxError> {
        let year: TaxYear = year.parse()?;
        let salary: Salary = salary.parse()?;
        self.calculate_tax.execute(year, salary).await
    }

    /// The bracket table for `year`, or `None` when the authority has none.
    pub async fn rates(
        &self,
        year: &str,
    ) -> Result<Option<TaxRateView>, TaxError> {
        let year: TaxYear = year.parse()?;
        let rate = self.tax_rates.execute(year).await?;
        Ok(rate.as_ref().map(TaxRateView::from))
    }
}

/// Caller-facing bracket table. Amounts and rates are JSON numbers, unlike
/// the cached snapshot which keeps them as exact decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxRateView {
    pub year: i32,
    pub brackets: Vec<BracketView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BracketView {
    #[serde(with = "rust_decimal::serde::float")]
    pub min: Decimal,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub max: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float")]
    pub rate: Decimal,
}

impl From<&TaxRate> for TaxRateView {
    fn from(rate: &TaxRate) -> Self {
        Self {
            year: rate.year().value(),
            brackets: rate.brackets().iter().map(BracketView::from).collect(),
        }
    }
}

impl From<&TaxBracket> for BracketView {
    fn from(bracket: &TaxBracket) -> Self {
        Self {
            min: bracket.min(),
            max: bracket.max(),
            rate: bracket.rate(),
        }
    }
}

/// Machine-readable rendering of a [`TaxError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub status: u16,
    pub error: &'static str,
    pub message: String,
}

impl From<&TaxError> for ErrorReport {
    fn from(err: &TaxError) -> Self {
        let category = err.category();
        Self {
            status: category.status_code(),
            error: category.as_str(),
            message: err.to_string(),
        }
    }
}
