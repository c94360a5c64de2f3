use std::time::Duration;

use tax_core::TaxServiceConfig;

/// Year whose bracket table is considered stable. Only requests for this
/// exact year fall back to the year-agnostic endpoint after retries run out.
pub const FALLBACK_TAX_YEAR: i32 = 2022;

/// Request-scoped metadata travelling with every network call, so events
/// raised while retrying are attributed to the year that was asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    pub year: i32,
}

impl RequestContext {
    pub fn for_year(year: i32) -> Self {
        Self { year }
    }
}

/// Connection and retry settings for [`crate::ExternalTaxApiClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalTaxApiConfig {
    pub base_url: String,
    /// Bound on each individual attempt; there is no overall deadline.
    pub timeout: Duration,
    /// Total attempts, first one included.
    pub max_attempts: u32,
    pub retry_backoff: Duration,
}

impl From<&TaxServiceConfig> for ExternalTaxApiConfig {
    fn from(config: &TaxServiceConfig) -> Self {
        Self {
            base_url: config.tax_api_base_url.clone(),
            timeout: config.tax_api_timeout,
            max_attempts: config.tax_api_max_retries,
            retry_backoff: config.tax_api_retry_backoff,
        }
    }
}

pub(crate) fn tax_year_url(
    base_url: &str,
    year: i32,
) -> String {
    format!("{base_url}/tax-calculator/tax-year/{year}")
}

pub(crate) fn stable_url(base_url: &str) -> String {
    format!("{base_url}/tax-calculator/")
}
