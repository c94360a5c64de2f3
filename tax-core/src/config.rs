//! Runtime configuration for the tax-rate pipeline.
//!
//! Every setting is required; loading fails on the first missing or
//! malformed value instead of falling back to a default.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Environment variable {name} must be a valid number, got '{value}'")]
    Invalid { name: &'static str, value: String },

    #[error("Environment variable {name} must be at least {min}")]
    OutOfRange { name: &'static str, min: u64 },
}

/// Names of the environment variables read by [`TaxServiceConfig::from_env`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvVar {
    TaxApiBaseUrl,
    TaxApiTimeoutMs,
    TaxApiMaxRetries,
    TaxApiRetryBackoffMs,
    TaxRateCacheTtlSeconds,
}

impl EnvVar {
    pub const ALL: [EnvVar; 5] = [
        Self::TaxApiBaseUrl,
        Self::TaxApiTimeoutMs,
        Self::TaxApiMaxRetries,
        Self::TaxApiRetryBackoffMs,
        Self::TaxRateCacheTtlSeconds,
    ];

    /// Inverse of [`EnvVar::as_str`].
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|var| var.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TaxApiBaseUrl => "TAX_API_BASE_URL",
            Self::TaxApiTimeoutMs => "TAX_API_TIMEOUT_MS",
            Self::TaxApiMaxRetries => "TAX_API_MAX_RETRIES",
            Self::TaxApiRetryBackoffMs => "TAX_API_RETRY_BACKOFF_MS",
            Self::TaxRateCacheTtlSeconds => "TAX_RATE_CACHE_TTL_SECONDS",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxServiceConfig {
    /// Base URL of the external tax authority, without trailing slash.
    pub tax_api_base_url: String,
    /// Upper bound for a single network attempt.
    pub tax_api_timeout: Duration,
    /// Total attempts per request, first attempt included. Always ≥ 1.
    pub tax_api_max_retries: u32,
    /// Backoff unit; attempt `n` waits `n × unit` before the next attempt.
    pub tax_api_retry_backoff: Duration,
    pub cache_ttl: Duration,
}

impl TaxServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads the configuration through an arbitrary lookup, e.g. a map in
    /// tests or a secrets store.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = require_string(&lookup, EnvVar::TaxApiBaseUrl)?;
        let timeout_ms = require_number(&lookup, EnvVar::TaxApiTimeoutMs)?;
        let max_retries = require_number(&lookup, EnvVar::TaxApiMaxRetries)?;
        let backoff_ms = require_number(&lookup, EnvVar::TaxApiRetryBackoffMs)?;
        let ttl_seconds = require_number(&lookup, EnvVar::TaxRateCacheTtlSeconds)?;

        Self::new(base_url, timeout_ms, max_retries, backoff_ms, ttl_seconds)
    }

    /// Builds a configuration from raw values, applying the same checks as
    /// [`TaxServiceConfig::from_lookup`].
    pub fn new(
        tax_api_base_url: String,
        timeout_ms: u64,
        max_retries: u64,
        retry_backoff_ms: u64,
        cache_ttl_seconds: u64,
    ) -> Result<Self, ConfigError> {
        let tax_api_max_retries = u32::try_from(max_retries)
            .ok()
            .filter(|attempts| *attempts >= 1)
            .ok_or(ConfigError::OutOfRange {
                name: EnvVar::TaxApiMaxRetries.as_str(),
                min: 1,
            })?;

        Ok(Self {
            tax_api_base_url: tax_api_base_url.trim_end_matches('/').to_string(),
            tax_api_timeout: Duration::from_millis(timeout_ms),
            tax_api_max_retries,
            tax_api_retry_backoff: Duration::from_millis(retry_backoff_ms),
            cache_ttl: Duration::from_secs(cache_ttl_seconds),
        })
    }
}

fn require_string<F>(
    lookup: &F,
    var: EnvVar,
) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var.as_str())
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::Missing(var.as_str()))
}

fn require_number<F>(
    lookup: &F,
    var: EnvVar,
) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = require_string(lookup, var)?;
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name: var.as_str(),
        value,
    })
}
