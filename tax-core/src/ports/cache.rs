use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::TaxRateSnapshot;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("Cache backend error: {0}")]
    Backend(String),

    #[error("Cache codec error: {0}")]
    Codec(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Key-value store for tax rate snapshots.
///
/// Implementations own the encoding of the value. A miss is always a legal
/// answer, even right after a `set`.
#[async_trait]
pub trait TaxRateCache: Send + Sync {
    async fn get(
        &self,
        key: &str,
    ) -> Result<Option<TaxRateSnapshot>, CacheError>;

    async fn set(
        &self,
        key: &str,
        value: &TaxRateSnapshot,
        ttl: Duration,
    ) -> Result<(), CacheError>;
}
