//! Cache-aside lookup of the bracket table for a year.
//!
//! Reads go to the cache first and fall back to the rate source on a miss;
//! whatever the source finds is written back with a fixed TTL before it is
//! returned. Cache failures never fail a lookup: a read error counts as a
//! miss and a write error is logged and skipped.
//!
//! Concurrent misses for the same year are not coalesced. Each caller fetches
//! independently; all writers store the same data, so the duplicate work is
//! wasteful but never incorrect.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::TaxError;
use crate::models::{TaxRate, TaxYear};
use crate::ports::{TaxRateCache, TaxRateSource};

const CACHE_KEY_PREFIX: &str = "tax-rate:";

/// Cache key for the bracket table of `year`.
pub fn cache_key(year: TaxYear) -> String {
    format!("{CACHE_KEY_PREFIX}{year}")
}

/// The "get tax rate by year" use case.
#[derive(Clone)]
pub struct GetTaxRateByYear {
    cache: Arc<dyn TaxRateCache>,
    source: Arc<dyn TaxRateSource>,
    cache_ttl: Duration,
}

impl GetTaxRateByYear {
    pub fn new(
        cache: Arc<dyn TaxRateCache>,
        source: Arc<dyn TaxRateSource>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            cache,
            source,
            cache_ttl,
        }
    }

    /// Resolves the bracket table for `year`.
    ///
    /// Returns `Ok(None)` when the source has no data for the year. Absence is
    /// not cached, so a later call can succeed once the authority is updated.
    ///
    /// # Errors
    ///
    /// Only rate-source failures are returned; cache failures are absorbed.
    pub async fn execute(
        &self,
        year: TaxYear,
    ) -> Result<Option<TaxRate>, TaxError> {
        let key = cache_key(year);

        if let Some(rate) = self.read_cached(&key).await {
            return Ok(Some(rate));
        }

        let Some(rate) = self.source.find_by_year(year).await? else {
            debug!(year = year.value(), "rate source has no data for year");
            return Ok(None);
        };

        self.write_cached(&key, &rate).await;

        Ok(Some(rate))
    }

    async fn read_cached(
        &self,
        key: &str,
    ) -> Option<TaxRate> {
        let snapshot = match self.cache.get(key).await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                debug!(key, "tax rate cache miss");
                return None;
            }
            Err(error) => {
                warn!(key, %error, "tax rate cache read failed; treating as miss");
                return None;
            }
        };

        match TaxRate::from_snapshot(snapshot) {
            Ok(rate) => {
                debug!(key, "tax rate cache hit");
                Some(rate)
            }
            Err(error) => {
                warn!(key, %error, "cached tax rate failed validation; treating as miss");
                None
            }
        }
    }

    async fn write_cached(
        &self,
        key: &str,
        rate: &TaxRate,
    ) {
        let ttl_seconds = self.cache_ttl.as_secs();
        match self.cache.set(key, &rate.to_snapshot(), self.cache_ttl).await {
            Ok(()) => debug!(key, ttl_seconds, "tax rate cached"),
            Err(error) => warn!(key, ttl_seconds, %error, "tax rate cache write failed"),
        }
    }
}
