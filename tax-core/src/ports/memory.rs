use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use super::cache::{CacheError, TaxRateCache};
use super::factory::{CacheConfig, CacheFactory};
use crate::models::TaxRateSnapshot;

#[derive(Debug, Clone)]
struct Entry {
    snapshot: TaxRateSnapshot,
    expires_at: Instant,
}

/// Process-local cache with per-entry expiry.
///
/// Expired entries are dropped lazily on read.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<String, Entry>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl TaxRateCache for MemoryCache {
    async fn get(
        &self,
        key: &str,
    ) -> Result<Option<TaxRateSnapshot>, CacheError> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if entry.expires_at > now {
                return Ok(Some(entry.snapshot.clone()));
            }
        }
        self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
        Ok(None)
    }

    async fn set(
        &self,
        key: &str,
        value: &TaxRateSnapshot,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let expires_at = Instant::now()
            .checked_add(ttl)
            .ok_or_else(|| CacheError::Backend(format!("ttl {ttl:?} out of range")))?;
        self.entries.insert(
            key.to_string(),
            Entry {
                snapshot: value.clone(),
                expires_at,
            },
        );
        Ok(())
    }
}

/// [`CacheFactory`] for the `"memory"` backend.
pub struct MemoryCacheFactory;

#[async_trait]
impl CacheFactory for MemoryCacheFactory {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create(
        &self,
        _config: &CacheConfig,
    ) -> Result<Box<dyn TaxRateCache>, CacheError> {
        Ok(Box::new(MemoryCache::new()))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::TaxBracketPrimitives;

    fn snapshot() -> TaxRateSnapshot {
        TaxRateSnapshot {
            year: 2022,
            brackets: vec![TaxBracketPrimitives {
                min: dec!(0),
                max: None,
                rate: dec!(0.15),
            }],
        }
    }

    #[tokio::test]
    async fn missing_key_is_a_miss() {
        let cache = MemoryCache::new();

        assert_eq!(cache.get("tax-rate:2022").await, Ok(None));
    }

    #[tokio::test]
    async fn stored_snapshot_is_returned() {
        let cache = MemoryCache::new();
        cache
            .set("tax-rate:2022", &snapshot(), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(cache.get("tax-rate:2022").await, Ok(Some(snapshot())));
    }

    #[tokio::test]
    async fn expired_entry_is_a_miss_and_is_evicted() {
        let cache = MemoryCache::new();
        cache
            .set("tax-rate:2022", &snapshot(), Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(cache.get("tax-rate:2022").await, Ok(None));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn set_overwrites_previous_value() {
        let cache = MemoryCache::new();
        let mut updated = snapshot();
        updated.brackets[0].rate = dec!(0.2);

        cache.set("k", &snapshot(), Duration::from_secs(60)).await.unwrap();
        cache.set("k", &updated, Duration::from_secs(60)).await.unwrap();

        assert_eq!(cache.get("k").await, Ok(Some(updated)));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn factory_creates_memory_cache() {
        assert_eq!(MemoryCacheFactory.backend_name(), "memory");

        let cache = MemoryCacheFactory
            .create(&CacheConfig::default())
            .await
            .unwrap();

        assert_eq!(cache.get("anything").await, Ok(None));
    }
}
