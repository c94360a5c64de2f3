use async_trait::async_trait;
use tax_core::ports::{CacheConfig, CacheFactory};
use tax_core::{CacheError, TaxRateCache};

use crate::cache::SqliteCache;

/// [`CacheFactory`] for SQLite.
///
/// Register this with a [`tax_core::ports::CacheRegistry`] to make the
/// `"sqlite"` backend available:
///
/// ```rust,no_run
/// use tax_cache_sqlite::SqliteCacheFactory;
/// use tax_core::ports::CacheRegistry;
///
/// let mut registry = CacheRegistry::new();
/// registry.register(Box::new(SqliteCacheFactory));
/// ```
pub struct SqliteCacheFactory;

#[async_trait]
impl CacheFactory for SqliteCacheFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Opens the database described by `config.connection_string` and
    /// applies the cache migrations.
    async fn create(
        &self,
        config: &CacheConfig,
    ) -> Result<Box<dyn TaxRateCache>, CacheError> {
        let cache = SqliteCache::new(&config.connection_string)
            .await
            .map_err(|e| CacheError::Configuration(format!("{e:#}")))?;
        cache
            .run_migrations()
            .await
            .map_err(|e| CacheError::Backend(format!("{e:#}")))?;
        Ok(Box::new(cache))
    }
}
