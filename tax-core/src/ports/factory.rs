//! Selection of the tax-rate cache backend at startup.
//!
//! Each backend crate exposes a [`CacheFactory`]; the binary registers the
//! ones it ships in a [`CacheRegistry`] and opens whichever one the
//! [`CacheConfig`] names.

use std::collections::HashMap;

use async_trait::async_trait;

use super::cache::{CacheError, TaxRateCache};

/// Which cache backend to open, and where.
///
/// `connection_string` is handed to the backend as-is: the in-memory cache
/// ignores it, SQLite takes a file path, `:memory:` or a `sqlite:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub backend: String,
    pub connection_string: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            connection_string: ":memory:".to_string(),
        }
    }
}

/// Opens one kind of tax-rate cache.
#[async_trait]
pub trait CacheFactory: Send + Sync {
    /// Name under which the backend is selected, e.g. `"sqlite"`.
    fn backend_name(&self) -> &'static str;

    async fn create(
        &self,
        config: &CacheConfig,
    ) -> Result<Box<dyn TaxRateCache>, CacheError>;
}

/// Cache backends known to the process, by name.
pub struct CacheRegistry {
    factories: HashMap<&'static str, Box<dyn CacheFactory>>,
}

impl CacheRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// A later factory with the same name wins.
    pub fn register(
        &mut self,
        factory: Box<dyn CacheFactory>,
    ) {
        self.factories.insert(factory.backend_name(), factory);
    }

    pub fn available_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Opens the cache named by `config.backend`.
    ///
    /// # Errors
    ///
    /// [`CacheError::Configuration`] for an unregistered backend name, or
    /// whatever the selected factory reports.
    pub async fn create(
        &self,
        config: &CacheConfig,
    ) -> Result<Box<dyn TaxRateCache>, CacheError> {
        let Some(factory) = self.factories.get(config.backend.as_str()) else {
            return Err(CacheError::Configuration(format!(
                "unknown cache backend '{}'; available: {:?}",
                config.backend,
                self.available_backends()
            )));
        };

        factory.create(config).await
    }
}

impl Default for CacheRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{TaxBracketPrimitives, TaxRateSnapshot};
    use crate::ports::MemoryCacheFactory;

    /// Records which backend was opened and with what connection string.
    struct RecordingFactory {
        name: &'static str,
        opened: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl CacheFactory for RecordingFactory {
        fn backend_name(&self) -> &'static str {
            self.name
        }

        async fn create(
            &self,
            config: &CacheConfig,
        ) -> Result<Box<dyn TaxRateCache>, CacheError> {
            self.opened
                .lock()
                .unwrap()
                .push(format!("{}:{}", self.name, config.connection_string));
            MemoryCacheFactory.create(config).await
        }
    }

    struct UnreachableFactory;

    #[async_trait]
    impl CacheFactory for UnreachableFactory {
        fn backend_name(&self) -> &'static str {
            "unreachable"
        }

        async fn create(
            &self,
            _config: &CacheConfig,
        ) -> Result<Box<dyn TaxRateCache>, CacheError> {
            Err(CacheError::Backend("connection refused".to_string()))
        }
    }

    fn config(
        backend: &str,
        connection_string: &str,
    ) -> CacheConfig {
        CacheConfig {
            backend: backend.to_string(),
            connection_string: connection_string.to_string(),
        }
    }

    fn snapshot_2021() -> TaxRateSnapshot {
        TaxRateSnapshot {
            year: 2021,
            brackets: vec![TaxBracketPrimitives {
                min: dec!(0),
                max: None,
                rate: dec!(0.15),
            }],
        }
    }

    // ============================================================================
    // Registration
    // ============================================================================

    #[test]
    fn default_config_selects_the_in_memory_cache() {
        assert_eq!(CacheConfig::default(), config("memory", ":memory:"));
    }

    #[test]
    fn lists_backends_by_name() {
        let opened = Arc::new(Mutex::new(Vec::new()));
        let mut registry = CacheRegistry::default();
        assert!(registry.available_backends().is_empty());

        registry.register(Box::new(RecordingFactory {
            name: "sqlite",
            opened: opened.clone(),
        }));
        registry.register(Box::new(MemoryCacheFactory));
        registry.register(Box::new(RecordingFactory {
            name: "sqlite",
            opened,
        }));

        assert_eq!(registry.available_backends(), vec!["memory", "sqlite"]);
    }

    // ============================================================================
    // Opening a cache
    // ============================================================================

    #[tokio::test]
    async fn opens_the_named_backend_with_its_connection_string() {
        let opened = Arc::new(Mutex::new(Vec::new()));
        let mut registry = CacheRegistry::new();
        for name in ["memory", "sqlite"] {
            registry.register(Box::new(RecordingFactory {
                name,
                opened: opened.clone(),
            }));
        }

        let cache = match registry.create(&config("sqlite", "rates.db")).await {
            Ok(cache) => cache,
            Err(e) => panic!("failed to open cache: {e:#?}"),
        };
        cache
            .set("tax-rate:2021", &snapshot_2021(), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(*opened.lock().unwrap(), vec!["sqlite:rates.db".to_string()]);
        assert_eq!(cache.get("tax-rate:2021").await, Ok(Some(snapshot_2021())));
    }

    #[tokio::test]
    async fn unknown_backend_lists_the_registered_ones() {
        let mut registry = CacheRegistry::new();
        registry.register(Box::new(MemoryCacheFactory));

        match registry.create(&config("redis", "redis://localhost")).await {
            Err(CacheError::Configuration(message)) => assert_eq!(
                message,
                "unknown cache backend 'redis'; available: [\"memory\"]"
            ),
            Err(other) => panic!("expected a configuration error, got {other:#?}"),
            Ok(_) => panic!("expected a configuration error, got a cache"),
        }
    }

    #[tokio::test]
    async fn backend_failure_is_returned_unchanged() {
        let mut registry = CacheRegistry::new();
        registry.register(Box::new(UnreachableFactory));

        match registry.create(&config("unreachable", "")).await {
            Err(err) => assert_eq!(err, CacheError::Backend("connection refused".to_string())),
            Ok(_) => panic!("expected the backend error"),
        }
    }
}
