pub mod cache;
pub mod factory;
pub mod memory;
pub mod rate_source;

pub use cache::{CacheError, TaxRateCache};
pub use factory::{CacheConfig, CacheFactory, CacheRegistry};
pub use memory::{MemoryCache, MemoryCacheFactory};
pub use rate_source::{RateSourceError, TaxRateSource};
