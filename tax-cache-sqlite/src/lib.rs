//! SQLite backend for the tax rate cache.

mod cache;
mod factory;

pub use cache::SqliteCache;
pub use factory::SqliteCacheFactory;
