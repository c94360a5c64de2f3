pub mod calculations;
pub mod config;
pub mod error;
pub mod models;
pub mod ports;
pub mod services;

pub use config::{ConfigError, TaxServiceConfig};
pub use error::{ErrorCategory, TaxError, ValidationError};
pub use models::*;
pub use ports::{CacheError, RateSourceError, TaxRateCache, TaxRateSource};
