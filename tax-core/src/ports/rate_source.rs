use async_trait::async_trait;
use thiserror::Error;

use crate::error::ErrorCategory;
use crate::models::{TaxRate, TaxYear};

/// Terminal failures of a rate source, after any retries it performs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateSourceError {
    /// The authority answered, but without a usable bracket table.
    #[error("{message}")]
    Malformed { year: i32, message: String },

    /// The authority refused the request (4xx).
    #[error("Tax API rejected request for year {year}")]
    Rejected { year: i32, status: u16 },

    /// 5xx, no response at all, or any failure that could not be classified.
    #[error("Tax API unavailable for year {year}: {reason}")]
    Unavailable { year: i32, reason: String },
}

impl RateSourceError {
    pub fn year(&self) -> i32 {
        match self {
            Self::Malformed { year, .. }
            | Self::Rejected { year, .. }
            | Self::Unavailable { year, .. } => *year,
        }
    }

    /// Rejections and malformed payloads are our integration's fault, so they
    /// surface as a bad gateway rather than as a caller error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Malformed { .. } | Self::Rejected { .. } => ErrorCategory::BadGateway,
            Self::Unavailable { .. } => ErrorCategory::ServiceUnavailable,
        }
    }
}

/// Source of truth for bracket tables.
#[async_trait]
pub trait TaxRateSource: Send + Sync {
    /// `Ok(None)` means the authority has no data for `year`.
    async fn find_by_year(
        &self,
        year: TaxYear,
    ) -> Result<Option<TaxRate>, RateSourceError>;
}
