use thiserror::Error;

use crate::ports::RateSourceError;

/// Rejections raised while constructing a value object.
///
/// These are never retried; construction is the single legality checkpoint
/// for salaries, years and brackets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0}")]
    Salary(&'static str),

    #[error("{0}")]
    Year(&'static str),

    #[error("{0}")]
    Bracket(&'static str),

    #[error("Tax bracket table is invalid: {0}")]
    BracketTable(String),
}

/// Externally meaningful classification of a [`TaxError`].
///
/// The outer surface (HTTP layer, CLI) decides how to present each category;
/// the status codes mirror the gateway semantics the categories stand for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    BadRequest,
    NotFound,
    BadGateway,
    ServiceUnavailable,
}

impl ErrorCategory {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::NotFound => 404,
            Self::BadGateway => 502,
            Self::ServiceUnavailable => 503,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BadRequest => "bad_request",
            Self::NotFound => "not_found",
            Self::BadGateway => "bad_gateway",
            Self::ServiceUnavailable => "service_unavailable",
        }
    }
}

/// Errors crossing the boundary of the tax-rate use cases.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaxError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Tax rates not found for year {year}")]
    NotFound { year: i32 },

    #[error(transparent)]
    RateSource(#[from] RateSourceError),
}

impl TaxError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) => ErrorCategory::BadRequest,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::RateSource(err) => err.category(),
        }
    }
}
