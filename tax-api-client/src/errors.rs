use tax_core::RateSourceError;
use thiserror::Error;

use crate::transport::TransportError;

/// Failure of one fetch attempt, as seen by the retry loop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The body decoded, but does not carry a usable bracket list.
    #[error("{0}")]
    Malformed(String),
}

impl FetchError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Transport(err) => err.status_code(),
            Self::Malformed(_) => None,
        }
    }

    pub fn error_code(&self) -> Option<&'static str> {
        match self {
            Self::Transport(err) => err.error_code(),
            Self::Malformed(_) => Some("malformed"),
        }
    }
}

/// Classifies the final failure of a request into the rate-source taxonomy.
pub fn map_external_error(
    error: &FetchError,
    year: i32,
) -> RateSourceError {
    match error {
        FetchError::Malformed(message) => RateSourceError::Malformed {
            year,
            message: message.clone(),
        },
        FetchError::Transport(TransportError::Decode { message }) => RateSourceError::Malformed {
            year,
            message: format!("Invalid tax brackets payload: {message}"),
        },
        FetchError::Transport(TransportError::Status { status, .. })
            if (400..500).contains(status) =>
        {
            RateSourceError::Rejected {
                year,
                status: *status,
            }
        }
        FetchError::Transport(TransportError::Status { status, .. }) => {
            RateSourceError::Unavailable {
                year,
                reason: format!("status {status}"),
            }
        }
        FetchError::Transport(TransportError::Network { message, .. }) => {
            RateSourceError::Unavailable {
                year,
                reason: message.clone(),
            }
        }
    }
}
