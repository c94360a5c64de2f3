//! HTTP transport used by the external tax API client.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::types::RequestContext;

const USER_AGENT: &str = concat!("tax-api-client/", env!("CARGO_PKG_VERSION"));

/// A failed GET, before any retry decision is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The server answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// No usable response: connect failure, timeout, broken body, ...
    #[error("{message}")]
    Network {
        code: Option<&'static str>,
        message: String,
    },

    /// The response body was not JSON.
    #[error("invalid response body: {message}")]
    Decode { message: String },
}

impl TransportError {
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Network {
            code: Some("timeout"),
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn error_code(&self) -> Option<&'static str> {
        match self {
            Self::Status { .. } => Some("status"),
            Self::Network { code, .. } => *code,
            Self::Decode { .. } => Some("decode"),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::Status {
                status: status.as_u16(),
                message: err.to_string(),
            };
        }
        if err.is_decode() {
            return Self::Decode {
                message: err.to_string(),
            };
        }
        let code = if err.is_timeout() {
            Some("timeout")
        } else if err.is_connect() {
            Some("connect")
        } else if err.is_body() {
            Some("body")
        } else if err.is_request() {
            Some("request")
        } else {
            None
        };
        Self::Network {
            code,
            message: err.to_string(),
        }
    }
}

/// Issues GET requests and returns the decoded JSON body.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(
        &self,
        url: &str,
        context: &RequestContext,
    ) -> Result<Value, TransportError>;
}

/// [`HttpTransport`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http_client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, TransportError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(TransportError::from)?;
        Ok(Self { http_client })
    }

    pub fn with_client(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(
        &self,
        url: &str,
        context: &RequestContext,
    ) -> Result<Value, TransportError> {
        debug!(year = context.year, url, "querying external tax API");

        let response = self.http_client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| TransportError::Decode {
            message: e.to_string(),
        })
    }
}
