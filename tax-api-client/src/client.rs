use std::sync::Arc;
use std::time::Duration;

use tax_core::{RateSourceError, TaxBracket, TaxYear};
use tracing::{debug, warn};

use crate::errors::{FetchError, map_external_error};
use crate::events::{AttemptEvent, ClientEvent, EventSink, TracingEventSink, duration_ms};
use crate::fetch::{fetch_tax_brackets_for_year, get_stable_tax_brackets};
use crate::transport::{HttpTransport, TransportError};
use crate::types::{ExternalTaxApiConfig, FALLBACK_TAX_YEAR, RequestContext};

/// Client for the external tax authority.
///
/// Each call makes up to `max_attempts` timeout-bounded requests, waiting
/// `attempt × retry_backoff` between them. When every attempt fails and the
/// requested year is [`FALLBACK_TAX_YEAR`], one more request goes to the
/// year-agnostic endpoint.
#[derive(Clone)]
pub struct ExternalTaxApiClient {
    transport: Arc<dyn HttpTransport>,
    events: Arc<dyn EventSink>,
    config: ExternalTaxApiConfig,
}

impl ExternalTaxApiClient {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        config: ExternalTaxApiConfig,
    ) -> Self {
        Self::with_event_sink(transport, Arc::new(TracingEventSink), config)
    }

    pub fn with_event_sink(
        transport: Arc<dyn HttpTransport>,
        events: Arc<dyn EventSink>,
        config: ExternalTaxApiConfig,
    ) -> Self {
        Self {
            transport,
            events,
            config,
        }
    }

    pub fn config(&self) -> &ExternalTaxApiConfig {
        &self.config
    }

    /// Wait after failed attempt `attempt` (1-based).
    pub fn backoff_for(
        &self,
        attempt: u32,
    ) -> Duration {
        self.config.retry_backoff.saturating_mul(attempt)
    }

    /// Resolves the bracket list for `year`. An empty list means the
    /// authority has no data for that year.
    ///
    /// # Errors
    ///
    /// The last attempt's failure (or the fallback's, for
    /// [`FALLBACK_TAX_YEAR`]) mapped through [`map_external_error`].
    pub async fn get_tax_brackets(
        &self,
        year: TaxYear,
    ) -> Result<Vec<TaxBracket>, RateSourceError> {
        let context = RequestContext::for_year(year.value());
        let max_attempts = self.config.max_attempts.max(1);

        let mut attempt = 1;
        let last_error = loop {
            let backoff = self.backoff_for(attempt);
            match self.attempt_once(&context).await {
                Ok(brackets) => {
                    self.events.emit(&ClientEvent::Attempt(AttemptEvent::succeeded(
                        &context,
                        attempt,
                        max_attempts,
                        backoff,
                    )));
                    return Ok(brackets);
                }
                Err(error) => {
                    self.events.emit(&ClientEvent::Attempt(AttemptEvent::failed(
                        &context,
                        attempt,
                        max_attempts,
                        backoff,
                        &error,
                    )));
                    if attempt >= max_attempts {
                        break error;
                    }
                    debug!(
                        year = context.year,
                        attempt,
                        backoff_ms = duration_ms(backoff),
                        "waiting before next attempt"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
            }
        };

        if context.year != FALLBACK_TAX_YEAR {
            return Err(map_external_error(&last_error, context.year));
        }

        match self.fallback().await {
            Ok(brackets) => {
                self.events.emit(&ClientEvent::FallbackUsed {
                    year: context.year,
                });
                Ok(brackets)
            }
            Err(error) => {
                warn!(
                    year = context.year,
                    error = %error,
                    "stable tax brackets endpoint failed"
                );
                Err(map_external_error(&error, context.year))
            }
        }
    }

    async fn attempt_once(
        &self,
        context: &RequestContext,
    ) -> Result<Vec<TaxBracket>, FetchError> {
        let request =
            fetch_tax_brackets_for_year(self.transport.as_ref(), &self.config.base_url, context);
        self.bounded(request).await
    }

    async fn fallback(&self) -> Result<Vec<TaxBracket>, FetchError> {
        let request = get_stable_tax_brackets(self.transport.as_ref(), &self.config.base_url);
        self.bounded(request).await
    }

    async fn bounded<F>(
        &self,
        request: F,
    ) -> Result<Vec<TaxBracket>, FetchError>
    where
        F: Future<Output = Result<Vec<TaxBracket>, FetchError>>,
    {
        let timeout = self.config.timeout;
        tokio::time::timeout(timeout, request)
            .await
            .unwrap_or_else(|_| {
                Err(FetchError::Transport(TransportError::timeout(format!(
                    "timeout of {}ms exceeded",
                    timeout.as_millis()
                ))))
            })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::transport::ReqwestTransport;

    fn client(backoff_ms: u64) -> ExternalTaxApiClient {
        ExternalTaxApiClient::new(
            Arc::new(ReqwestTransport::with_client(reqwest::Client::new())),
            ExternalTaxApiConfig {
                base_url: "http://localhost:9".to_string(),
                timeout: Duration::from_millis(100),
                max_attempts: 3,
                retry_backoff: Duration::from_millis(backoff_ms),
            },
        )
    }

    #[test]
    fn backoff_grows_linearly() {
        let client = client(250);

        assert_eq!(client.backoff_for(1), Duration::from_millis(250));
        assert_eq!(client.backoff_for(2), Duration::from_millis(500));
        assert_eq!(client.backoff_for(3), Duration::from_millis(750));
    }

    #[test]
    fn zero_unit_means_no_wait() {
        assert_eq!(client(0).backoff_for(5), Duration::ZERO);
    }
}
