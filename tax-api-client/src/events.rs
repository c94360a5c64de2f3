//! Observability events raised by the external tax API client.
//!
//! Emission is fire-and-forget: [`EventSink::emit`] cannot fail, so nothing a
//! sink does can change the outcome of a request.

use std::time::Duration;

use tracing::{error, info, warn};

use crate::errors::FetchError;
use crate::types::RequestContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Succeeded,
    Failed,
}

/// One network attempt against the year-specific endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptEvent {
    pub year: i32,
    /// 1-based.
    pub attempt: u32,
    pub max_attempts: u32,
    pub is_last_attempt: bool,
    /// `attempt × backoff unit`, in milliseconds.
    pub backoff_ms: u64,
    pub status_code: Option<u16>,
    pub error_code: Option<&'static str>,
    pub outcome: AttemptOutcome,
}

impl AttemptEvent {
    pub(crate) fn succeeded(
        context: &RequestContext,
        attempt: u32,
        max_attempts: u32,
        backoff: Duration,
    ) -> Self {
        Self {
            year: context.year,
            attempt,
            max_attempts,
            is_last_attempt: attempt >= max_attempts,
            backoff_ms: duration_ms(backoff),
            status_code: None,
            error_code: None,
            outcome: AttemptOutcome::Succeeded,
        }
    }

    pub(crate) fn failed(
        context: &RequestContext,
        attempt: u32,
        max_attempts: u32,
        backoff: Duration,
        error: &FetchError,
    ) -> Self {
        Self {
            year: context.year,
            attempt,
            max_attempts,
            is_last_attempt: attempt >= max_attempts,
            backoff_ms: duration_ms(backoff),
            status_code: error.status_code(),
            error_code: error.error_code(),
            outcome: AttemptOutcome::Failed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    Attempt(AttemptEvent),
    /// The stable endpoint answered in place of the year-specific one.
    FallbackUsed { year: i32 },
}

impl ClientEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Attempt(AttemptEvent {
                outcome: AttemptOutcome::Succeeded,
                ..
            }) => "EXTERNAL_TAX_API_REQUEST_SUCCEEDED",
            Self::Attempt(_) => "EXTERNAL_TAX_API_REQUEST_FAILED",
            Self::FallbackUsed { .. } => "EXTERNAL_TAX_API_FALLBACK_USED",
        }
    }

    /// Failed attempts are warnings, except the last one which is an error.
    pub fn level(&self) -> EventLevel {
        match self {
            Self::Attempt(event) => match (event.outcome, event.is_last_attempt) {
                (AttemptOutcome::Succeeded, _) => EventLevel::Info,
                (AttemptOutcome::Failed, false) => EventLevel::Warn,
                (AttemptOutcome::Failed, true) => EventLevel::Error,
            },
            Self::FallbackUsed { .. } => EventLevel::Warn,
        }
    }
}

pub trait EventSink: Send + Sync {
    fn emit(
        &self,
        event: &ClientEvent,
    );
}

/// Writes client events as structured `tracing` records.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(
        &self,
        event: &ClientEvent,
    ) {
        let name = event.name();
        match (event, event.level()) {
            (ClientEvent::Attempt(a), EventLevel::Info) => info!(
                event = name,
                year = a.year,
                attempt = a.attempt,
                max_attempts = a.max_attempts,
                "external tax API request succeeded"
            ),
            (ClientEvent::Attempt(a), EventLevel::Warn) => warn!(
                event = name,
                year = a.year,
                attempt = a.attempt,
                max_attempts = a.max_attempts,
                is_last_attempt = a.is_last_attempt,
                backoff_ms = a.backoff_ms,
                status_code = a.status_code,
                error_code = a.error_code,
                "external tax API request failed; retrying"
            ),
            (ClientEvent::Attempt(a), EventLevel::Error) => error!(
                event = name,
                year = a.year,
                attempt = a.attempt,
                max_attempts = a.max_attempts,
                is_last_attempt = a.is_last_attempt,
                backoff_ms = a.backoff_ms,
                status_code = a.status_code,
                error_code = a.error_code,
                "external tax API request failed; attempts exhausted"
            ),
            (ClientEvent::FallbackUsed { year }, _) => warn!(
                event = name,
                year,
                "served stable tax brackets in place of year-specific data"
            ),
        }
    }
}

/// Whole milliseconds, saturating at `u64::MAX`.
pub(crate) fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::transport::TransportError;

    fn context() -> RequestContext {
        RequestContext::for_year(2024)
    }

    #[test]
    fn failed_attempt_before_last_is_a_warning() {
        let error = FetchError::Transport(TransportError::timeout("timed out"));
        let event = ClientEvent::Attempt(AttemptEvent::failed(
            &context(),
            1,
            3,
            Duration::from_millis(1000),
            &error,
        ));

        assert_eq!(event.level(), EventLevel::Warn);
        assert_eq!(event.name(), "EXTERNAL_TAX_API_REQUEST_FAILED");
        let ClientEvent::Attempt(attempt) = event else {
            unreachable!()
        };
        assert_eq!(attempt.year, 2024);
        assert!(!attempt.is_last_attempt);
        assert_eq!(attempt.backoff_ms, 1000);
        assert_eq!(attempt.error_code, Some("timeout"));
        assert_eq!(attempt.status_code, None);
    }

    #[test]
    fn failed_last_attempt_is_an_error() {
        let error = FetchError::Transport(TransportError::Status {
            status: 503,
            message: "unavailable".to_string(),
        });
        let event = ClientEvent::Attempt(AttemptEvent::failed(
            &context(),
            3,
            3,
            Duration::from_millis(1500),
            &error,
        ));

        assert_eq!(event.level(), EventLevel::Error);
        let ClientEvent::Attempt(attempt) = event else {
            unreachable!()
        };
        assert!(attempt.is_last_attempt);
        assert_eq!(attempt.status_code, Some(503));
        assert_eq!(attempt.error_code, Some("status"));
    }

    #[test]
    fn successful_attempt_is_informational() {
        let event = ClientEvent::Attempt(AttemptEvent::succeeded(
            &context(),
            2,
            3,
            Duration::from_millis(200),
        ));

        assert_eq!(event.level(), EventLevel::Info);
        assert_eq!(event.name(), "EXTERNAL_TAX_API_REQUEST_SUCCEEDED");
    }

    #[test]
    fn duration_ms_saturates_instead_of_truncating() {
        assert_eq!(duration_ms(Duration::from_millis(2500)), 2500);
        assert_eq!(duration_ms(Duration::MAX), u64::MAX);
    }

    #[test]
    fn fallback_is_a_warning() {
        let event = ClientEvent::FallbackUsed { year: 2022 };

        assert_eq!(event.level(), EventLevel::Warn);
        assert_eq!(event.name(), "EXTERNAL_TAX_API_FALLBACK_USED");
    }

    #[test]
    fn tracing_sink_accepts_every_event() {
        let sink = TracingEventSink;
        let error = FetchError::Malformed("Invalid tax brackets payload".to_string());

        sink.emit(&ClientEvent::Attempt(AttemptEvent::failed(
            &context(),
            1,
            1,
            Duration::ZERO,
            &error,
        )));
        sink.emit(&ClientEvent::FallbackUsed { year: 2022 });
    }
}
