//! Test doubles shared by the client integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Value, json};
use tax_api_client::{ClientEvent, EventSink, HttpTransport, RequestContext, TransportError};

/// Replays canned responses: one queue for the year endpoint, one answer for
/// the stable endpoint. Every call is recorded.
#[derive(Default)]
pub struct ScriptedTransport {
    year_responses: Mutex<VecDeque<Result<Value, TransportError>>>,
    stable_response: Mutex<Option<Result<Value, TransportError>>>,
    calls: Mutex<Vec<(String, i32)>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then_year(
        self,
        response: Result<Value, TransportError>,
    ) -> Self {
        self.year_responses
            .lock()
            .expect("year responses lock")
            .push_back(response);
        self
    }

    pub fn failing_year(
        self,
        times: usize,
    ) -> Self {
        (0..times).fold(self, |transport, _| transport.then_year(Err(unavailable())))
    }

    pub fn with_stable(
        self,
        response: Result<Value, TransportError>,
    ) -> Self {
        *self.stable_response.lock().expect("stable response lock") = Some(response);
        self
    }

    pub fn calls(&self) -> Vec<(String, i32)> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn stable_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|(url, _)| url.ends_with("/tax-calculator/"))
            .count()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn get(
        &self,
        url: &str,
        context: &RequestContext,
    ) -> Result<Value, TransportError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push((url.to_string(), context.year));

        if url.ends_with("/tax-calculator/") {
            return self
                .stable_response
                .lock()
                .expect("stable response lock")
                .clone()
                .unwrap_or_else(|| Err(unavailable()));
        }
        self.year_responses
            .lock()
            .expect("year responses lock")
            .pop_front()
            .unwrap_or_else(|| Err(unavailable()))
    }
}

/// Never answers; only the client's own timeout ends the request.
pub struct HangingTransport;

#[async_trait]
impl HttpTransport for HangingTransport {
    async fn get(
        &self,
        _url: &str,
        _context: &RequestContext,
    ) -> Result<Value, TransportError> {
        std::future::pending().await
    }
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ClientEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<ClientEvent> {
        self.events.lock().expect("events lock").clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(
        &self,
        event: &ClientEvent,
    ) {
        self.events.lock().expect("events lock").push(event.clone());
    }
}

pub fn unavailable() -> TransportError {
    TransportError::Status {
        status: 503,
        message: "Service Unavailable".to_string(),
    }
}

pub fn brackets_body() -> Value {
    json!({
        "tax_brackets": [
            { "min": 0, "max": 50197, "rate": 0.15 },
            { "min": 50197, "max": 100392, "rate": 0.205 },
            { "min": 100392, "max": 155625, "rate": 0.26 },
            { "min": 155625, "max": 221708, "rate": 0.29 },
            { "min": 221708, "rate": 0.33 }
        ]
    })
}
