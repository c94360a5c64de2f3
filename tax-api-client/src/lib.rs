//! Resilient client for the external tax authority, and its
//! [`tax_core::TaxRateSource`] adapter.

pub mod adapter;
pub mod client;
pub mod errors;
pub mod events;
pub mod fetch;
pub mod transport;
pub mod types;

pub use adapter::ExternalTaxRateAdapter;
pub use client::ExternalTaxApiClient;
pub use errors::{FetchError, map_external_error};
pub use events::{
    AttemptEvent, AttemptOutcome, ClientEvent, EventLevel, EventSink, TracingEventSink,
};
pub use fetch::validate_tax_brackets_response;
pub use transport::{HttpTransport, ReqwestTransport, TransportError};
pub use types::{ExternalTaxApiConfig, FALLBACK_TAX_YEAR, RequestContext};
