// src/explain/mod.rs

//! Single-token lookups against the neuron explanation search API.

pub mod client;
pub mod decode;
pub mod transport;
pub mod types;

pub use client::ExplanationClient;
pub use transport::{HttpTransport, RawResponse, SearchTransport, API_KEY_HEADER};
pub use types::{ExplanationRecord, SearchRequest, NO_DESCRIPTION};
