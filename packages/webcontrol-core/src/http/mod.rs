//! Outbound HTTP(S) request layer.
//!
//! # Module Structure
//!
//! - `types` - Request/response values and the `RequestError` taxonomy
//! - `transport` - `HttpTransport` trait and the reqwest-backed implementation
//! - `client` - `RequestClient`, which adds content-length and redirect handling
//!   on top of a single-shot transport

pub mod client;
pub mod transport;
pub mod types;

pub use client::RequestClient;
pub use transport::{HttpTransport, RequestConfig, ReqwestTransport};
pub use types::{OutboundRequest, OutboundResponse, RequestError, RequestResult};
