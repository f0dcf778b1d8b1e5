//! WebControl Core - shared library for the WebControl4 relay.
//!
//! This crate provides the core functionality for a local relay between a
//! browser UI and a Control4 home-automation system. It logs in against the
//! vendor cloud, mints director tokens, proxies REST calls to a director on
//! the LAN and discovers directors via SDDP multicast.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`http`]: Outbound HTTP with bounded redirect following
//! - [`cloud`]: Cloud login, account lookup and director token minting
//! - [`director`]: Pass-through proxy to a director's REST API
//! - [`discovery`]: SDDP multicast discovery
//! - [`api`]: Inbound HTTP API and static UI serving
//! - [`error`]: Centralized error types
//!
//! # Abstraction Traits
//!
//! - [`HttpTransport`](http::HttpTransport): One HTTP exchange, mocked in tests
//! - [`DeviceDiscovery`](discovery::DeviceDiscovery): LAN discovery, stubbed in API tests
//!
//! Every component is stateless: tokens are supplied by the caller on every
//! request and nothing is persisted.

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod bootstrap;
pub mod cloud;
pub mod config;
pub mod director;
pub mod discovery;
pub mod error;
pub mod http;
pub mod protocol_constants;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types at the crate root
pub use config::Config;
pub use error::{ErrorCode, WebControlError, WebControlResult};

pub use cloud::{AccountToken, CloudAuthGateway, CloudConfig, CloudError, DirectorToken};
pub use director::{DirectorProxy, ProxyError, ProxyTarget};
pub use discovery::{DeviceDiscovery, DiscoveredDevice, DiscoveryConfig, SddpDiscovery};
pub use http::{RequestClient, RequestConfig, RequestError};

// Re-export bootstrap types
pub use bootstrap::{bootstrap_services, BootstrappedServices};

// Re-export API types
pub use api::{start_server, AppState, ServerError};
