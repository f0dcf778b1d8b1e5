//! Core configuration.
//!
//! Aggregates the per-component configuration structs. Every field has a
//! default, so `Config::default()` talks to the real cloud endpoints and the
//! standard SDDP group.

use std::path::PathBuf;

use crate::cloud::CloudConfig;
use crate::discovery::DiscoveryConfig;
use crate::http::RequestConfig;
use crate::protocol_constants::DEFAULT_BIND_PORT;

/// Application configuration consumed by [`bootstrap_services`](crate::bootstrap_services).
#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the relay's HTTP server.
    pub preferred_port: u16,
    /// Directory holding the static web UI. When unset only the API is served.
    pub static_dir: Option<PathBuf>,
    /// Outbound HTTP settings (timeout, redirect limit).
    pub request: RequestConfig,
    /// Cloud endpoints and client identity.
    pub cloud: CloudConfig,
    /// SDDP discovery settings.
    pub discovery: DiscoveryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            preferred_port: DEFAULT_BIND_PORT,
            static_dir: None,
            request: RequestConfig::default(),
            cloud: CloudConfig::default(),
            discovery: DiscoveryConfig::default(),
        }
    }
}
