//! Server configuration.
//!
//! Supports loading from YAML files with environment variable overrides.

use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use webcontrol_core::protocol_constants::{
    DEFAULT_BIND_PORT, MAX_REDIRECTS, REQUEST_TIMEOUT_SECS, SDDP_WINDOW_MS,
};
use webcontrol_core::{CloudConfig, Config, DiscoveryConfig, RequestConfig};

/// Server configuration loaded from YAML with environment overrides.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port to bind the HTTP server to.
    /// Override: `WEBCONTROL_BIND_PORT`
    pub bind_port: u16,

    /// Directory containing the web UI (`index.html` and assets).
    /// Override: `WEBCONTROL_STATIC_DIR`
    pub static_dir: Option<PathBuf>,

    /// Timeout in seconds for each outbound request.
    /// Override: `WEBCONTROL_REQUEST_TIMEOUT_SECS`
    pub request_timeout_secs: u64,

    /// Maximum redirect hops followed per outbound request.
    pub max_redirects: usize,

    /// How long discovery collects SDDP responses, in milliseconds.
    pub discovery_window_ms: u64,

    /// Local interface used for SDDP. Defaults to all interfaces.
    pub discovery_interface: Option<Ipv4Addr>,

    /// Cloud login endpoint.
    pub cloud_auth_url: Option<String>,

    /// Cloud controller authorization endpoint.
    pub cloud_controller_auth_url: Option<String>,

    /// Cloud account lookup endpoint.
    pub cloud_accounts_url: Option<String>,

    /// Application key sent with cloud logins.
    pub application_key: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_port: DEFAULT_BIND_PORT,
            static_dir: None,
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            max_redirects: MAX_REDIRECTS,
            discovery_window_ms: SDDP_WINDOW_MS,
            discovery_interface: None,
            cloud_auth_url: None,
            cloud_controller_auth_url: None,
            cloud_accounts_url: None,
            application_key: None,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a YAML file, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = path {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Applies environment variable overrides to the configuration.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from `lookup`. Unparseable values are ignored.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(port) = lookup("WEBCONTROL_BIND_PORT").and_then(|v| v.parse().ok()) {
            self.bind_port = port;
        }

        if let Some(dir) = lookup("WEBCONTROL_STATIC_DIR").filter(|v| !v.is_empty()) {
            self.static_dir = Some(PathBuf::from(dir));
        }

        if let Some(secs) = lookup("WEBCONTROL_REQUEST_TIMEOUT_SECS").and_then(|v| v.parse().ok())
        {
            self.request_timeout_secs = secs;
        }

        // Note: WEBCONTROL_LOG_LEVEL is handled by clap via #[arg(env = ...)] in main.rs
    }

    /// Converts to webcontrol-core's Config type.
    pub fn to_core_config(&self) -> Config {
        let mut cloud = CloudConfig::default();
        if let Some(url) = &self.cloud_auth_url {
            cloud.auth_url = url.clone();
        }
        if let Some(url) = &self.cloud_controller_auth_url {
            cloud.controller_auth_url = url.clone();
        }
        if let Some(url) = &self.cloud_accounts_url {
            cloud.accounts_url = url.clone();
        }
        if let Some(key) = &self.application_key {
            cloud.application_key = key.clone();
        }

        let mut discovery = DiscoveryConfig {
            window: Duration::from_millis(self.discovery_window_ms),
            ..Default::default()
        };
        if let Some(interface) = self.discovery_interface {
            discovery.bind_addr = interface;
        }

        Config {
            preferred_port: self.bind_port,
            static_dir: self.static_dir.clone(),
            request: RequestConfig {
                timeout: Duration::from_secs(self.request_timeout_secs),
                max_redirects: self.max_redirects,
            },
            cloud,
            discovery,
        }
    }
}
