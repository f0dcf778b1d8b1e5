//! Application bootstrap and dependency wiring.
//!
//! This module contains the composition root - the single place where the
//! outbound transport, the request client and the components built on it
//! are instantiated and wired together.

use std::sync::Arc;

use crate::cloud::CloudAuthGateway;
use crate::config::Config;
use crate::director::DirectorProxy;
use crate::discovery::{DeviceDiscovery, SddpDiscovery};
use crate::error::WebControlResult;
use crate::http::{HttpTransport, RequestClient, RequestConfig, ReqwestTransport};

/// Container for all bootstrapped services.
///
/// Consumed by [`AppState::new`](crate::AppState::new) to build the API state.
#[derive(Clone)]
pub struct BootstrappedServices {
    /// LAN discovery of directors.
    pub discovery: Arc<dyn DeviceDiscovery>,
    /// Cloud login and token minting.
    pub cloud: Arc<CloudAuthGateway>,
    /// Pass-through proxy to director REST APIs.
    pub director: Arc<DirectorProxy>,
    /// Shared request client (redirects, status handling).
    client: RequestClient,
}

impl BootstrappedServices {
    /// Returns the shared request client.
    pub fn request_client(&self) -> &RequestClient {
        &self.client
    }
}

/// Creates the request client used for every outbound call.
///
/// One client is shared by the cloud gateway and the director proxy. The
/// underlying transport keeps no idle connections, so sharing it carries no
/// state between calls.
fn create_request_client(config: &RequestConfig) -> WebControlResult<RequestClient> {
    let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new(config)?);
    Ok(RequestClient::new(transport, config.max_redirects))
}

/// Bootstraps all application services with their dependencies.
///
/// Wiring order:
///
/// 1. Request client (reqwest transport + redirect handling)
/// 2. Cloud gateway and director proxy (depend on the request client)
/// 3. SDDP discovery (independent, one socket per call)
///
/// # Errors
///
/// Returns an error if the HTTP transport cannot be built.
pub fn bootstrap_services(config: &Config) -> WebControlResult<BootstrappedServices> {
    let client = create_request_client(&config.request)?;

    let cloud = Arc::new(CloudAuthGateway::new(client.clone(), config.cloud.clone()));
    let director = Arc::new(DirectorProxy::new(client.clone()));
    let discovery: Arc<dyn DeviceDiscovery> =
        Arc::new(SddpDiscovery::new(config.discovery.clone()));

    log::info!(
        "[Bootstrap] Services ready (timeout {:?}, max {} redirects, discovery window {:?})",
        config.request.timeout,
        config.request.max_redirects,
        config.discovery.window
    );

    Ok(BootstrappedServices {
        discovery,
        cloud,
        director,
        client,
    })
}
