//! HTTP API layer.
//!
//! This module contains thin handlers that delegate to the cloud gateway,
//! director proxy and discovery components. It provides the router
//! construction and server startup functionality.

use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::bootstrap::BootstrappedServices;
use crate::cloud::CloudAuthGateway;
use crate::director::DirectorProxy;
use crate::discovery::DeviceDiscovery;

pub mod http;
pub mod response;

/// Errors that can occur when starting or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to a TCP port.
    #[error("Failed to bind to port: {0}")]
    Bind(#[from] std::io::Error),
}

/// Shared application state for the API layer.
///
/// Holds references to the stateless components; every request carries the
/// tokens it needs, so nothing here is mutated after startup.
#[derive(Clone)]
pub struct AppState {
    /// LAN discovery of directors.
    pub discovery: Arc<dyn DeviceDiscovery>,
    /// Cloud login and token minting.
    pub cloud: Arc<CloudAuthGateway>,
    /// Pass-through proxy to director REST APIs.
    pub director: Arc<DirectorProxy>,
    /// Directory holding the static web UI, if any.
    pub static_dir: Option<PathBuf>,
}

impl AppState {
    /// Builds the API state from bootstrapped services.
    pub fn new(services: &BootstrappedServices, static_dir: Option<PathBuf>) -> Self {
        Self {
            discovery: Arc::clone(&services.discovery),
            cloud: Arc::clone(&services.cloud),
            director: Arc::clone(&services.director),
            static_dir,
        }
    }
}

/// Starts the HTTP server on `port` and serves until `shutdown` resolves.
///
/// Port `0` binds an ephemeral port.
pub async fn start_server<F>(state: AppState, port: u16, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let bound = listener.local_addr()?;

    log::info!("[Server] Listening on http://{}", bound);
    if let Some(dir) = &state.static_dir {
        log::info!("[Server] Serving web UI from {}", dir.display());
    }

    let app = http::create_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    log::info!("[Server] Stopped");
    Ok(())
}
