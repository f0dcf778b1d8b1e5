//! Single-shot HTTP transport.
//!
//! A transport performs exactly one request/response exchange and buffers the
//! body. It never follows redirects and never interprets the status code;
//! that is the job of [`RequestClient`](super::RequestClient).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::redirect::Policy;
use reqwest::Client;

use super::types::{OutboundRequest, OutboundResponse, RequestError, RequestResult};
use crate::protocol_constants::{MAX_REDIRECTS, REQUEST_TIMEOUT_SECS};

/// Configuration for outbound HTTP requests.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    /// Timeout applied to each individual request (each redirect hop).
    pub timeout: Duration,
    /// Maximum number of redirect hops before failing.
    pub max_redirects: usize,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            max_redirects: MAX_REDIRECTS,
        }
    }
}

/// Performs one HTTP exchange.
///
/// Implemented by [`ReqwestTransport`] in production and by recording mocks in
/// tests.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends `request` and returns the fully buffered response, whatever its status.
    async fn execute(&self, request: &OutboundRequest) -> RequestResult<OutboundResponse>;
}

/// reqwest-backed transport.
///
/// Certificate validation is disabled: directors present self-signed
/// certificates on the LAN. Automatic redirects and idle connection pooling
/// are both turned off.
pub struct ReqwestTransport {
    client: Client,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Builds the underlying client.
    ///
    /// # Errors
    /// Returns `RequestError::Transport` if the TLS backend cannot be initialised.
    pub fn new(config: &RequestConfig) -> RequestResult<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(true)
            .redirect(Policy::none())
            .pool_max_idle_per_host(0)
            .timeout(config.timeout)
            .build()
            .map_err(RequestError::transport)?;

        Ok(Self {
            client,
            timeout: config.timeout,
        })
    }

    fn map_error(&self, err: reqwest::Error) -> RequestError {
        if err.is_timeout() {
            RequestError::Timeout(self.timeout)
        } else {
            RequestError::transport(err)
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: &OutboundRequest) -> RequestResult<OutboundResponse> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());

        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let start = std::time::Instant::now();
        let res = builder.send().await.map_err(|e| self.map_error(e))?;

        let status = res.status();
        let headers = res.headers().clone();
        let body = res.bytes().await.map_err(|e| self.map_error(e))?;

        log::debug!(
            "[HTTP] {} {} -> {} ({} bytes) in {:?}",
            request.method,
            request.url,
            status.as_u16(),
            body.len(),
            start.elapsed()
        );

        Ok(OutboundResponse::new(status, headers, body))
    }
}
