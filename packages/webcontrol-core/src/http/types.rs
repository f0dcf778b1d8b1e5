//! Request/response values passed between the request client and transports.

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, LOCATION,
};
use reqwest::{Method, StatusCode, Url};
use serde::Serialize;
use thiserror::Error;

// ─────────────────────────────────────────────────────────────────────────────
// Error Types
// ─────────────────────────────────────────────────────────────────────────────

/// Errors produced by the outbound request layer.
#[derive(Debug, Error)]
pub enum RequestError {
    /// Target URL could not be parsed or uses an unsupported scheme.
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// A header value contained characters not allowed on the wire.
    #[error("invalid value for header {0}")]
    InvalidHeader(String),

    /// Request body could not be serialized.
    #[error("failed to encode request body: {0}")]
    Body(#[from] serde_json::Error),

    /// Connection could not be established or was interrupted.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// No complete response within the per-request timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Remote endpoint answered with status >= 400.
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// Redirect chain exceeded the hop limit.
    #[error("too many redirects (limit {limit})")]
    TooManyRedirects { limit: usize },

    /// A redirect `Location` header could not be resolved to a URL.
    #[error("invalid redirect location '{0}'")]
    InvalidRedirect(String),
}

/// Convenient Result alias for outbound requests.
pub type RequestResult<T> = Result<T, RequestError>;

impl RequestError {
    /// Wraps an arbitrary transport-level cause.
    pub fn transport(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Transport(cause.into())
    }

    /// Returns the HTTP status if the remote endpoint answered with an error status.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Request
// ─────────────────────────────────────────────────────────────────────────────

/// A single outbound HTTP request.
///
/// Built once per logical call. The request client only ever replaces `url`
/// when following redirects; method, headers and body stay the same.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl OutboundRequest {
    /// Creates a request for an absolute `http` or `https` URL.
    pub fn new(method: Method, url: &str) -> RequestResult<Self> {
        let parsed = Url::parse(url).map_err(|e| RequestError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        match parsed.scheme() {
            "http" | "https" => {}
            other => {
                return Err(RequestError::InvalidUrl {
                    url: url.to_string(),
                    reason: format!("unsupported scheme '{}'", other),
                })
            }
        }

        if parsed.host_str().map_or(true, str::is_empty) {
            return Err(RequestError::InvalidUrl {
                url: url.to_string(),
                reason: "missing host".into(),
            });
        }

        Ok(Self {
            method,
            url: parsed,
            headers: HeaderMap::new(),
            body: None,
        })
    }

    pub fn get(url: &str) -> RequestResult<Self> {
        Self::new(Method::GET, url)
    }

    pub fn post(url: &str) -> RequestResult<Self> {
        Self::new(Method::POST, url)
    }

    /// Sets a header, replacing any previous value.
    pub fn header(mut self, name: HeaderName, value: &str) -> RequestResult<Self> {
        let value = HeaderValue::from_str(value)
            .map_err(|_| RequestError::InvalidHeader(name.as_str().to_string()))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Adds `Authorization: Bearer <token>`.
    pub fn bearer(self, token: &str) -> RequestResult<Self> {
        self.header(AUTHORIZATION, &format!("Bearer {}", token))
    }

    /// Serializes `value` as the JSON body and sets the content type.
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> RequestResult<Self> {
        let encoded = serde_json::to_vec(value)?;
        let this = self.header(CONTENT_TYPE, "application/json")?;
        Ok(this.body(encoded))
    }

    /// Sets a raw body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Writes the exact body length to `Content-Length`, overriding any caller value.
    ///
    /// Requests without a body are left untouched.
    pub(crate) fn apply_content_length(&mut self) {
        if let Some(body) = &self.body {
            self.headers
                .insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Response
// ─────────────────────────────────────────────────────────────────────────────

/// Statuses that trigger a redirect hop when a `Location` header is present.
const REDIRECT_STATUSES: [StatusCode; 4] = [
    StatusCode::MOVED_PERMANENTLY,
    StatusCode::FOUND,
    StatusCode::TEMPORARY_REDIRECT,
    StatusCode::PERMANENT_REDIRECT,
];

/// A fully buffered HTTP response.
#[derive(Debug, Clone)]
pub struct OutboundResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl OutboundResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Body as text. Invalid UTF-8 sequences are replaced.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Returns the redirect target if this response should be followed.
    ///
    /// Only 301/302/307/308 with a readable `Location` header qualify; any
    /// other response is terminal.
    #[must_use]
    pub fn redirect_location(&self) -> Option<&str> {
        if !REDIRECT_STATUSES.contains(&self.status) {
            return None;
        }
        self.headers
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
    }
}
