//! Centralized error types for the WebControl core library.
//!
//! This module provides a unified error handling system that:
//! - Defines structured error types using `thiserror`
//! - Maps errors to appropriate HTTP status codes
//! - Implements `IntoResponse` for automatic JSON error responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::cloud::CloudError;
use crate::director::ProxyError;
use crate::discovery::DiscoveryError;
use crate::http::RequestError;

/// Trait for error types that provide machine-readable error codes.
pub trait ErrorCode {
    /// Returns a machine-readable error code for API responses.
    fn code(&self) -> &'static str;
}

impl ErrorCode for RequestError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidUrl { .. } => "invalid_url",
            Self::InvalidHeader(_) => "invalid_header",
            Self::Body(_) => "invalid_body",
            Self::Transport(_) => "transport_error",
            Self::Timeout(_) => "request_timeout",
            Self::HttpStatus { .. } => "http_error_status",
            Self::TooManyRedirects { .. } => "too_many_redirects",
            Self::InvalidRedirect(_) => "invalid_redirect",
        }
    }
}

impl ErrorCode for DiscoveryError {
    fn code(&self) -> &'static str {
        match self {
            Self::SocketBind(_) => "socket_bind_failed",
            Self::JoinGroup(_) => "multicast_join_failed",
            Self::SendSearch(_) => "sddp_send_failed",
        }
    }
}

impl ErrorCode for ProxyError {
    fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "invalid_request",
            Self::Upstream(e) => e.code(),
        }
    }
}

impl ProxyError {
    /// 400 for caller mistakes, 502 for anything between the relay and the director.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Application-wide error type for the WebControl relay.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum WebControlError {
    /// Client sent an invalid or incomplete request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Cloud login was rejected.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Cloud service call failed.
    #[error("Cloud request failed: {0}")]
    Cloud(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WebControlError {
    /// Returns a machine-readable error code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::Authentication(_) => "authentication_failed",
            Self::Cloud(_) => "cloud_error",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Maps the error to an appropriate HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Authentication(_) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Convenient Result alias for application-wide operations.
pub type WebControlResult<T> = Result<T, WebControlError>;

/// JSON response body for error responses.
#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
    status: u16,
}

impl IntoResponse for WebControlError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.code(),
            message: self.to_string(),
            status: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<CloudError> for WebControlError {
    fn from(err: CloudError) -> Self {
        match err {
            CloudError::Validation(msg) => Self::InvalidRequest(msg.into()),
            CloudError::Authentication(cause) => Self::Authentication(cause.to_string()),
            CloudError::Server(cause) => Self::Cloud(cause.to_string()),
        }
    }
}

impl From<RequestError> for WebControlError {
    fn from(err: RequestError) -> Self {
        Self::Internal(err.to_string())
    }
}
