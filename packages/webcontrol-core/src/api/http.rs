//! HTTP route handlers.
//!
//! All handlers are thin - they validate the request shape and delegate to
//! the components for business logic.

use std::path::Path as FsPath;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::services::{ServeDir, ServeFile};

use crate::api::response::{api_error, api_success};
use crate::api::AppState;
use crate::director::ProxyTarget;
use crate::error::{ErrorCode, WebControlError, WebControlResult};
use crate::protocol_constants::SERVICE_ID;

// ─────────────────────────────────────────────────────────────────────────────
// Request Types
// ─────────────────────────────────────────────────────────────────────────────

// Missing fields deserialize as empty strings and are rejected by the
// component validation, so callers get a 400 with a useful message.

/// Unwraps a JSON body, answering any rejection (missing content type,
/// malformed JSON, wrong field types) with the standard 400 error body.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> WebControlResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| WebControlError::InvalidRequest(e.body_text()))
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ControllersRequest {
    #[serde(rename = "accountToken")]
    account_token: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct DirectorTokenRequest {
    #[serde(rename = "accountToken")]
    account_token: String,
    #[serde(rename = "controllerCommonName")]
    controller_common_name: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct DirectorQuery {
    ip: String,
    token: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

/// Creates the Axum router with all routes.
///
/// When a static directory is configured, unmatched paths are served from it
/// and anything not found there falls back to its `index.html`.
pub fn create_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(health_check))
        .route("/api/discover", get(discover_devices))
        .route("/api/auth/login", post(handle_login))
        .route("/api/auth/controllers", post(list_controllers))
        .route("/api/auth/director-token", post(mint_director_token))
        .route(
            "/api/director/{*path}",
            get(director_get).post(director_post),
        );

    let router = match state.static_dir.as_deref() {
        Some(dir) => router.fallback_service(static_files(dir)),
        None => router,
    };

    router.with_state(state)
}

fn static_files(dir: &FsPath) -> ServeDir<ServeFile> {
    ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html")))
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Liveness probe.
async fn health_check() -> impl IntoResponse {
    api_success(json!({
        "status": "ok",
        "service": SERVICE_ID,
    }))
}

/// Runs one SDDP window and returns every response received.
///
/// Takes the full discovery window before answering.
async fn discover_devices(State(state): State<AppState>) -> Response {
    match state.discovery.discover().await {
        Ok(devices) => api_success(devices).into_response(),
        Err(e) => {
            log::warn!("[Server] Discovery failed: {}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, e.code(), e).into_response()
        }
    }
}

async fn handle_login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> WebControlResult<impl IntoResponse> {
    let payload = json_body(payload)?;
    let token = state
        .cloud
        .login(&payload.username, &payload.password)
        .await?;
    Ok(api_success(token))
}

async fn list_controllers(
    State(state): State<AppState>,
    payload: Result<Json<ControllersRequest>, JsonRejection>,
) -> WebControlResult<impl IntoResponse> {
    let payload = json_body(payload)?;
    let account = state.cloud.list_controllers(&payload.account_token).await?;
    Ok(api_success(account))
}

async fn mint_director_token(
    State(state): State<AppState>,
    payload: Result<Json<DirectorTokenRequest>, JsonRejection>,
) -> WebControlResult<impl IntoResponse> {
    let payload = json_body(payload)?;
    let token = state
        .cloud
        .mint_director_token(&payload.account_token, &payload.controller_common_name)
        .await?;
    Ok(api_success(token))
}

// ─────────────────────────────────────────────────────────────────────────────
// Director Proxy Handlers
// ─────────────────────────────────────────────────────────────────────────────

async fn director_get(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(query): Query<DirectorQuery>,
) -> Response {
    forward_to_director(&state, Method::GET, path, query, None).await
}

/// Forwards a command. An empty request body is sent as `{}`.
async fn director_post(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(query): Query<DirectorQuery>,
    body: Bytes,
) -> Response {
    let body = match parse_optional_json(&body) {
        Ok(body) => body,
        Err(e) => return e.into_response(),
    };
    forward_to_director(&state, Method::POST, path, query, body.as_ref()).await
}

async fn forward_to_director(
    state: &AppState,
    method: Method,
    path: String,
    query: DirectorQuery,
    body: Option<&Value>,
) -> Response {
    let target = ProxyTarget::new(query.ip, query.token, path);
    match state.director.forward(method, &target, body).await {
        Ok(value) => api_success(value).into_response(),
        Err(e) => api_error(e.status_code(), e.code(), e).into_response(),
    }
}

fn parse_optional_json(body: &[u8]) -> WebControlResult<Option<Value>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| WebControlError::InvalidRequest(format!("request body is not JSON: {}", e)))
}
