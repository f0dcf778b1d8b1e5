//! Cloud request/response schemas and configuration.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::protocol_constants::{
    APPLICATION_KEY, CLIENT_DEVICE_NAME, CLIENT_DEVICE_UUID, CLOUD_ACCOUNTS_URL, CLOUD_AUTH_URL,
    CLOUD_CONTROLLER_AUTH_URL,
};

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Device identity presented to the cloud service at login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceIdentity {
    pub device_name: String,
    #[serde(rename = "deviceUUID")]
    pub device_uuid: String,
    pub make: String,
    pub model: String,
    pub os: String,
    pub os_version: String,
}

impl Default for DeviceIdentity {
    fn default() -> Self {
        Self {
            device_name: CLIENT_DEVICE_NAME.into(),
            device_uuid: CLIENT_DEVICE_UUID.into(),
            make: CLIENT_DEVICE_NAME.into(),
            model: CLIENT_DEVICE_NAME.into(),
            os: "Android".into(),
            os_version: "10".into(),
        }
    }
}

/// Cloud endpoints and client identity.
#[derive(Debug, Clone)]
pub struct CloudConfig {
    /// Login endpoint.
    pub auth_url: String,
    /// Controller authorization (director token) endpoint.
    pub controller_auth_url: String,
    /// Account listing endpoint.
    pub accounts_url: String,
    /// Application identifier sent with the login payload.
    pub application_key: String,
    /// Device block sent with the login payload.
    pub device: DeviceIdentity,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            auth_url: CLOUD_AUTH_URL.into(),
            controller_auth_url: CLOUD_CONTROLLER_AUTH_URL.into(),
            accounts_url: CLOUD_ACCOUNTS_URL.into(),
            application_key: APPLICATION_KEY.into(),
            device: DeviceIdentity::default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Results
// ─────────────────────────────────────────────────────────────────────────────

/// Bearer credential for the cloud account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountToken {
    #[serde(rename = "accountToken")]
    pub token: String,
}

/// Bearer credential scoped to a single controller's director API.
///
/// Lifetime and refresh are the caller's responsibility. `valid_seconds` is
/// passed through exactly as the cloud sent it (number or string).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectorToken {
    #[serde(rename = "directorToken")]
    pub token: String,
    #[serde(rename = "validSeconds", skip_serializing_if = "Option::is_none")]
    pub valid_seconds: Option<Value>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire Payloads
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginRequest<'a> {
    pub client_info: ClientInfo<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ClientInfo<'a> {
    pub device: &'a DeviceIdentity,
    pub user_info: UserInfo<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserInfo<'a> {
    pub application_key: &'a str,
    pub password: &'a str,
    pub user_name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ControllerAuthRequest<'a> {
    pub service_info: ServiceInfo<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ServiceInfo<'a> {
    pub common_name: &'a str,
    pub services: &'a str,
}

/// `{"authToken": {"token": ..., "validSeconds": ...}}` returned by both
/// the login and controller authorization endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthTokenEnvelope {
    pub auth_token: Option<AuthTokenBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthTokenBody {
    pub token: Option<String>,
    pub valid_seconds: Option<Value>,
}

impl AuthTokenEnvelope {
    /// Returns the token if present and non-empty.
    pub fn token(&self) -> Option<&str> {
        self.auth_token
            .as_ref()
            .and_then(|t| t.token.as_deref())
            .filter(|t| !t.is_empty())
    }

    /// Token lifetime, omitted when absent or `null`.
    pub fn valid_seconds(&self) -> Option<Value> {
        self.auth_token
            .as_ref()
            .and_then(|t| t.valid_seconds.clone())
            .filter(|v| !v.is_null())
    }
}
