//! Cloud authentication gateway.
//!
//! Three stateless operations, each one outbound call through the shared
//! [`RequestClient`]:
//!
//! - [`CloudAuthGateway::login`] - account credentials to account token
//! - [`CloudAuthGateway::list_controllers`] - account token to account metadata
//! - [`CloudAuthGateway::mint_director_token`] - account token + controller
//!   common name to a director-scoped token

use serde_json::Value;
use thiserror::Error;

use super::types::{
    AccountToken, AuthTokenEnvelope, ClientInfo, CloudConfig, ControllerAuthRequest,
    DirectorToken, LoginRequest, ServiceInfo, UserInfo,
};
use crate::http::{OutboundRequest, RequestClient, RequestError};
use crate::protocol_constants::DIRECTOR_SERVICE;

// ─────────────────────────────────────────────────────────────────────────────
// Error Types
// ─────────────────────────────────────────────────────────────────────────────

/// Underlying cause of a cloud failure.
#[derive(Debug, Error)]
pub enum CloudFailure {
    /// The outbound request failed (transport, status, redirects).
    #[error(transparent)]
    Request(#[from] RequestError),

    /// Response body did not match the expected schema.
    #[error("malformed response: {0}")]
    MalformedBody(#[from] serde_json::Error),

    /// Response parsed but a required field was absent or empty.
    #[error("response missing {0}")]
    MissingField(&'static str),
}

/// Errors returned by the cloud gateway.
#[derive(Debug, Error)]
pub enum CloudError {
    /// Required input missing; detected before any network call.
    #[error("{0}")]
    Validation(&'static str),

    /// Login was rejected or returned no account token.
    #[error("authentication failed: {0}")]
    Authentication(#[source] CloudFailure),

    /// Accounts or controller authorization call failed.
    #[error("cloud service error: {0}")]
    Server(#[source] CloudFailure),
}

/// Convenient Result alias for cloud operations.
pub type CloudResult<T> = Result<T, CloudError>;

// ─────────────────────────────────────────────────────────────────────────────
// Gateway
// ─────────────────────────────────────────────────────────────────────────────

/// Stateless client for the cloud authentication endpoints.
pub struct CloudAuthGateway {
    client: RequestClient,
    config: CloudConfig,
}

impl CloudAuthGateway {
    #[must_use]
    pub fn new(client: RequestClient, config: CloudConfig) -> Self {
        Self { client, config }
    }

    /// Exchanges account credentials for an account token.
    ///
    /// # Errors
    /// - `Validation` if `username` or `password` is empty (no request is made)
    /// - `Authentication` if the request fails or the response carries no token
    pub async fn login(&self, username: &str, password: &str) -> CloudResult<AccountToken> {
        if username.is_empty() || password.is_empty() {
            return Err(CloudError::Validation("username and password required"));
        }

        let payload = LoginRequest {
            client_info: ClientInfo {
                device: &self.config.device,
                user_info: UserInfo {
                    application_key: &self.config.application_key,
                    password,
                    user_name: username,
                },
            },
        };

        log::info!("[Cloud] Logging in as {}", username);
        let envelope = self
            .post_for_token(&self.config.auth_url, None, &payload)
            .await
            .map_err(CloudError::Authentication)?;

        let token = envelope
            .token()
            .ok_or(CloudError::Authentication(CloudFailure::MissingField(
                "authToken.token",
            )))?;

        Ok(AccountToken {
            token: token.to_string(),
        })
    }

    /// Fetches account and controller metadata.
    ///
    /// Returns the `account` object when the response has one, otherwise the
    /// whole parsed body.
    ///
    /// # Errors
    /// - `Validation` if `account_token` is empty
    /// - `Server` on any request or parse failure
    pub async fn list_controllers(&self, account_token: &str) -> CloudResult<Value> {
        if account_token.is_empty() {
            return Err(CloudError::Validation("accountToken required"));
        }

        let request = OutboundRequest::get(&self.config.accounts_url)
            .and_then(|r| r.bearer(account_token))
            .map_err(|e| CloudError::Server(e.into()))?;

        let body = self
            .client
            .send_text(request)
            .await
            .map_err(|e| CloudError::Server(e.into()))?;

        let mut json: Value =
            serde_json::from_str(&body).map_err(|e| CloudError::Server(e.into()))?;

        Ok(match json.get_mut("account") {
            Some(account) => account.take(),
            None => json,
        })
    }

    /// Mints a director-scoped token for the controller named `common_name`.
    ///
    /// # Errors
    /// - `Validation` if either input is empty
    /// - `Server` if the request fails or the response carries no token
    pub async fn mint_director_token(
        &self,
        account_token: &str,
        common_name: &str,
    ) -> CloudResult<DirectorToken> {
        if account_token.is_empty() || common_name.is_empty() {
            return Err(CloudError::Validation(
                "accountToken and controllerCommonName required",
            ));
        }

        let payload = ControllerAuthRequest {
            service_info: ServiceInfo {
                common_name,
                services: DIRECTOR_SERVICE,
            },
        };

        log::info!("[Cloud] Requesting director token for {}", common_name);
        let envelope = self
            .post_for_token(
                &self.config.controller_auth_url,
                Some(account_token),
                &payload,
            )
            .await
            .map_err(CloudError::Server)?;

        let token = envelope
            .token()
            .ok_or(CloudError::Server(CloudFailure::MissingField(
                "authToken.token",
            )))?;

        Ok(DirectorToken {
            token: token.to_string(),
            valid_seconds: envelope.valid_seconds(),
        })
    }

    /// POSTs `payload` as JSON and parses the `authToken` envelope.
    async fn post_for_token<T: serde::Serialize>(
        &self,
        url: &str,
        bearer: Option<&str>,
        payload: &T,
    ) -> Result<AuthTokenEnvelope, CloudFailure> {
        let mut request = OutboundRequest::post(url)?.json(payload)?;
        if let Some(token) = bearer {
            request = request.bearer(token)?;
        }

        let body = self.client.send_text(request).await?;
        Ok(serde_json::from_str(&body)?)
    }
}
