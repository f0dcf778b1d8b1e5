//! Pass-through proxy to a director's REST API.

use reqwest::Method;
use serde_json::{json, Value};
use thiserror::Error;

use crate::http::{OutboundRequest, RequestClient, RequestError};

/// Errors returned by [`DirectorProxy::forward`].
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Caller input missing or unusable (maps to HTTP 400).
    #[error("{0}")]
    Validation(String),

    /// The request to the director failed (maps to HTTP 502).
    #[error("director request failed: {0}")]
    Upstream(#[source] RequestError),
}

/// Convenient Result alias for director proxy calls.
pub type ProxyResult<T> = Result<T, ProxyError>;

/// Where a proxied call goes. Supplied per call, never stored.
#[derive(Debug, Clone)]
pub struct ProxyTarget {
    /// Director IP or host name (optionally with port).
    pub device: String,
    /// Director-scoped bearer token.
    pub token: String,
    /// REST path on the director, e.g. `/api/v1/items`.
    pub path: String,
}

impl ProxyTarget {
    pub fn new(
        device: impl Into<String>,
        token: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            device: device.into(),
            token: token.into(),
            path: path.into(),
        }
    }

    /// `https://<device><path>`, with a leading `/` added to the path if missing.
    fn url(&self) -> String {
        if self.path.starts_with('/') {
            format!("https://{}{}", self.device, self.path)
        } else {
            format!("https://{}/{}", self.device, self.path)
        }
    }
}

/// Forwards GET/POST calls to a director, injecting the bearer token.
pub struct DirectorProxy {
    client: RequestClient,
}

impl DirectorProxy {
    #[must_use]
    pub fn new(client: RequestClient) -> Self {
        Self { client }
    }

    /// Forwards one call and returns the director's JSON response.
    ///
    /// Bodies that are not valid JSON (some commands answer with nothing) are
    /// returned as `{"ok": true, "raw": <text>}` instead of failing.
    ///
    /// # Errors
    /// - `Validation` if the device or token is empty, the method is not
    ///   GET/POST, or the address does not form a valid URL
    /// - `Upstream` for any failure talking to the director
    pub async fn forward(
        &self,
        method: Method,
        target: &ProxyTarget,
        body: Option<&Value>,
    ) -> ProxyResult<Value> {
        if target.device.is_empty() || target.token.is_empty() {
            return Err(ProxyError::Validation(
                "ip and token query params required".into(),
            ));
        }

        if method != Method::GET && method != Method::POST {
            return Err(ProxyError::Validation(format!(
                "unsupported method {}",
                method
            )));
        }

        let url = target.url();
        let mut request = OutboundRequest::new(method.clone(), &url)
            .and_then(|r| r.bearer(&target.token))
            .map_err(|e| ProxyError::Validation(e.to_string()))?;

        if method == Method::POST {
            let empty = json!({});
            request = request
                .json(body.unwrap_or(&empty))
                .map_err(|e| ProxyError::Validation(e.to_string()))?;
        }

        log::debug!("[Director] {} {}", method, url);
        let text = self.client.send_text(request).await.map_err(|e| {
            log::warn!("[Director] {} {} failed: {}", method, url, e);
            ProxyError::Upstream(e)
        })?;

        Ok(parse_lenient(text))
    }
}

/// Parses `text` as JSON, wrapping it in `{ok, raw}` when it is not.
fn parse_lenient(text: String) -> Value {
    match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(_) => json!({ "ok": true, "raw": text }),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use reqwest::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE};

    use super::*;
    use crate::test_support::{mock_client, MockTransport};

    fn proxy(transport: &Arc<MockTransport>) -> DirectorProxy {
        DirectorProxy::new(mock_client(transport))
    }

    #[tokio::test]
    async fn get_sends_single_bearer_request_without_body() {
        let transport = MockTransport::new();
        transport.push_response(200, r#"[{"id":1,"name":"Kitchen"}]"#);

        let target = ProxyTarget::new("10.0.0.5", "T", "/api/v1/items");
        let value = proxy(&transport)
            .forward(Method::GET, &target, None)
            .await
            .unwrap();
        assert_eq!(value, json!([{"id":1,"name":"Kitchen"}]));

        let sent = transport.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, Method::GET);
        assert_eq!(sent[0].url.as_str(), "https://10.0.0.5/api/v1/items");
        assert_eq!(sent[0].headers.get(AUTHORIZATION).unwrap(), "Bearer T");
        assert!(sent[0].headers.get(CONTENT_TYPE).is_none());
        assert!(sent[0].body.is_none());
    }

    #[tokio::test]
    async fn post_serializes_body_as_json() {
        let transport = MockTransport::new();
        transport.push_response(200, r#"{"result":0}"#);

        let target = ProxyTarget::new("10.0.0.5", "T", "api/v1/items/42/commands");
        let body = json!({"command":"ON","params":{}});
        proxy(&transport)
            .forward(Method::POST, &target, Some(&body))
            .await
            .unwrap();

        let sent = &transport.requests()[0];
        assert_eq!(sent.url.as_str(), "https://10.0.0.5/api/v1/items/42/commands");
        assert_eq!(sent.headers.get(CONTENT_TYPE).unwrap(), "application/json");
        let raw = sent.body.clone().unwrap();
        assert_eq!(
            sent.headers.get(CONTENT_LENGTH).unwrap().to_str().unwrap(),
            raw.len().to_string()
        );
        let echoed: Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(echoed, body);
    }

    #[tokio::test]
    async fn post_without_body_sends_empty_object() {
        let transport = MockTransport::new();
        let target = ProxyTarget::new("10.0.0.5", "T", "/api/v1/items/42/commands");
        proxy(&transport)
            .forward(Method::POST, &target, None)
            .await
            .unwrap();

        assert_eq!(transport.requests()[0].body.as_deref(), Some(&b"{}"[..]));
    }

    #[tokio::test]
    async fn empty_body_is_wrapped_not_rejected() {
        let transport = MockTransport::new();
        transport.push_response(200, "");

        let target = ProxyTarget::new("10.0.0.5", "T", "/api/v1/items/42/commands");
        let value = proxy(&transport)
            .forward(Method::POST, &target, None)
            .await
            .unwrap();
        assert_eq!(value, json!({"ok": true, "raw": ""}));
    }

    #[tokio::test]
    async fn non_json_get_body_is_wrapped() {
        let transport = MockTransport::new();
        transport.push_response(200, "OK");

        let target = ProxyTarget::new("10.0.0.5", "T", "/api/v1/agents");
        let value = proxy(&transport)
            .forward(Method::GET, &target, None)
            .await
            .unwrap();
        assert_eq!(value, json!({"ok": true, "raw": "OK"}));
    }

    #[tokio::test]
    async fn missing_device_or_token_is_validation_error() {
        let transport = MockTransport::new();
        let p = proxy(&transport);

        let no_ip = ProxyTarget::new("", "T", "/api/v1/items");
        assert!(matches!(
            p.forward(Method::GET, &no_ip, None).await,
            Err(ProxyError::Validation(_))
        ));

        let no_token = ProxyTarget::new("10.0.0.5", "", "/api/v1/items");
        assert!(matches!(
            p.forward(Method::GET, &no_token, None).await,
            Err(ProxyError::Validation(_))
        ));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn unsupported_method_is_validation_error() {
        let transport = MockTransport::new();
        let target = ProxyTarget::new("10.0.0.5", "T", "/api/v1/items");
        let result = proxy(&transport)
            .forward(Method::DELETE, &target, None)
            .await;
        assert!(matches!(result, Err(ProxyError::Validation(_))));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn upstream_status_error_is_gateway_error() {
        let transport = MockTransport::new();
        transport.push_response(401, "token expired");

        let target = ProxyTarget::new("10.0.0.5", "T", "/api/v1/items");
        let err = proxy(&transport)
            .forward(Method::GET, &target, None)
            .await
            .unwrap_err();
        match err {
            ProxyError::Upstream(e) => assert_eq!(e.status(), Some(401)),
            other => panic!("Expected Upstream, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn unreachable_device_is_gateway_error() {
        let transport = MockTransport::new();
        transport.push_transport_error("connection refused");

        let target = ProxyTarget::new("10.0.0.5", "T", "/api/v1/items");
        let err = proxy(&transport)
            .forward(Method::GET, &target, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::Upstream(RequestError::Transport(_))));
    }
}
