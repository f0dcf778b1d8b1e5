//! Redirect-following request client.

use std::sync::Arc;

use reqwest::header::AUTHORIZATION;

use super::transport::HttpTransport;
use super::types::{OutboundRequest, OutboundResponse, RequestError, RequestResult};

/// Sends requests through an [`HttpTransport`], following a bounded chain of
/// redirects.
///
/// Cheap to clone; clones share the transport. Holds no per-call state, so
/// any number of calls may be in flight concurrently.
#[derive(Clone)]
pub struct RequestClient {
    transport: Arc<dyn HttpTransport>,
    max_redirects: usize,
}

impl RequestClient {
    /// Creates a client over `transport` that follows at most `max_redirects` hops.
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>, max_redirects: usize) -> Self {
        Self {
            transport,
            max_redirects,
        }
    }

    pub fn max_redirects(&self) -> usize {
        self.max_redirects
    }

    /// Sends `request` and returns the terminal response.
    ///
    /// - A body gets an exact `Content-Length` before the first attempt.
    /// - 301/302/307/308 with `Location` re-issues the same request to the
    ///   resolved URL, dropping `Authorization` when the hop changes origin.
    ///   Once more than `max_redirects` hops have been seen the
    ///   call fails without issuing another request.
    /// - Terminal status >= 400 fails with [`RequestError::HttpStatus`].
    ///
    /// # Errors
    /// Transport failures are returned as-is; nothing is retried.
    pub async fn send(&self, mut request: OutboundRequest) -> RequestResult<OutboundResponse> {
        request.apply_content_length();

        let mut redirects = 0usize;
        loop {
            let response = self.transport.execute(&request).await?;

            if let Some(location) = response.redirect_location() {
                redirects += 1;
                if redirects > self.max_redirects {
                    log::warn!(
                        "[HTTP] {} {} exceeded {} redirects",
                        request.method,
                        request.url,
                        self.max_redirects
                    );
                    return Err(RequestError::TooManyRedirects {
                        limit: self.max_redirects,
                    });
                }

                let next = request
                    .url
                    .join(location)
                    .map_err(|_| RequestError::InvalidRedirect(location.to_string()))?;
                log::debug!(
                    "[HTTP] {} {} -> {} (redirect {}/{})",
                    response.status.as_u16(),
                    request.url,
                    next,
                    redirects,
                    self.max_redirects
                );
                if next.origin() != request.url.origin()
                    && request.headers.remove(AUTHORIZATION).is_some()
                {
                    log::debug!("[HTTP] Dropped Authorization for cross-origin redirect");
                }
                request.url = next;
                continue;
            }

            if response.status.as_u16() >= 400 {
                return Err(RequestError::HttpStatus {
                    status: response.status.as_u16(),
                    body: response.text(),
                });
            }

            return Ok(response);
        }
    }

    /// Sends `request` and returns the terminal body as text.
    pub async fn send_text(&self, request: OutboundRequest) -> RequestResult<String> {
        self.send(request).await.map(|res| res.text())
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
    use reqwest::Method;

    use super::*;
    use crate::test_support::{mock_client, MockTransport};

    #[tokio::test]
    async fn returns_body_of_success_response() {
        let transport = MockTransport::new();
        transport.push_response(200, "{\"ok\":1}");
        let client = mock_client(&transport);

        let body = client
            .send_text(OutboundRequest::get("https://example.com/a").unwrap())
            .await
            .unwrap();
        assert_eq!(body, "{\"ok\":1}");
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn follows_chain_of_five_redirects() {
        let transport = MockTransport::new();
        for i in 1..=5 {
            transport.push_redirect(302, &format!("/hop{}", i));
        }
        transport.push_response(200, "done");
        let client = mock_client(&transport);

        let res = client
            .send(OutboundRequest::get("https://example.com/start").unwrap())
            .await
            .unwrap();
        assert_eq!(res.text(), "done");

        let urls: Vec<String> = transport
            .requests()
            .iter()
            .map(|r| r.url.to_string())
            .collect();
        assert_eq!(urls.len(), 6);
        assert_eq!(urls[0], "https://example.com/start");
        assert_eq!(urls[5], "https://example.com/hop5");
    }

    #[tokio::test]
    async fn sixth_redirect_fails_without_further_call() {
        let transport = MockTransport::new();
        for i in 1..=7 {
            transport.push_redirect(301, &format!("https://example.com/hop{}", i));
        }
        let client = mock_client(&transport);

        let err = client
            .send(OutboundRequest::get("https://example.com/start").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, RequestError::TooManyRedirects { limit: 5 }));
        assert_eq!(transport.call_count(), 6);
    }

    #[tokio::test]
    async fn same_origin_redirect_preserves_method_headers_and_body() {
        let transport = MockTransport::new();
        transport.push_redirect(307, "https://example.com/v2/login");
        transport.push_response(200, "");
        let client = mock_client(&transport);

        let request = OutboundRequest::post("https://example.com/login")
            .unwrap()
            .bearer("T")
            .unwrap()
            .body("payload");
        client.send(request).await.unwrap();

        let sent = transport.requests();
        assert_eq!(sent[1].method, Method::POST);
        assert_eq!(sent[1].url.as_str(), "https://example.com/v2/login");
        assert_eq!(sent[1].headers.get("authorization").unwrap(), "Bearer T");
        assert_eq!(sent[1].body.as_deref(), Some(&b"payload"[..]));
    }

    #[tokio::test]
    async fn cross_origin_redirect_drops_bearer_token() {
        let transport = MockTransport::new();
        transport.push_redirect(302, "https://other.example.net/collect");
        transport.push_redirect(302, "https://example.com/back");
        transport.push_response(200, "");
        let client = mock_client(&transport);

        let request = OutboundRequest::post("https://example.com/login")
            .unwrap()
            .bearer("SECRET")
            .unwrap()
            .header(CONTENT_TYPE, "application/json")
            .unwrap()
            .body("{}");
        client.send(request).await.unwrap();

        let sent = transport.requests();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0].headers.get("authorization").unwrap(), "Bearer SECRET");
        assert!(sent[1].headers.get("authorization").is_none());
        assert!(sent[2].headers.get("authorization").is_none());
        assert_eq!(sent[1].headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(sent[1].method, Method::POST);
        assert_eq!(sent[1].body.as_deref(), Some(&b"{}"[..]));
    }

    #[tokio::test]
    async fn port_change_counts_as_cross_origin() {
        let transport = MockTransport::new();
        transport.push_redirect(301, "https://10.0.0.5:8443/api/v1/items");
        transport.push_response(200, "[]");
        let client = mock_client(&transport);

        let request = OutboundRequest::get("https://10.0.0.5/api/v1/items")
            .unwrap()
            .bearer("T")
            .unwrap();
        client.send(request).await.unwrap();

        assert!(transport.requests()[1].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn relative_location_resolves_against_current_url() {
        let transport = MockTransport::new();
        transport.push_redirect(308, "../b/c?x=1");
        transport.push_response(204, "");
        let client = mock_client(&transport);

        client
            .send(OutboundRequest::get("http://10.0.0.5/api/a/item").unwrap())
            .await
            .unwrap();
        assert_eq!(
            transport.requests()[1].url.as_str(),
            "http://10.0.0.5/api/b/c?x=1"
        );
    }

    #[tokio::test]
    async fn sets_exact_content_length() {
        let transport = MockTransport::new();
        let client = mock_client(&transport);
        let body = "{\"name\":\"Küche\"}";

        client
            .send(OutboundRequest::post("https://example.com/").unwrap().body(body))
            .await
            .unwrap();

        let sent = &transport.requests()[0];
        assert_eq!(
            sent.headers.get(CONTENT_LENGTH).unwrap().to_str().unwrap(),
            body.len().to_string()
        );
    }

    #[tokio::test]
    async fn error_status_carries_status_and_body() {
        let transport = MockTransport::new();
        transport.push_response(403, "forbidden");
        let client = mock_client(&transport);

        let err = client
            .send(OutboundRequest::get("https://example.com/").unwrap())
            .await
            .unwrap_err();
        match err {
            RequestError::HttpStatus { status, body } => {
                assert_eq!(status, 403);
                assert_eq!(body, "forbidden");
            }
            other => panic!("Expected HttpStatus, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn redirect_status_without_location_is_terminal_success() {
        let transport = MockTransport::new();
        transport.push_response(302, "no location");
        let client = mock_client(&transport);

        let body = client
            .send_text(OutboundRequest::get("https://example.com/").unwrap())
            .await
            .unwrap();
        assert_eq!(body, "no location");
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn transport_error_is_not_retried() {
        let transport = MockTransport::new();
        transport.push_transport_error("connection reset");
        let client = mock_client(&transport);

        let err = client
            .send(OutboundRequest::get("https://example.com/").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, RequestError::Transport(_)));
        assert_eq!(transport.call_count(), 1);
    }
}
