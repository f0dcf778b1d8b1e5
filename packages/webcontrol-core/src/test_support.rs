//! Shared test doubles for the outbound request layer.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, LOCATION};
use reqwest::StatusCode;

use crate::http::{
    HttpTransport, OutboundRequest, OutboundResponse, RequestClient, RequestError, RequestResult,
};

/// Transport that records every request and replays queued outcomes in order.
///
/// When the queue is exhausted it answers `200 OK` with an empty body.
#[derive(Default)]
pub(crate) struct MockTransport {
    requests: Mutex<Vec<OutboundRequest>>,
    outcomes: Mutex<VecDeque<RequestResult<OutboundResponse>>>,
}

impl MockTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn push_response(&self, status: u16, body: &str) {
        let status = StatusCode::from_u16(status).expect("valid status");
        self.outcomes
            .lock()
            .unwrap()
            .push_back(Ok(OutboundResponse::new(
                status,
                HeaderMap::new(),
                body.to_string(),
            )));
    }

    pub(crate) fn push_redirect(&self, status: u16, location: &str) {
        let status = StatusCode::from_u16(status).expect("valid status");
        let mut headers = HeaderMap::new();
        headers.insert(LOCATION, HeaderValue::from_str(location).unwrap());
        self.outcomes
            .lock()
            .unwrap()
            .push_back(Ok(OutboundResponse::new(status, headers, "moved")));
    }

    pub(crate) fn push_transport_error(&self, message: &str) {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(Err(RequestError::transport(message.to_string())));
    }

    pub(crate) fn requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn execute(&self, request: &OutboundRequest) -> RequestResult<OutboundResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(OutboundResponse::new(StatusCode::OK, HeaderMap::new(), "")))
    }
}

/// Builds a request client over `transport` with the default redirect limit.
pub(crate) fn mock_client(transport: &Arc<MockTransport>) -> RequestClient {
    RequestClient::new(Arc::clone(transport) as Arc<dyn HttpTransport>, 5)
}
