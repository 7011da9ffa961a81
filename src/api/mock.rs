//! Recording transport for tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::StatusCode;
use std::collections::VecDeque;
use std::sync::Arc;

use super::transport::{OutboundRequest, RawResponse, Transport, TransportError};

/// Replays queued responses in order and records every request it sees.
/// An empty queue answers with a transport failure.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<RawResponse, TransportError>>>,
    requests: Mutex<Vec<OutboundRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, status: StatusCode, body: impl Into<String>) {
        self.responses
            .lock()
            .push_back(Ok(RawResponse::new(status, body)));
    }

    pub fn respond_json(&self, status: StatusCode, body: serde_json::Value) {
        self.respond(status, body.to_string());
    }

    pub fn fail(&self, detail: &str) {
        self.responses
            .lock()
            .push_back(Err(TransportError(detail.to_string())));
    }

    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn last_request(&self) -> Option<OutboundRequest> {
        self.requests.lock().last().cloned()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: OutboundRequest) -> Result<RawResponse, TransportError> {
        self.requests.lock().push(request);
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError("no response queued".to_string())))
    }
}
