//! Mock transport for testing
//!
//! Replays scripted replies and records every call it receives, so tests can
//! assert on prompts and on the absence of network traffic.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};

use crate::error::{Error, Result};

use super::transport::{ModelCall, RemoteResponse, Transport};

/// One scripted outcome
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Successful reply carrying this text
    Text(String),
    /// Connection failure
    NetworkError,
    /// Non-success HTTP status with a message
    Status(u16, String),
    /// The requested model is not served
    ModelUnavailable,
    /// Undecodable response body
    Malformed,
}

impl MockReply {
    pub fn text(text: impl Into<String>) -> Self {
        MockReply::Text(text.into())
    }

    fn into_result(self, call: &ModelCall) -> Result<RemoteResponse> {
        match self {
            MockReply::Text(text) => Ok(RemoteResponse::new(text)),
            MockReply::NetworkError => Err(Error::network("mock://transport", "connection refused")),
            MockReply::Status(status, message) => Err(Error::UpstreamRejected { status, message }),
            MockReply::ModelUnavailable => Err(Error::ModelUnavailable {
                model: call.model.clone(),
                message: "not found".to_string(),
            }),
            MockReply::Malformed => Err(Error::upstream_malformed("mock payload")),
        }
    }
}

/// Mock implementation of [`Transport`]
pub struct MockTransport {
    queue: Mutex<VecDeque<MockReply>>,
    fallback: MockReply,
    latency: Duration,
    calls: RwLock<Vec<ModelCall>>,
}

impl MockTransport {
    /// Answers every call with an empty text reply
    pub fn new() -> Self {
        Self::with_fallback(MockReply::text(""))
    }

    /// Answers every call with `text`
    pub fn fixed(text: impl Into<String>) -> Self {
        Self::with_fallback(MockReply::text(text))
    }

    /// Answers every call with `reply`
    pub fn with_fallback(reply: MockReply) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            fallback: reply,
            latency: Duration::ZERO,
            calls: RwLock::new(Vec::new()),
        }
    }

    /// Delay every reply by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Queue a reply; queued replies are used in order before the fallback.
    pub fn push(&self, reply: MockReply) -> &Self {
        self.queue.lock().push_back(reply);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().len()
    }

    /// Every call received so far
    pub fn calls(&self) -> Vec<ModelCall> {
        self.calls.read().clone()
    }

    pub fn last_call(&self) -> Option<ModelCall> {
        self.calls.read().last().cloned()
    }

    pub fn reset(&self) {
        self.calls.write().clear();
        self.queue.lock().clear();
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn generate_content(&self, call: &ModelCall) -> Result<RemoteResponse> {
        self.calls.write().push(call.clone());

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let reply = self
            .queue
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        reply.into_result(call)
    }
}
