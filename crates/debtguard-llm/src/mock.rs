use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use debtguard_core::errors::GatewayError;
use debtguard_core::provider::{GenerationProvider, GenerationRequest};

/// Pre-programmed outcomes for deterministic testing without API calls.
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// A response carrying this text.
    Text(String),
    /// A well-formed response with no usable text.
    Empty,
    /// A failed attempt.
    Error(GatewayError),
    /// Wait a duration, then resolve the inner response.
    Delay(Duration, Box<MockResponse>),
}

impl MockResponse {
    pub fn text(text: &str) -> Self {
        Self::Text(text.to_string())
    }

    pub fn status(status: u16) -> Self {
        Self::Error(GatewayError::from_status(status, format!("mock status {status}")))
    }

    pub fn delayed(delay: Duration, inner: MockResponse) -> Self {
        Self::Delay(delay, Box::new(inner))
    }
}

/// Mock provider that replays responses in order and records every request.
pub struct MockProvider {
    responses: Mutex<VecDeque<MockResponse>>,
    requests: Mutex<Vec<GenerationRequest>>,
    call_count: AtomicUsize,
    has_credential: bool,
}

impl MockProvider {
    pub fn new(responses: Vec<MockResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
            has_credential: true,
        }
    }

    /// Same as [`MockProvider::new`] but reports no configured credential.
    pub fn without_credential(responses: Vec<MockResponse>) -> Self {
        Self {
            has_credential: false,
            ..Self::new(responses)
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().clone()
    }

    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.requests.lock().last().cloned()
    }
}

#[async_trait]
impl GenerationProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    fn has_credential(&self) -> bool {
        self.has_credential
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<Option<String>, GatewayError> {
        let idx = self.call_count.fetch_add(1, Ordering::Relaxed);
        self.requests.lock().push(request.clone());

        let next = self.responses.lock().pop_front();
        let Some(mut current) = next else {
            return Err(GatewayError::Network(format!(
                "MockProvider: no response configured for call {idx}"
            )));
        };

        loop {
            match current {
                MockResponse::Text(text) => return Ok(Some(text)),
                MockResponse::Empty => return Ok(None),
                MockResponse::Error(e) => return Err(e),
                MockResponse::Delay(duration, inner) => {
                    tokio::time::sleep(duration).await;
                    current = *inner;
                }
            }
        }
    }
}
