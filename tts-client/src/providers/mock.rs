//! Mock speech provider for testing
//!
//! Returns deterministic audio for each request and records what it was
//! asked to synthesize, so pipelines can be tested without the network.

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Result, TtsError};
use crate::provider::{SpeechSynthesizer, SynthesisRequest, SynthesizedAudio};

type Responder = Box<dyn Fn(&SynthesisRequest) -> Vec<u8> + Send + Sync>;

/// A mock provider that answers from a responder closure
pub struct MockSynthesizer {
    /// Produces audio bytes for a request
    responder: Responder,
    /// Fail every call from this (zero-based) index on
    fail_from: Option<usize>,
    /// Current call count
    call_count: AtomicUsize,
    /// Every request seen, in call order
    requests: Mutex<Vec<SynthesisRequest>>,
}

impl MockSynthesizer {
    /// Create a provider that returns the same bytes for every request
    pub fn always_succeeds(audio: Vec<u8>) -> Self {
        Self::with_responder(move |_| audio.clone())
    }

    /// Create a provider that computes the bytes from each request
    pub fn with_responder(
        responder: impl Fn(&SynthesisRequest) -> Vec<u8> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            fail_from: None,
            call_count: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a provider that always fails
    pub fn always_fails() -> Self {
        Self::with_responder(|_| Vec::new()).failing_from(0)
    }

    /// Succeed for the first `n` calls, then fail every call after
    pub fn failing_from(mut self, n: usize) -> Self {
        self.fail_from = Some(n);
        self
    }

    /// Get the number of times synthesize() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Get a copy of every request received so far
    pub fn requests(&self) -> Vec<SynthesisRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesizedAudio> {
        let call_num = self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        if self.fail_from.is_some_and(|n| call_num >= n) {
            return Err(TtsError::ApiError {
                message: "mock failure".to_string(),
                status_code: Some(500),
            });
        }

        Ok(SynthesizedAudio {
            audio: (self.responder)(request),
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
