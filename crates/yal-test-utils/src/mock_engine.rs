// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock generation engine for deterministic testing.
//!
//! `MockEngine` implements `GenerationEngine` with a FIFO of scripted
//! replies, optional latency, and counters for calls and cancellations.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use yal_core::YalError;
use yal_core::traits::{GenerationEngine, PluginAdapter};
use yal_core::types::{AdapterType, HealthStatus, SamplingParams};

/// What the engine answers to one call.
#[derive(Debug, Clone, PartialEq)]
pub enum MockReply {
    /// Returns the prompt unchanged (degenerate output).
    Echo,
    /// Returns the prompt followed by the text, like a causal decode.
    Continue(String),
    /// Returns the text verbatim.
    Text(String),
    /// Fails with a generation error carrying the text.
    Fail(String),
}

/// A mock engine that replays scripted replies.
///
/// Replies are popped from a FIFO queue. When the queue is empty the
/// default reply is used, initially `Continue(" mock response")`.
pub struct MockEngine {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    default_reply: MockReply,
    delay: Option<Duration>,
    calls: AtomicUsize,
    cancelled: AtomicUsize,
    prompts: Arc<Mutex<Vec<String>>>,
    tokens: Arc<Mutex<Vec<CancellationToken>>>,
}

impl MockEngine {
    /// Create a new mock engine with an empty reply queue.
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::new())),
            default_reply: MockReply::Continue(" mock response".to_string()),
            delay: None,
            calls: AtomicUsize::new(0),
            cancelled: AtomicUsize::new(0),
            prompts: Arc::new(Mutex::new(Vec::new())),
            tokens: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock engine pre-loaded with the given replies.
    pub fn with_replies(replies: Vec<MockReply>) -> Self {
        let engine = Self::new();
        Self {
            replies: Arc::new(Mutex::new(VecDeque::from(replies))),
            ..engine
        }
    }

    /// Create a mock engine whose replies are continuations of the prompt.
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self::with_replies(responses.into_iter().map(MockReply::Continue).collect())
    }

    /// An engine that only ever echoes its prompt.
    pub fn echoing() -> Self {
        Self::new().with_default(MockReply::Echo)
    }

    /// Reply used once the queue is drained.
    pub fn with_default(mut self, reply: MockReply) -> Self {
        self.default_reply = reply;
        self
    }

    /// Sleep this long before answering. Cancellation cuts the sleep short.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Add a reply to the end of the queue.
    pub async fn add_reply(&self, reply: MockReply) {
        self.replies.lock().await.push_back(reply);
    }

    /// Number of `predict` calls started.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of calls that observed their cancellation token.
    pub fn cancelled_count(&self) -> usize {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Prompts received, in call order.
    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }

    /// Cancellation token handed to the most recent call.
    pub async fn last_token(&self) -> Option<CancellationToken> {
        self.tokens.lock().await.last().cloned()
    }

    async fn next_reply(&self) -> MockReply {
        self.replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| self.default_reply.clone())
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockEngine {
    fn name(&self) -> &str {
        "mock-engine"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Engine
    }

    async fn health_check(&self) -> Result<HealthStatus, YalError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), YalError> {
        Ok(())
    }
}

#[async_trait]
impl GenerationEngine for MockEngine {
    async fn predict(
        &self,
        prompt: &str,
        _params: &SamplingParams,
        cancel: CancellationToken,
    ) -> Result<String, YalError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().await.push(prompt.to_string());
        self.tokens.lock().await.push(cancel.clone());

        if let Some(delay) = self.delay {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = cancel.cancelled() => {
                    self.cancelled.fetch_add(1, Ordering::SeqCst);
                    return Err(YalError::GenerationFailed {
                        message: "cancelled".to_string(),
                        source: None,
                    });
                }
            }
        }

        match self.next_reply().await {
            MockReply::Echo => Ok(prompt.to_string()),
            MockReply::Continue(text) => Ok(format!("{prompt}{text}")),
            MockReply::Text(text) => Ok(text),
            MockReply::Fail(message) => Err(YalError::GenerationFailed {
                message,
                source: None,
            }),
        }
    }
}
