// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles a complete orchestrator with mock adapters over a
//! temp data directory. Provides `chat()` to drive the full pipeline in tests.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use yal_agent::{Orchestrator, RunOutcome};
use yal_config::model::{QueueMode, RecordBackend, YalConfig};
use yal_core::YalError;
use yal_core::traits::{ChatTransport, Clock, GenerationEngine, IdGenerator, ToxicityClassifier};
use yal_core::types::{ChannelId, GenerationRequest, SamplingParams, UserId};

use crate::clock::{FixedClock, SequentialIds};
use crate::mock_classifier::MockClassifier;
use crate::mock_engine::MockEngine;
use crate::mock_transport::MockTransport;

/// Channel used by [`TestHarness::chat`].
pub const TEST_CHANNEL: ChannelId = ChannelId(42);

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    config: YalConfig,
    engine: Option<MockEngine>,
    transport: Option<MockTransport>,
    classifier: Option<MockClassifier>,
    start: DateTime<Utc>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            config: YalConfig::default(),
            engine: None,
            transport: None,
            classifier: None,
            start: DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default(),
        }
    }

    /// Start from this config. Storage paths are always redirected to the
    /// harness temp directory.
    pub fn with_config(mut self, config: YalConfig) -> Self {
        self.config = config;
        self
    }

    /// Set mock engine continuations, in call order.
    pub fn with_engine_responses(mut self, responses: Vec<String>) -> Self {
        self.engine = Some(MockEngine::with_responses(responses));
        self
    }

    pub fn with_engine(mut self, engine: MockEngine) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn with_transport(mut self, transport: MockTransport) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Attach a classifier and enable classifier moderation.
    pub fn with_classifier(mut self, classifier: MockClassifier) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Bounded admission with the given depth.
    pub fn with_bounded_queue(mut self, max_depth: usize) -> Self {
        self.config.queue.mode = QueueMode::Bounded;
        self.config.queue.max_depth = max_depth;
        self
    }

    /// Keep request records in SQLite instead of JSON files.
    pub fn with_sqlite_records(mut self) -> Self {
        self.config.storage.record_backend = RecordBackend::Sqlite;
        self
    }

    /// Time reported by the harness clock at start.
    pub fn starting_at(mut self, start: DateTime<Utc>) -> Self {
        self.start = start;
        self
    }

    /// Build the test harness, creating the temp directory and all stores.
    pub async fn build(self) -> Result<TestHarness, YalError> {
        let temp_dir = tempfile::TempDir::new().map_err(YalError::storage)?;

        let mut config = self.config;
        config.storage.data_dir = temp_dir.path().to_path_buf();
        config.storage.database_path = temp_dir.path().join("records.db");
        if self.classifier.is_some() {
            config.moderation.classifier_enabled = true;
        }

        let engine = Arc::new(self.engine.unwrap_or_default());
        let transport = Arc::new(self.transport.unwrap_or_default());
        let classifier = self.classifier.map(Arc::new);
        let clock = Arc::new(FixedClock::at(self.start));
        let ids = Arc::new(SequentialIds::new());

        let harness_parts = Parts {
            engine: Arc::clone(&engine),
            transport: Arc::clone(&transport),
            classifier: classifier.clone(),
            clock: Arc::clone(&clock),
            ids: Arc::clone(&ids),
        };
        let orchestrator = Arc::new(harness_parts.assemble(&config).await?);

        Ok(TestHarness {
            orchestrator,
            engine,
            transport,
            classifier,
            clock,
            ids,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// Shared adapters, reusable across orchestrator restarts.
struct Parts {
    engine: Arc<MockEngine>,
    transport: Arc<MockTransport>,
    classifier: Option<Arc<MockClassifier>>,
    clock: Arc<FixedClock>,
    ids: Arc<SequentialIds>,
}

impl Parts {
    async fn assemble(&self, config: &YalConfig) -> Result<Orchestrator, YalError> {
        let engine: Arc<dyn GenerationEngine> = self.engine.clone();
        let transport: Arc<dyn ChatTransport> = self.transport.clone();
        let classifier = self
            .classifier
            .clone()
            .map(|c| c as Arc<dyn ToxicityClassifier>);
        let clock: Arc<dyn Clock> = self.clock.clone();
        let ids: Arc<dyn IdGenerator> = self.ids.clone();
        Orchestrator::assemble(config, engine, transport, classifier, clock, ids).await
    }
}

/// A complete test environment with mock adapters and temp storage.
pub struct TestHarness {
    pub orchestrator: Arc<Orchestrator>,
    pub engine: Arc<MockEngine>,
    pub transport: Arc<MockTransport>,
    pub classifier: Option<Arc<MockClassifier>>,
    pub clock: Arc<FixedClock>,
    pub ids: Arc<SequentialIds>,
    /// Effective configuration, with storage inside the temp directory.
    pub config: YalConfig,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    pub fn data_dir(&self) -> &Path {
        &self.config.storage.data_dir
    }

    /// A command request from `user` in [`TEST_CHANNEL`] with default sampling.
    pub fn request(&self, user: u64, prompt: &str) -> GenerationRequest {
        self.orchestrator.new_request(
            prompt,
            self.config.sampling.defaults,
            UserId(user),
            TEST_CHANNEL,
        )
    }

    /// Runs a prompt through the full pipeline, posting notices.
    pub async fn chat(&self, user: u64, prompt: &str) -> RunOutcome {
        self.orchestrator.handle(self.request(user, prompt)).await
    }

    /// Like [`chat`](Self::chat) with explicit sampling parameters.
    pub async fn chat_with(&self, user: u64, prompt: &str, sampling: SamplingParams) -> RunOutcome {
        let request =
            self.orchestrator
                .new_request(prompt, sampling, UserId(user), TEST_CHANNEL);
        self.orchestrator.handle(request).await
    }

    /// A second orchestrator over the same data directory and mocks, as after
    /// a process restart.
    pub async fn restart(&self) -> Result<Orchestrator, YalError> {
        let parts = Parts {
            engine: Arc::clone(&self.engine),
            transport: Arc::clone(&self.transport),
            classifier: self.classifier.clone(),
            clock: Arc::clone(&self.clock),
            ids: Arc::clone(&self.ids),
        };
        parts.assemble(&self.config).await
    }
}
