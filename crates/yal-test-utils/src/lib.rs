// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Yal integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without a model server or chat platform.
//!
//! # Components
//!
//! - [`MockEngine`] - Scripted generation engine with optional latency
//! - [`MockTransport`] - Chat transport capturing sent and edited messages
//! - [`MockClassifier`] - Toxicity classifier with fixed scores
//! - [`FixedClock`] and [`SequentialIds`] - Deterministic time and ids
//! - [`TestHarness`] - A full orchestrator over a temp data directory

pub mod clock;
pub mod harness;
pub mod mock_classifier;
pub mod mock_engine;
pub mod mock_transport;

pub use clock::{FixedClock, SequentialIds};
pub use harness::{TEST_CHANNEL, TestHarness, TestHarnessBuilder};
pub use mock_classifier::MockClassifier;
pub use mock_engine::{MockEngine, MockReply};
pub use mock_transport::{MockTransport, SentMessage};
