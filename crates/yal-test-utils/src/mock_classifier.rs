// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock toxicity classifier returning fixed scores.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use yal_core::YalError;
use yal_core::traits::{PluginAdapter, ToxicityClassifier};
use yal_core::types::{AdapterType, HealthStatus};

/// Scores every text the same way, or fails when told to.
pub struct MockClassifier {
    scores: HashMap<String, f32>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl MockClassifier {
    /// A classifier that scores everything 0.0.
    pub fn new() -> Self {
        Self::with_scores(&[])
    }

    pub fn with_scores(scores: &[(&str, f32)]) -> Self {
        Self {
            scores: scores
                .iter()
                .map(|(category, score)| (category.to_string(), *score))
                .collect(),
            failing: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    /// A classifier whose every call errors.
    pub fn failing() -> Self {
        let classifier = Self::new();
        classifier.failing.store(true, Ordering::SeqCst);
        classifier
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockClassifier {
    fn name(&self) -> &str {
        "mock-classifier"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Classifier
    }

    async fn health_check(&self) -> Result<HealthStatus, YalError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), YalError> {
        Ok(())
    }
}

#[async_trait]
impl ToxicityClassifier for MockClassifier {
    async fn classify(&self, _text: &str) -> Result<HashMap<String, f32>, YalError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(YalError::Internal("mock classifier offline".to_string()));
        }
        Ok(self.scores.clone())
    }
}
