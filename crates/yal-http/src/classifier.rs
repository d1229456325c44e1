// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Toxicity classifier reached over HTTP.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use yal_config::model::ModerationConfig;
use yal_core::YalError;
use yal_core::traits::{PluginAdapter, ToxicityClassifier};
use yal_core::types::{AdapterType, HealthStatus};

use crate::client::JsonClient;
use crate::types::ClassifyRequest;

/// Per-request budget for the classifier.
const CLASSIFY_TIMEOUT: Duration = Duration::from_secs(30);

/// Posts `{"text": ...}` and reads back `{"category": score, ...}`.
pub struct HttpClassifier {
    client: JsonClient,
    url: String,
}

impl HttpClassifier {
    pub fn new(url: impl Into<String>) -> Result<Self, YalError> {
        let client = JsonClient::new(CLASSIFY_TIMEOUT).map_err(|e| YalError::Config(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// `None` unless the classifier is enabled and has a URL.
    pub fn from_config(config: &ModerationConfig) -> Result<Option<Self>, YalError> {
        match (&config.classifier_url, config.classifier_enabled) {
            (Some(url), true) => Ok(Some(Self::new(url.clone())?)),
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl PluginAdapter for HttpClassifier {
    fn name(&self) -> &str {
        "http-classifier"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Classifier
    }

    async fn health_check(&self) -> Result<HealthStatus, YalError> {
        match self.classify("").await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), YalError> {
        Ok(())
    }
}

#[async_trait]
impl ToxicityClassifier for HttpClassifier {
    async fn classify(&self, text: &str) -> Result<HashMap<String, f32>, YalError> {
        let scores: HashMap<String, f32> = self
            .client
            .post(&self.url, &ClassifyRequest { text })
            .await
            .map_err(|e| YalError::Transport {
                message: format!("classifier request failed: {e}"),
                source: Some(Box::new(e)),
            })?;
        debug!(categories = scores.len(), "prompt scored");
        Ok(scores)
    }
}
