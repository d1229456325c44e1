// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The moderation gate combining classifier thresholds and the wordlist.

use std::collections::BTreeMap;
use std::sync::Arc;

use yal_config::model::ModerationConfig;
use yal_core::traits::ToxicityClassifier;
use yal_core::types::ModerationVerdict;
use yal_core::YalError;

use crate::wordlist::{WordEntry, Wordlist};

/// Reason given when the classifier cannot be reached.
pub const CLASSIFIER_UNAVAILABLE: &str = "classifier unavailable";

/// Decides whether a prompt may proceed to generation.
///
/// Stateless apart from its configuration; safe to share across tasks.
pub struct ModerationGate {
    classifier: Option<Arc<dyn ToxicityClassifier>>,
    thresholds: BTreeMap<String, f32>,
    wordlist: Wordlist,
}

impl ModerationGate {
    pub fn new(
        classifier: Option<Arc<dyn ToxicityClassifier>>,
        thresholds: BTreeMap<String, f32>,
        wordlist: Wordlist,
    ) -> Self {
        Self {
            classifier,
            thresholds,
            wordlist,
        }
    }

    /// A gate that allows everything.
    pub fn permissive() -> Self {
        Self::new(None, BTreeMap::new(), Wordlist::default())
    }

    /// Builds the gate from config, loading the wordlist file if one is set.
    ///
    /// The classifier is only attached when `classifier_enabled` is true.
    pub fn from_config(
        config: &ModerationConfig,
        classifier: Option<Arc<dyn ToxicityClassifier>>,
    ) -> Result<Self, YalError> {
        let wordlist = match &config.wordlist_path {
            Some(path) => Wordlist::load(path)?,
            None => Wordlist::default(),
        };
        let classifier = classifier.filter(|_| config.classifier_enabled);
        Ok(Self::new(classifier, config.thresholds.clone(), wordlist))
    }

    pub fn has_classifier(&self) -> bool {
        self.classifier.is_some()
    }

    /// Classifier first, then the wordlist. Any hit blocks.
    pub async fn verdict(&self, prompt: &str) -> ModerationVerdict {
        if let Some(classifier) = &self.classifier {
            match classifier.classify(prompt).await {
                Ok(scores) => {
                    for (category, threshold) in &self.thresholds {
                        let score = scores.get(category).copied().unwrap_or(0.0);
                        if score > *threshold {
                            tracing::info!(
                                category = %category,
                                score,
                                threshold,
                                "prompt blocked by classifier"
                            );
                            return ModerationVerdict::Block(format!(
                                "{category} score {score:.2} exceeds {threshold:.2}"
                            ));
                        }
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "toxicity classifier failed, blocking prompt");
                    return ModerationVerdict::Block(CLASSIFIER_UNAVAILABLE.to_string());
                }
            }
        }

        match self.wordlist.first_match(prompt) {
            Some(WordEntry::Literal(_)) => {
                tracing::info!("prompt blocked by wordlist term");
                ModerationVerdict::Block("wordlist term".to_string())
            }
            Some(WordEntry::Pattern(re)) => {
                tracing::info!(pattern = %re.as_str(), "prompt blocked by wordlist pattern");
                ModerationVerdict::Block("wordlist pattern".to_string())
            }
            None => ModerationVerdict::Allow,
        }
    }
}
