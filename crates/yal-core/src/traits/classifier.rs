// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Optional toxicity classifier used by the moderation gate.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::YalError;
use crate::traits::adapter::PluginAdapter;

/// Scores text on toxicity categories.
///
/// Returned scores are in `[0, 1]`, keyed by category name. At least
/// `sexual_explicit`, `obscene`, `toxicity`, `severe_toxicity` and
/// `identity_attack` are expected.
#[async_trait]
pub trait ToxicityClassifier: PluginAdapter {
    async fn classify(&self, text: &str) -> Result<HashMap<String, f32>, YalError>;
}
