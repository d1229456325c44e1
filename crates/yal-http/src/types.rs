// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the completion and classifier endpoints.

use serde::{Deserialize, Serialize};

/// Body of `POST /completion`.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest<'a> {
    pub prompt: &'a str,
    pub n_predict: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub stream: bool,
}

/// Response of `POST /completion`. Only `content` is required.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResponse {
    pub content: String,
    #[serde(default)]
    pub tokens_predicted: u64,
    #[serde(default)]
    pub stopped_limit: bool,
}

/// Body sent to the classifier.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifyRequest<'a> {
    pub text: &'a str,
}
