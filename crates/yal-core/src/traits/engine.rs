// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generation engine trait: the single expensive text-generation resource.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::YalError;
use crate::traits::adapter::PluginAdapter;
use crate::types::SamplingParams;

/// Adapter for the text-generation engine.
///
/// The engine is assumed to serialize work on one device and to have no
/// queue of its own. Latency is unbounded; callers wrap `predict` in a
/// timeout. The `cancel` token is cancelled when the caller gives up, so an
/// engine that can stop early should watch it. An engine that cannot is
/// still correct: its result is simply dropped.
#[async_trait]
pub trait GenerationEngine: PluginAdapter {
    /// Generates text for `prompt`. Causal engines return the prompt followed
    /// by the continuation.
    async fn predict(
        &self,
        prompt: &str,
        params: &SamplingParams,
        cancel: CancellationToken,
    ) -> Result<String, YalError>;
}
