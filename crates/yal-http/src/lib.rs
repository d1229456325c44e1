// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP adapters for the Yal generation bot.
//!
//! - [`LlamaServerEngine`] implements [`GenerationEngine`](yal_core::GenerationEngine)
//!   against a llama.cpp-style `/completion` endpoint.
//! - [`HttpClassifier`] implements [`ToxicityClassifier`](yal_core::ToxicityClassifier)
//!   against a service returning a JSON object of category scores.

pub mod classifier;
pub mod client;
pub mod engine;
pub mod types;

pub use classifier::HttpClassifier;
pub use client::{HttpError, JsonClient};
pub use engine::LlamaServerEngine;
