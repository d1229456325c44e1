// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the external collaborators of the bot.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod classifier;
pub mod clock;
pub mod engine;
pub mod transport;

pub use adapter::PluginAdapter;
pub use classifier::ToxicityClassifier;
pub use clock::{Clock, IdGenerator, RandomIdGenerator, SystemClock};
pub use engine::GenerationEngine;
pub use transport::ChatTransport;
