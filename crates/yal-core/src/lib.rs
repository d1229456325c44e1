// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Yal generation bot.
//!
//! This crate provides the foundational trait definitions, error types, and
//! domain types used throughout the Yal workspace. The generation engine,
//! the toxicity classifier and the chat transport are all reached through
//! traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::YalError;
pub use types::{
    AdapterType, ChannelId, DenialReason, HealthStatus, MessageId, RequestOrigin, ShortId,
    UserId,
};

pub use traits::{
    ChatTransport, Clock, GenerationEngine, IdGenerator, PluginAdapter, RandomIdGenerator,
    SystemClock, ToxicityClassifier,
};
