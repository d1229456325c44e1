// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Yal generation bot.

use thiserror::Error;

use crate::types::{ChannelId, DenialReason, ShortId, UserId};

/// The primary error type used across all Yal adapter traits and core operations.
///
/// Rejection-class variants (`ModerationBlocked`, `AdmissionDenied`,
/// `ChannelRestricted`, `MembershipTooShort`, `InvalidSampling`) exist so that
/// lower layers can describe a refusal; the orchestrator converts them into
/// typed outcomes and never lets them escape as failures.
#[derive(Debug, Error)]
pub enum YalError {
    /// Configuration errors (invalid TOML, bad wordlist entry, out-of-range values).
    #[error("configuration error: {0}")]
    Config(String),

    /// The prompt was refused by the moderation gate.
    #[error("prompt blocked by moderation: {reason}")]
    ModerationBlocked { reason: String },

    /// The user has no free admission slot.
    #[error("admission denied: {reason}")]
    AdmissionDenied { reason: DenialReason },

    /// The command was issued outside the channel the bot is restricted to.
    #[error("commands are restricted away from channel {channel}")]
    ChannelRestricted { channel: ChannelId },

    /// The user joined the server too recently.
    #[error("membership too short: needed {needed_hours}h, have {have_hours}h")]
    MembershipTooShort { needed_hours: u64, have_hours: u64 },

    /// Sampling parameters fall outside the configured bounds.
    #[error("invalid sampling parameters: {0}")]
    InvalidSampling(String),

    /// The generation engine did not answer within the allotted time.
    #[error("generation timed out after {duration:?}")]
    GenerationTimeout { duration: std::time::Duration },

    /// The generation engine returned an error.
    #[error("generation failed: {message}")]
    GenerationFailed {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// No durable record exists for the requested key.
    #[error("no request record for user {user} with id {short_id}")]
    RecordNotFound { user: UserId, short_id: ShortId },

    /// A record already exists for this key. Short ids are fresh per request,
    /// so this is an invariant violation rather than a runtime condition.
    #[error("request record for user {user} with id {short_id} already exists")]
    DuplicateRecord { user: UserId, short_id: ShortId },

    /// A single persisted entry could not be decoded. Never fatal.
    #[error("corrupt store entry #{index}: {message}")]
    StoreEntryCorrupt { index: usize, message: String },

    /// Storage backend errors (filesystem, SQLite, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Chat transport errors (send, edit, membership lookup).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An interaction referenced a control id that is not live.
    #[error("unknown control id `{0}`")]
    UnknownControl(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl YalError {
    /// Wraps any error as a storage error.
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        YalError::Storage {
            source: Box::new(err),
        }
    }

    /// Returns true for errors that describe a refusal rather than a fault.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            YalError::ModerationBlocked { .. }
                | YalError::AdmissionDenied { .. }
                | YalError::ChannelRestricted { .. }
                | YalError::MembershipTooShort { .. }
                | YalError::InvalidSampling(_)
        )
    }
}
