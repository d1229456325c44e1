// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed results of one orchestrated request.

use std::time::Duration;

use strum::Display;
use yal_core::types::{ChannelId, DenialReason, GenerationResult};
use yal_delivery::notice;
use yal_delivery::render::DeliveryLimits;

/// Stage a request is in. Used for logging only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum RunState {
    Gating,
    Moderating,
    Admitting,
    Generating,
    Formatting,
    Persisting,
    Completed,
    Rejected,
    Failed,
}

/// Refusal before any engine work was done.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    ChannelRestricted { channel: ChannelId },
    InvalidSampling(String),
    Moderation(String),
    MembershipTooShort { needed_hours: u64, have_hours: u64 },
    Admission { reason: DenialReason, in_flight: usize },
}

/// Fault after the request was admitted.
#[derive(Debug, Clone, PartialEq)]
pub enum Failure {
    Timeout(Duration),
    Generation(String),
    Store(String),
    Transport(String),
}

impl Failure {
    /// Error text shown to the user.
    pub fn detail(&self) -> String {
        match self {
            Failure::Timeout(duration) => format!("timed out after {}s", duration.as_secs()),
            Failure::Generation(detail) | Failure::Store(detail) | Failure::Transport(detail) => {
                detail.clone()
            }
        }
    }
}

/// Terminal state of [`Orchestrator::run`](crate::Orchestrator::run).
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed(GenerationResult),
    Rejected(Rejection),
    Failed(Failure),
}

impl RunOutcome {
    pub fn state(&self) -> RunState {
        match self {
            RunOutcome::Completed(_) => RunState::Completed,
            RunOutcome::Rejected(_) => RunState::Rejected,
            RunOutcome::Failed(_) => RunState::Failed,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed(_))
    }

    pub fn result(&self) -> Option<&GenerationResult> {
        match self {
            RunOutcome::Completed(result) => Some(result),
            _ => None,
        }
    }
}

/// Text to post for an outcome. Completed runs already edited their own
/// message, so they get none.
pub fn notice_for(outcome: &RunOutcome, limits: &DeliveryLimits) -> Option<String> {
    let text = match outcome {
        RunOutcome::Completed(_) => return None,
        RunOutcome::Rejected(rejection) => match rejection {
            Rejection::ChannelRestricted { .. } => notice::CHANNEL_RESTRICTED.to_string(),
            Rejection::InvalidSampling(detail) => notice::invalid_sampling(detail),
            Rejection::Moderation(_) => notice::MODERATION_BLOCKED.to_string(),
            Rejection::MembershipTooShort {
                needed_hours,
                have_hours,
            } => notice::membership_too_short(*needed_hours, *have_hours),
            Rejection::Admission {
                reason: DenialReason::Busy,
                in_flight,
            } => notice::busy(*in_flight),
            Rejection::Admission {
                reason: DenialReason::AtCapacity,
                in_flight,
            } => notice::at_capacity(*in_flight),
        },
        RunOutcome::Failed(Failure::Timeout(duration)) => notice::timed_out(duration.as_secs()),
        RunOutcome::Failed(failure) => notice::failure(&failure.detail(), limits.message_limit),
    };
    Some(text)
}
