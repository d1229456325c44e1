// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request orchestration for the Yal generation bot.
//!
//! The [`Orchestrator`] composes the access gates, the moderation gate, the
//! admission controller, the generation engine, delivery formatting and the
//! durable stores, in that order, for every prompt:
//! - rejections before admission never touch the engine
//! - an admitted request releases its slot exactly once
//! - the engine runs under a timeout covering every retry

pub mod continuation;
pub mod gates;
pub mod orchestrator;
pub mod outcome;
pub mod shutdown;

pub use continuation::{CONTINUE_LABEL, ContinuationRegistry, ControlAction, WRITE_NEXT_PROMPT_LABEL};
pub use gates::{ChannelGate, MembershipGate};
pub use orchestrator::{Collaborators, Orchestrator, OrchestratorConfig};
pub use outcome::{Failure, Rejection, RunOutcome, RunState, notice_for};
