// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user admission control for the Yal generation bot.
//!
//! The generation engine serializes work on one device and has no queue of
//! its own, so every limit on how much a single user may have in flight is
//! enforced here.

pub mod controller;
pub mod guard;
pub mod state;

pub use controller::{Admission, AdmissionController, AdmissionMode};
pub use guard::AdmissionGuard;
pub use state::UserQueueState;
