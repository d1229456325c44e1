// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt moderation for the Yal generation bot.
//!
//! A prompt is blocked when any classifier category scores strictly above
//! its threshold, or when it hits the operator wordlist.

pub mod gate;
pub mod wordlist;

pub use gate::{CLASSIFIER_UNAVAILABLE, ModerationGate};
pub use wordlist::{WordEntry, Wordlist};
