// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Formatting of results and notices within transport size limits.

pub mod chunk;
pub mod display;
pub mod notice;
pub mod render;
pub mod template;

pub use chunk::{CONTINUED_LABEL, OUTPUT_LABEL, OutputSegment, chunk};
pub use display::{strip_prompt_echo, truncate_prompt_for_display, truncate_to_last_line};
pub use render::{DeliveryLimits, PROMPT_LABEL, render_result};
