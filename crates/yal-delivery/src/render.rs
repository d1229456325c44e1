// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builds the rich result message.

use yal_config::model::DeliveryConfig;
use yal_core::types::Embed;

use crate::chunk::chunk;
use crate::display::truncate_prompt_for_display;

/// Name of the field echoing the prompt.
pub const PROMPT_LABEL: &str = "Prompt";

/// Transport size limits applied when rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryLimits {
    pub field_limit: usize,
    pub message_limit: usize,
    pub prompt_display_chars: usize,
}

impl Default for DeliveryLimits {
    fn default() -> Self {
        Self::from(&DeliveryConfig::default())
    }
}

impl From<&DeliveryConfig> for DeliveryLimits {
    fn from(config: &DeliveryConfig) -> Self {
        Self {
            field_limit: config.field_limit,
            message_limit: config.message_limit,
            prompt_display_chars: config.prompt_display_chars,
        }
    }
}

/// A `Prompt` field followed by the chunked output fields.
///
/// `prompt` is what the user should see (template already removed);
/// it is shortened from the front to fit.
pub fn render_result(prompt: &str, display_output: &str, limits: &DeliveryLimits) -> Embed {
    let shown_prompt = truncate_prompt_for_display(
        prompt,
        limits.prompt_display_chars.min(limits.field_limit.saturating_sub(3)),
    );
    chunk(display_output, limits.field_limit)
        .into_iter()
        .fold(
            Embed::default().with_field(PROMPT_LABEL, shown_prompt),
            |embed, segment| embed.with_field(segment.label, segment.text),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::{CONTINUED_LABEL, OUTPUT_LABEL};

    #[test]
    fn prompt_then_output_fields() {
        let embed = render_result("Hi", &"y".repeat(1500), &DeliveryLimits::default());
        let names: Vec<&str> = embed.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec![PROMPT_LABEL, OUTPUT_LABEL, CONTINUED_LABEL]);
        assert_eq!(embed.fields[0].value, "Hi");
    }

    #[test]
    fn long_prompt_is_shortened() {
        let prompt = "p".repeat(300);
        let embed = render_result(&prompt, "out", &DeliveryLimits::default());
        assert_eq!(embed.fields[0].value.chars().count(), 3 + 256);
        assert!(embed.fields[0].value.starts_with("..."));
    }

    #[test]
    fn prompt_field_respects_small_field_limit() {
        let limits = DeliveryLimits {
            field_limit: 20,
            message_limit: 2000,
            prompt_display_chars: 256,
        };
        let embed = render_result(&"p".repeat(100), "out", &limits);
        assert!(embed.fields[0].value.chars().count() <= 20);
    }
}
