// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Display-only cleanup of prompts and outputs.

/// Shortens a long prompt to `...` followed by its last `max_chars` chars.
pub fn truncate_prompt_for_display(prompt: &str, max_chars: usize) -> String {
    let total = prompt.chars().count();
    if total <= max_chars {
        return prompt.to_string();
    }
    let tail: String = prompt.chars().skip(total - max_chars).collect();
    format!("...{tail}")
}

/// Removes a verbatim leading echo of `prompt` from `output`.
pub fn strip_prompt_echo<'a>(prompt: &str, output: &'a str) -> &'a str {
    output.strip_prefix(prompt).unwrap_or(output)
}

/// Cuts `text` back to its last complete line.
///
/// Text without a newline is returned unchanged.
pub fn truncate_to_last_line(text: &str) -> &str {
    match text.rfind('\n') {
        Some(idx) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_prompt_keeps_tail() {
        assert_eq!(truncate_prompt_for_display("abcdefgh", 3), "...fgh");
        assert_eq!(truncate_prompt_for_display("abc", 3), "abc");
    }

    #[test]
    fn truncation_counts_chars() {
        assert_eq!(truncate_prompt_for_display("ääää", 2), "...ää");
    }

    #[test]
    fn echo_is_stripped_only_at_start() {
        assert_eq!(strip_prompt_echo("Hi", "Hi there"), " there");
        assert_eq!(strip_prompt_echo("Hi", "Oh Hi there"), "Oh Hi there");
    }

    #[test]
    fn last_line_boundary() {
        assert_eq!(truncate_to_last_line("one\ntwo\nthr"), "one\ntwo");
        assert_eq!(truncate_to_last_line("no newline"), "no newline");
    }
}
