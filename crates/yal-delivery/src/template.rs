// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Alpaca instruction template.

pub const PREFIX_NO_INPUT: &str = "Below is an instruction that describes a task. \
Write a response that appropriately completes the request.\n\n";

pub const PREFIX_WITH_INPUT: &str = "Below is an instruction that describes a task, \
paired with an input that provides further context. \
Write a response that appropriately completes the request.\n\n";

pub const INSTRUCTION: &str = "### Instruction:\n";
pub const INPUT: &str = "\n### Input:\n";
pub const RESPONSE: &str = "\n### Response:\n";

/// Marker the model sometimes emits ahead of a repeated preamble.
pub const BOS_PREAMBLE: &str = "<s> Below is an instruction that describes a task. \
Write a response that appropriately completes the request.\n\n";

/// Prompts that already contain an input section are left alone.
pub fn is_templated(prompt: &str) -> bool {
    prompt.contains("### Input:")
}

/// Wraps a prompt, with an optional input section.
pub fn wrap(prompt: &str, input: Option<&str>) -> String {
    match input {
        None => format!("{PREFIX_NO_INPUT}{INSTRUCTION}{prompt}{RESPONSE}"),
        Some(input) => {
            format!("{PREFIX_WITH_INPUT}{INSTRUCTION}{prompt}{INPUT}{input}{RESPONSE}")
        }
    }
}

/// Template scaffolding removed, for showing the prompt back to the user.
pub fn clean_prompt(prompt: &str, has_input: bool) -> String {
    let cleaned = prompt.replace(BOS_PREAMBLE, "");
    if has_input {
        cleaned
            .replace(PREFIX_WITH_INPUT, "")
            .replace(INPUT, "\n\n")
            .replace(INSTRUCTION, "")
            .replace(RESPONSE, "")
    } else {
        cleaned
            .replace(PREFIX_NO_INPUT, "")
            .replace(INSTRUCTION, "")
            .replace(RESPONSE, "")
    }
}

/// Text after the last response marker, or the whole output.
pub fn extract_answer(output: &str) -> &str {
    match output.rfind(RESPONSE) {
        Some(idx) => &output[idx + RESPONSE.len()..],
        None => output,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_without_input() {
        let wrapped = wrap("Name three birds.", None);
        assert!(wrapped.starts_with(PREFIX_NO_INPUT));
        assert!(wrapped.ends_with("### Instruction:\nName three birds.\n### Response:\n"));
    }

    #[test]
    fn wrap_with_input_marks_prompt_templated() {
        let wrapped = wrap("Translate.", Some("bonjour"));
        assert!(is_templated(&wrapped));
        assert!(wrapped.contains("\n### Input:\nbonjour\n### Response:\n"));
    }

    #[test]
    fn clean_round_trips_instruction() {
        assert_eq!(clean_prompt(&wrap("Name three birds.", None), false), "Name three birds.");
        assert_eq!(
            clean_prompt(&wrap("Translate.", Some("bonjour")), true),
            "Translate.\n\nbonjour"
        );
    }

    #[test]
    fn answer_follows_last_marker() {
        let output = format!("{}robin, wren, jay", wrap("Name three birds.", None));
        assert_eq!(extract_answer(&output), "robin, wren, jay");
        assert_eq!(extract_answer("plain"), "plain");
    }
}
