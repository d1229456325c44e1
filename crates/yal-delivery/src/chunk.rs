// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Splitting output into transport-sized fields.

/// Label of the first output segment.
pub const OUTPUT_LABEL: &str = "Output";

/// Label of every segment after the first.
pub const CONTINUED_LABEL: &str = "Continued Output";

/// One labelled slice of the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSegment {
    pub label: &'static str,
    pub text: String,
}

/// Splits `output` into consecutive segments of at most `field_limit` chars.
///
/// Counts Unicode scalar values, so a character is never split. Produces
/// `ceil(chars / field_limit)` segments whose concatenation is `output`;
/// empty output yields none.
pub fn chunk(output: &str, field_limit: usize) -> Vec<OutputSegment> {
    let limit = field_limit.max(1);
    let mut segments = Vec::new();
    let mut rest = output;

    while !rest.is_empty() {
        let cut = rest
            .char_indices()
            .nth(limit)
            .map(|(idx, _)| idx)
            .unwrap_or(rest.len());
        let (head, tail) = rest.split_at(cut);
        segments.push(OutputSegment {
            label: if segments.is_empty() {
                OUTPUT_LABEL
            } else {
                CONTINUED_LABEL
            },
            text: head.to_string(),
        });
        rest = tail;
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn splits_2500_into_three() {
        let output = "x".repeat(2500);
        let segments = chunk(&output, 1024);
        let lens: Vec<usize> = segments.iter().map(|s| s.text.chars().count()).collect();
        assert_eq!(lens, vec![1024, 1024, 452]);
        assert_eq!(segments[0].label, OUTPUT_LABEL);
        assert_eq!(segments[1].label, CONTINUED_LABEL);
        assert_eq!(segments[2].label, CONTINUED_LABEL);
    }

    #[test]
    fn exact_multiple_has_no_empty_tail() {
        let segments = chunk(&"a".repeat(2048), 1024);
        assert_eq!(segments.len(), 2);
    }

    #[test]
    fn empty_output_yields_nothing() {
        assert!(chunk("", 1024).is_empty());
    }

    #[test]
    fn multibyte_characters_are_not_split() {
        let output = "é".repeat(5);
        let segments = chunk(&output, 2);
        let texts: Vec<&str> = segments.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["éé", "éé", "é"]);
    }

    proptest! {
        #[test]
        fn concatenation_reproduces_input(s in "\\PC{0,300}", limit in 1usize..64) {
            let segments = chunk(&s, limit);
            let chars = s.chars().count();
            prop_assert_eq!(segments.len(), chars.div_ceil(limit));
            prop_assert!(segments.iter().all(|seg| seg.text.chars().count() <= limit));
            let joined: String = segments.iter().map(|seg| seg.text.as_str()).collect();
            prop_assert_eq!(joined, s);
        }
    }
}
