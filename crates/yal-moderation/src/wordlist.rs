// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator-supplied blocklist of terms and patterns.
//!
//! One entry per line. Lines are trimmed and lowercased, blank lines are
//! skipped. An entry written as `r/<regex>/` is a pattern; anything else is
//! a literal term.

use std::path::Path;

use regex::Regex;
use yal_core::YalError;

/// A single wordlist entry.
#[derive(Debug, Clone)]
pub enum WordEntry {
    /// Matches when the lowercased prompt contains the term.
    Literal(String),
    /// Matches when the regex matches at the very start of the prompt.
    Pattern(Regex),
}

impl WordEntry {
    /// Parses one already-normalized line.
    fn parse(line: &str) -> Result<Self, YalError> {
        match line
            .strip_prefix("r/")
            .and_then(|rest| rest.strip_suffix('/'))
        {
            Some(source) => Regex::new(source)
                .map(WordEntry::Pattern)
                .map_err(|e| YalError::Config(format!("invalid wordlist pattern `{line}`: {e}"))),
            None => Ok(WordEntry::Literal(line.to_string())),
        }
    }

    /// Patterns see the prompt as typed; literals see it lowercased.
    fn matches(&self, prompt: &str, lowered: &str) -> bool {
        match self {
            WordEntry::Literal(term) => lowered.contains(term.as_str()),
            WordEntry::Pattern(re) => re.find(prompt).is_some_and(|m| m.start() == 0),
        }
    }
}

/// Compiled wordlist. Empty by default.
#[derive(Debug, Clone, Default)]
pub struct Wordlist {
    entries: Vec<WordEntry>,
}

impl Wordlist {
    /// Builds a wordlist from newline separated text.
    ///
    /// Fails on the first pattern that does not compile.
    pub fn parse(text: &str) -> Result<Self, YalError> {
        let entries = text
            .lines()
            .map(|line| line.trim().to_lowercase())
            .filter(|line| !line.is_empty())
            .map(|line| WordEntry::parse(&line))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    /// Reads and builds a wordlist file.
    pub fn load(path: &Path) -> Result<Self, YalError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            YalError::Config(format!("cannot read wordlist {}: {e}", path.display()))
        })?;
        let list = Self::parse(&text)?;
        tracing::info!(
            path = %path.display(),
            entries = list.len(),
            patterns = list.pattern_count(),
            "wordlist loaded"
        );
        Ok(list)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn pattern_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, WordEntry::Pattern(_)))
            .count()
    }

    /// Returns the first entry that matches the prompt.
    pub fn first_match(&self, prompt: &str) -> Option<&WordEntry> {
        if self.entries.is_empty() {
            return None;
        }
        let lowered = prompt.to_lowercase();
        self.entries.iter().find(|e| e.matches(prompt, &lowered))
    }
}
