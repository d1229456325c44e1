// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user slot state.

use yal_core::types::ShortId;

/// What a single user currently holds.
///
/// `Idle` is never stored; a missing map entry means idle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UserQueueState {
    #[default]
    Idle,
    /// Single mode: the one request in flight.
    Busy(ShortId),
    /// Bounded mode: in-flight requests in admission order.
    Occupied(Vec<ShortId>),
}

impl UserQueueState {
    /// Number of slots held.
    pub fn len(&self) -> usize {
        match self {
            UserQueueState::Idle => 0,
            UserQueueState::Busy(_) => 1,
            UserQueueState::Occupied(tokens) => tokens.len(),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.len() == 0
    }

    pub fn holds(&self, token: &ShortId) -> bool {
        match self {
            UserQueueState::Idle => false,
            UserQueueState::Busy(held) => held == token,
            UserQueueState::Occupied(tokens) => tokens.contains(token),
        }
    }

    /// Drops one occurrence of `token`. Returns whether anything changed.
    pub(crate) fn release(&mut self, token: &ShortId) -> bool {
        match self {
            UserQueueState::Busy(held) if held == token => {
                *self = UserQueueState::Idle;
                true
            }
            UserQueueState::Occupied(tokens) => match tokens.iter().position(|t| t == token) {
                Some(index) => {
                    tokens.remove(index);
                    if tokens.is_empty() {
                        *self = UserQueueState::Idle;
                    }
                    true
                }
                None => false,
            },
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ShortId {
        ShortId(s.to_string())
    }

    #[test]
    fn release_collapses_to_idle() {
        let mut state = UserQueueState::Occupied(vec![id("a"), id("b")]);
        assert!(state.release(&id("a")));
        assert_eq!(state, UserQueueState::Occupied(vec![id("b")]));
        assert!(state.release(&id("b")));
        assert_eq!(state, UserQueueState::Idle);
    }

    #[test]
    fn release_of_foreign_token_is_ignored() {
        let mut state = UserQueueState::Busy(id("a"));
        assert!(!state.release(&id("z")));
        assert_eq!(state.len(), 1);
        assert!(state.holds(&id("a")));
    }
}
