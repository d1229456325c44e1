// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Admission controller owning all per-user slot state.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use yal_config::model::{QueueConfig, QueueMode};
use yal_core::types::{DenialReason, ShortId, UserId};

use crate::guard::AdmissionGuard;
use crate::state::UserQueueState;

/// Admission policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionMode {
    /// At most one request in flight per user.
    Single,
    /// Up to `max_depth` requests in flight per user.
    Bounded { max_depth: usize },
}

impl From<&QueueConfig> for AdmissionMode {
    fn from(config: &QueueConfig) -> Self {
        match config.mode {
            QueueMode::Single => AdmissionMode::Single,
            QueueMode::Bounded => AdmissionMode::Bounded {
                max_depth: config.max_depth,
            },
        }
    }
}

/// Result of [`AdmissionController::try_admit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    Denied(DenialReason),
}

/// Tracks in-flight requests per user.
///
/// The check and the mutation in [`try_admit`](Self::try_admit) happen
/// under the shard write lock held by `DashMap::entry`, so two tasks racing
/// for the same user see a single order.
#[derive(Debug)]
pub struct AdmissionController {
    mode: AdmissionMode,
    states: DashMap<UserId, UserQueueState>,
}

impl AdmissionController {
    pub fn new(mode: AdmissionMode) -> Self {
        Self {
            mode,
            states: DashMap::new(),
        }
    }

    pub fn from_config(config: &QueueConfig) -> Self {
        Self::new(AdmissionMode::from(config))
    }

    pub fn mode(&self) -> AdmissionMode {
        self.mode
    }

    /// Reserves a slot for `token` if the user has room.
    pub fn try_admit(&self, user: UserId, token: ShortId) -> Admission {
        if self.mode == (AdmissionMode::Bounded { max_depth: 0 }) {
            return Admission::Denied(DenialReason::AtCapacity);
        }
        match self.states.entry(user) {
            Entry::Vacant(slot) => {
                slot.insert(match self.mode {
                    AdmissionMode::Single => UserQueueState::Busy(token),
                    AdmissionMode::Bounded { .. } => UserQueueState::Occupied(vec![token]),
                });
                tracing::debug!(user_id = %user, in_flight = 1, "admitted");
                Admission::Admitted
            }
            Entry::Occupied(mut held) => match self.mode {
                AdmissionMode::Single => Admission::Denied(DenialReason::Busy),
                AdmissionMode::Bounded { max_depth } => {
                    let state = held.get_mut();
                    if state.len() >= max_depth {
                        return Admission::Denied(DenialReason::AtCapacity);
                    }
                    let mut tokens = match std::mem::take(state) {
                        UserQueueState::Occupied(tokens) => tokens,
                        UserQueueState::Busy(held) => vec![held],
                        UserQueueState::Idle => Vec::new(),
                    };
                    tokens.push(token);
                    let in_flight = tokens.len();
                    *state = UserQueueState::Occupied(tokens);
                    tracing::debug!(user_id = %user, in_flight, "admitted");
                    Admission::Admitted
                }
            },
        }
    }

    /// Releases `token`. Releasing an absent token is a no-op.
    pub fn complete(&self, user: UserId, token: &ShortId) {
        if let Entry::Occupied(mut held) = self.states.entry(user) {
            if !held.get_mut().release(token) {
                tracing::trace!(user_id = %user, short_id = %token, "release of absent token");
                return;
            }
            if held.get().is_idle() {
                held.remove();
            }
            tracing::debug!(user_id = %user, short_id = %token, "slot released");
        }
    }

    /// Like [`try_admit`](Self::try_admit), returning a guard that releases on drop.
    pub fn admit_guard(
        self: &Arc<Self>,
        user: UserId,
        token: ShortId,
    ) -> Result<AdmissionGuard, DenialReason> {
        match self.try_admit(user, token.clone()) {
            Admission::Admitted => Ok(AdmissionGuard::new(Arc::clone(self), user, token)),
            Admission::Denied(reason) => Err(reason),
        }
    }

    /// Slots currently held by `user`.
    pub fn in_flight(&self, user: UserId) -> usize {
        self.states.get(&user).map(|s| s.len()).unwrap_or(0)
    }

    /// Copy of the user's state.
    pub fn snapshot(&self, user: UserId) -> UserQueueState {
        self.states
            .get(&user)
            .map(|s| s.value().clone())
            .unwrap_or_default()
    }

    /// Number of users holding at least one slot.
    pub fn active_users(&self) -> usize {
        self.states.len()
    }
}
