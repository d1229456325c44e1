// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! RAII release of an admission slot.

use std::sync::Arc;

use yal_core::types::{ShortId, UserId};

use crate::controller::AdmissionController;

/// Holds one admitted slot and releases it exactly once.
///
/// Release happens on [`release`](Self::release) or, failing that, on drop.
/// Every exit path of a request (success, timeout, error, panic unwinding)
/// therefore frees the slot.
#[must_use = "dropping the guard immediately releases the slot"]
#[derive(Debug)]
pub struct AdmissionGuard {
    controller: Arc<AdmissionController>,
    user: UserId,
    token: ShortId,
    released: bool,
}

impl AdmissionGuard {
    pub(crate) fn new(controller: Arc<AdmissionController>, user: UserId, token: ShortId) -> Self {
        Self {
            controller,
            user,
            token,
            released: false,
        }
    }

    pub fn user(&self) -> UserId {
        self.user
    }

    pub fn token(&self) -> &ShortId {
        &self.token
    }

    /// Releases the slot now.
    pub fn release(mut self) {
        self.release_once();
    }

    fn release_once(&mut self) {
        if !self.released {
            self.released = true;
            self.controller.complete(self.user, &self.token);
        }
    }
}

impl Drop for AdmissionGuard {
    fn drop(&mut self) {
        self.release_once();
    }
}
