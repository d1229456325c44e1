// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic clock and id sources.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use chrono::{DateTime, Utc};

use yal_core::traits::{Clock, IdGenerator};
use yal_core::types::ShortId;

/// A clock that only moves when told to. Second resolution.
#[derive(Debug)]
pub struct FixedClock {
    unix: AtomicI64,
}

impl FixedClock {
    pub fn at(time: DateTime<Utc>) -> Self {
        Self {
            unix: AtomicI64::new(time.timestamp()),
        }
    }

    pub fn set(&self, time: DateTime<Utc>) {
        self.unix.store(time.timestamp(), Ordering::SeqCst);
    }

    pub fn advance_secs(&self, secs: i64) {
        self.unix.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        Self::at(Utc::now())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.unix.load(Ordering::SeqCst), 0).unwrap_or_default()
    }
}

/// Hands out `id0000000001`, `id0000000002`, ...
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIds {
    fn short_id(&self) -> ShortId {
        let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        ShortId(format!("id{n:010}"))
    }
}
