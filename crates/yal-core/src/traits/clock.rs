// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Injectable time and identifier sources.

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;

use crate::types::{SHORT_ID_LEN, ShortId};

/// Source of the current time.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Source of fresh short ids.
pub trait IdGenerator: Send + Sync + 'static {
    fn short_id(&self) -> ShortId;
}

/// Thread-local RNG drawing from `[A-Za-z0-9]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn short_id(&self) -> ShortId {
        let id: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SHORT_ID_LEN)
            .map(char::from)
            .collect();
        ShortId(id)
    }
}
