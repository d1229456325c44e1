// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable state for the Yal generation bot.
//!
//! - [`RecordStore`]: one write-once record per completed request, as JSON
//!   files or SQLite rows.
//! - [`ElementStore`]: the per-deployment file of interactive elements that
//!   survive restarts.

pub mod elements;
pub mod records;
pub mod sqlite;

pub use elements::{ELEMENTS_KEY, ElementStore, LEGACY_ELEMENTS_KEY};
pub use records::{JsonRecordStore, RecordStore, open_record_store};
pub use sqlite::SqliteRecordStore;
