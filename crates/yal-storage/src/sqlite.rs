// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed request records.
//!
//! Holds an `Arc<Connection>` and runs every statement through `call()`.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;
use yal_core::YalError;
use yal_core::types::{RecordKey, RequestRecord, SamplingParams};

use crate::records::RecordStore;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS request_records (
    user_id     INTEGER NOT NULL,
    short_id    TEXT    NOT NULL,
    prompt      TEXT    NOT NULL,
    output      TEXT    NOT NULL,
    max_tokens  INTEGER NOT NULL,
    temperature REAL    NOT NULL,
    top_p       REAL    NOT NULL,
    created_at  TEXT    NOT NULL,
    PRIMARY KEY (user_id, short_id)
);
";

/// Request records in a `request_records` table.
pub struct SqliteRecordStore {
    conn: Arc<Connection>,
}

impl SqliteRecordStore {
    /// Opens (or creates) the database file and ensures the schema.
    pub async fn open(path: &Path) -> Result<Self, YalError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(YalError::storage)?;
        }
        let conn = Connection::open(path).await.map_err(YalError::storage)?;
        let store = Self::new(Arc::new(conn));
        store.init(true).await?;
        Ok(store)
    }

    /// In-memory database, for tests and the interactive shell.
    pub async fn open_in_memory() -> Result<Self, YalError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(YalError::storage)?;
        let store = Self::new(Arc::new(conn));
        store.init(false).await?;
        Ok(store)
    }

    pub fn new(conn: Arc<Connection>) -> Self {
        Self { conn }
    }

    async fn init(&self, wal: bool) -> Result<(), YalError> {
        self.conn
            .call(move |conn| {
                if wal {
                    conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
                }
                conn.execute_batch(SCHEMA)?;
                Ok(())
            })
            .await
            .map_err(|e: tokio_rusqlite::Error<rusqlite::Error>| YalError::storage(e))
    }
}

fn user_column(key: &RecordKey) -> Result<i64, YalError> {
    i64::try_from(key.user.0)
        .map_err(|_| YalError::Internal(format!("user id {} does not fit in i64", key.user)))
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn save(&self, key: &RecordKey, record: &RequestRecord) -> Result<(), YalError> {
        let user_id = user_column(key)?;
        let short_id = key.short_id.to_string();
        let record = record.clone();
        let created_at = chrono::Utc::now().to_rfc3339();

        let inserted = self
            .conn
            .call(move |conn| {
                let result = conn.execute(
                    "INSERT INTO request_records \
                     (user_id, short_id, prompt, output, max_tokens, temperature, top_p, created_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    rusqlite::params![
                        user_id,
                        short_id,
                        record.prompt,
                        record.output,
                        record.sampling.max_tokens,
                        f64::from(record.sampling.temperature),
                        f64::from(record.sampling.top_p),
                        created_at,
                    ],
                );
                match result {
                    Ok(_) => Ok(true),
                    Err(rusqlite::Error::SqliteFailure(err, _))
                        if err.code == rusqlite::ErrorCode::ConstraintViolation =>
                    {
                        Ok(false)
                    }
                    Err(e) => Err(e),
                }
            })
            .await
            .map_err(|e: tokio_rusqlite::Error<rusqlite::Error>| YalError::storage(e))?;

        if !inserted {
            return Err(YalError::DuplicateRecord {
                user: key.user,
                short_id: key.short_id.clone(),
            });
        }
        tracing::debug!(user_id = %key.user, short_id = %key.short_id, "request record saved");
        Ok(())
    }

    async fn load(&self, key: &RecordKey) -> Result<RequestRecord, YalError> {
        let user_id = user_column(key)?;
        let short_id = key.short_id.to_string();

        let found = self
            .conn
            .call(move |conn| {
                conn.query_row(
                    "SELECT prompt, output, max_tokens, temperature, top_p \
                     FROM request_records WHERE user_id = ?1 AND short_id = ?2",
                    rusqlite::params![user_id, short_id],
                    |row| {
                        Ok(RequestRecord {
                            prompt: row.get(0)?,
                            output: row.get(1)?,
                            sampling: SamplingParams {
                                max_tokens: row.get(2)?,
                                temperature: row.get::<_, f64>(3)? as f32,
                                top_p: row.get::<_, f64>(4)? as f32,
                            },
                        })
                    },
                )
                .optional()
            })
            .await
            .map_err(|e: tokio_rusqlite::Error<rusqlite::Error>| YalError::storage(e))?;

        found.ok_or_else(|| YalError::RecordNotFound {
            user: key.user,
            short_id: key.short_id.clone(),
        })
    }
}
