// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable request records keyed by `(user id, short id)`.
//!
//! A record is written once when a request completes and read back when the
//! user continues from it. Records are never updated.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use yal_config::model::{RecordBackend, StorageConfig};
use yal_core::YalError;
use yal_core::types::{RecordKey, RequestRecord};

use crate::sqlite::SqliteRecordStore;

/// Write-once storage for completed requests.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persists a new record. An existing key yields [`YalError::DuplicateRecord`].
    async fn save(&self, key: &RecordKey, record: &RequestRecord) -> Result<(), YalError>;

    /// Reads a record. A missing key yields [`YalError::RecordNotFound`].
    async fn load(&self, key: &RecordKey) -> Result<RequestRecord, YalError>;
}

/// Opens the backend selected in config.
pub async fn open_record_store(config: &StorageConfig) -> Result<Arc<dyn RecordStore>, YalError> {
    match config.record_backend {
        RecordBackend::Json => Ok(Arc::new(JsonRecordStore::open(&config.data_dir).await?)),
        RecordBackend::Sqlite => Ok(Arc::new(
            SqliteRecordStore::open(&config.database_path).await?,
        )),
    }
}

/// One JSON file per record: `request-{uid}_{short_id}.json`.
#[derive(Debug, Clone)]
pub struct JsonRecordStore {
    dir: PathBuf,
}

impl JsonRecordStore {
    /// Uses `dir`, creating it if needed.
    pub async fn open(dir: &Path) -> Result<Self, YalError> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(YalError::storage)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn path_for(&self, key: &RecordKey) -> PathBuf {
        self.dir
            .join(format!("request-{}_{}.json", key.user, key.short_id))
    }

    fn temp_path_for(&self, path: &Path) -> PathBuf {
        let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let name = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.dir
            .join(format!(".{name}.{}.{n}.tmp", std::process::id()))
    }
}

/// Distinguishes concurrent temp files within one process.
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

async fn write_synced(path: &Path, body: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(body).await?;
    file.sync_all().await
}

#[async_trait]
impl RecordStore for JsonRecordStore {
    async fn save(&self, key: &RecordKey, record: &RequestRecord) -> Result<(), YalError> {
        let path = self.path_for(key);
        let body = serde_json::to_vec(record).map_err(YalError::storage)?;

        // Publish only complete files: write a private temp file, then link it
        // into place. The link fails if the record already exists.
        let tmp = self.temp_path_for(&path);
        let published = match write_synced(&tmp, &body).await {
            Ok(()) => tokio::fs::hard_link(&tmp, &path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = tokio::fs::remove_file(&tmp).await
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(path = %tmp.display(), error = %e, "failed to remove temp record file");
        }
        match published {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(YalError::DuplicateRecord {
                    user: key.user,
                    short_id: key.short_id.clone(),
                });
            }
            Err(e) => return Err(YalError::storage(e)),
        }

        tracing::debug!(
            user_id = %key.user,
            short_id = %key.short_id,
            path = %path.display(),
            "request record saved"
        );
        Ok(())
    }

    async fn load(&self, key: &RecordKey) -> Result<RequestRecord, YalError> {
        let bytes = match tokio::fs::read(self.path_for(key)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(YalError::RecordNotFound {
                    user: key.user,
                    short_id: key.short_id.clone(),
                });
            }
            Err(e) => return Err(YalError::storage(e)),
        };
        serde_json::from_slice(&bytes).map_err(YalError::storage)
    }
}
