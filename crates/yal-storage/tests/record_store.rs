// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Both record backends behind the same trait.

use std::sync::Arc;

use yal_config::model::{RecordBackend, StorageConfig};
use yal_core::YalError;
use yal_core::types::{RecordKey, RequestRecord, SamplingParams, ShortId, UserId};
use yal_storage::{RecordStore, open_record_store};

fn record() -> RequestRecord {
    RequestRecord {
        prompt: "Tell me a story".into(),
        output: "Tell me a story about a lighthouse.".into(),
        sampling: SamplingParams::default(),
    }
}

async fn exercise(store: Arc<dyn RecordStore>) {
    let key = RecordKey::new(UserId(77), ShortId("Zz0Zz0Zz0Zz0".into()));
    assert!(matches!(
        store.load(&key).await,
        Err(YalError::RecordNotFound { .. })
    ));
    store.save(&key, &record()).await.unwrap();
    assert_eq!(store.load(&key).await.unwrap(), record());
    assert!(matches!(
        store.save(&key, &record()).await,
        Err(YalError::DuplicateRecord { .. })
    ));
}

#[tokio::test]
async fn json_backend_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = StorageConfig {
        data_dir: dir.path().join("records"),
        record_backend: RecordBackend::Json,
        ..StorageConfig::default()
    };
    exercise(open_record_store(&config).await.unwrap()).await;
    assert!(
        dir.path()
            .join("records/request-77_Zz0Zz0Zz0Zz0.json")
            .exists()
    );
}

#[tokio::test]
async fn sqlite_backend_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = StorageConfig {
        database_path: dir.path().join("db/records.db"),
        record_backend: RecordBackend::Sqlite,
        ..StorageConfig::default()
    };
    exercise(open_record_store(&config).await.unwrap()).await;
    assert!(dir.path().join("db/records.db").exists());
}
