// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the interactive element store.

use std::sync::Arc;
use std::time::Duration;

use yal_core::types::{ControlDescriptor, InteractiveElement, MessageId, ShortId, UserId};
use yal_storage::ElementStore;

fn element(message_id: u64, time: i64) -> InteractiveElement {
    let sid = format!("{message_id:012}");
    InteractiveElement {
        message_id: MessageId(message_id),
        short_id_parent: ShortId(sid.clone()),
        uid: UserId(9),
        time,
        prompt_input_element_custom_id: format!("{sid}-prompt-entry"),
        items: vec![
            ControlDescriptor::Button {
                label: "Write Next Prompt".into(),
                row: 0,
                custom_id: format!("{sid}-prompt-modal"),
            },
            ControlDescriptor::Button {
                label: "Continue".into(),
                row: 0,
                custom_id: format!("{sid}-continue"),
            },
        ],
        prompt: String::new(),
    }
}

#[tokio::test]
async fn elements_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("button-store-1.json");

    let store = ElementStore::open(&path).await.unwrap();
    store.create(element(1, 100)).await.unwrap();
    store.create(element(2, 200)).await.unwrap();
    drop(store);

    let reopened = ElementStore::open(&path).await.unwrap();
    let all = reopened.all().await;
    assert_eq!(all.len(), 2);
    assert_eq!(all[0], element(1, 100));
    assert_eq!(all[1].message_id, MessageId(2));
    assert!(!dir.path().join("button-store-1.json.tmp").exists());
}

#[tokio::test]
async fn reload_window_is_inclusive_at_cutoff() {
    let dir = tempfile::tempdir().unwrap();
    let store = ElementStore::open(dir.path().join("store.json"))
        .await
        .unwrap();
    let now = 1_700_000_000;
    store.create(element(1, now - 7199)).await.unwrap();
    store.create(element(2, now - 7201)).await.unwrap();
    store.create(element(3, now - 7200)).await.unwrap();

    let recent = store.load_recent(Duration::from_secs(7200), now).await;
    let ids: Vec<u64> = recent.iter().map(|e| e.message_id.0).collect();
    assert_eq!(ids, vec![1, 3]);
}

#[tokio::test]
async fn malformed_entries_are_skipped_but_preserved() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    let good = serde_json::to_value(element(1, 500)).unwrap();
    let body = serde_json::json!({
        "chat_views": [good, {"message_id": "not a number"}]
    });
    std::fs::write(&path, serde_json::to_vec(&body).unwrap()).unwrap();

    let store = ElementStore::open(&path).await.unwrap();
    assert_eq!(store.len().await, 2);
    assert_eq!(store.unreadable().await, 1);
    assert_eq!(store.all().await.len(), 1);

    store.create(element(2, 600)).await.unwrap();

    let written: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    let entries = written["elements"].as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[1]["message_id"], "not a number");
    assert!(written.get("chat_views").is_none());
}

#[tokio::test]
async fn file_with_both_keys_keeps_every_entry() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    let body = serde_json::json!({
        "chat_views": [serde_json::to_value(element(1, 500)).unwrap()],
        "elements": [serde_json::to_value(element(2, 600)).unwrap()]
    });
    std::fs::write(&path, serde_json::to_vec(&body).unwrap()).unwrap();

    let store = ElementStore::open(&path).await.unwrap();
    let ids: Vec<u64> = store.all().await.iter().map(|e| e.message_id.0).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(store.unreadable().await, 0);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);

    store.create(element(3, 700)).await.unwrap();

    let written: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    let ids: Vec<u64> = written["elements"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["message_id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert!(written.get("chat_views").is_none());
}

#[tokio::test]
async fn corrupt_file_is_moved_aside() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    std::fs::write(&path, b"{ this is not json").unwrap();

    let store = ElementStore::open(&path).await.unwrap();
    assert!(store.is_empty().await);
    assert!(!path.exists());

    let moved: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("store.json.corrupt-"))
        .collect();
    assert_eq!(moved.len(), 1);
}

#[tokio::test]
async fn persisted_controls_carry_kind() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    let store = ElementStore::open(&path).await.unwrap();
    store.create(element(1, 1)).await.unwrap();

    let written: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    let item = &written["elements"][0]["items"][1];
    assert_eq!(item["kind"], "button");
    assert_eq!(item["label"], "Continue");
    assert_eq!(item["custom_id"], "000000000001-continue");
    assert_eq!(item["row"], 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_are_all_kept() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    let store = Arc::new(ElementStore::open(&path).await.unwrap());

    let handles: Vec<_> = (0..25u64)
        .map(|i| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.create(element(i, i as i64)).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let reopened = ElementStore::open(&path).await.unwrap();
    assert_eq!(reopened.len().await, 25);
}
