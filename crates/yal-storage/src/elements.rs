// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only store of interactive "continue" elements.
//!
//! The whole sequence lives in one JSON file per deployment,
//! `{"elements": [...]}`, rewritten in full on every append. Nothing is
//! ever evicted; staleness is decided by [`ElementStore::load_recent`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use yal_core::YalError;
use yal_core::types::InteractiveElement;

/// Top-level key written by this store.
pub const ELEMENTS_KEY: &str = "elements";

/// Key used by older deployments. Still accepted on read.
pub const LEGACY_ELEMENTS_KEY: &str = "chat_views";

/// One stored entry. Unreadable entries ride along untouched.
#[derive(Debug, Clone)]
enum StoredEntry {
    Element(InteractiveElement),
    Unreadable(Value),
}

impl StoredEntry {
    fn to_value(&self) -> Result<Value, YalError> {
        match self {
            StoredEntry::Element(element) => {
                serde_json::to_value(element).map_err(YalError::storage)
            }
            StoredEntry::Unreadable(raw) => Ok(raw.clone()),
        }
    }
}

#[derive(Serialize)]
struct StoreFileOut<'a> {
    elements: &'a [Value],
}

#[derive(Deserialize)]
struct StoreFileIn {
    #[serde(default)]
    elements: Vec<Value>,
    #[serde(default)]
    chat_views: Vec<Value>,
}

impl StoreFileIn {
    /// Legacy entries predate anything under the current key.
    fn into_entries(self) -> Vec<Value> {
        let mut entries = self.chat_views;
        entries.extend(self.elements);
        entries
    }
}

/// Durable, restartable interactive elements for one deployment.
///
/// A single `tokio::sync::Mutex` covers both the in-memory mirror and the
/// file rewrite, so appends are serialized and the file always reflects the
/// mirror as of the last successful write.
#[derive(Debug)]
pub struct ElementStore {
    path: PathBuf,
    entries: Mutex<Vec<StoredEntry>>,
}

impl ElementStore {
    /// Reads the store at `path`, starting empty if it does not exist.
    ///
    /// A file that is not valid JSON is moved to `<name>.corrupt-<unix>`
    /// and the store starts empty. Individual entries that do not decode
    /// are kept verbatim and skipped by readers.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, YalError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(YalError::storage)?;
        }

        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<StoreFileIn>(&bytes) {
                Ok(file) => decode_entries(file.into_entries()),
                Err(e) => {
                    quarantine(&path, &e).await?;
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(YalError::storage(e)),
        };

        tracing::info!(
            path = %path.display(),
            entries = entries.len(),
            "element store opened"
        );
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `element` and rewrites the file.
    ///
    /// If the write fails the element is dropped from memory as well, so the
    /// mirror never runs ahead of the file.
    pub async fn create(&self, element: InteractiveElement) -> Result<(), YalError> {
        let mut entries = self.entries.lock().await;
        let message_id = element.message_id;
        entries.push(StoredEntry::Element(element));

        if let Err(e) = self.write_all(&entries).await {
            entries.pop();
            tracing::error!(error = %e, path = %self.path.display(), "element store write failed");
            return Err(e);
        }
        tracing::debug!(
            message_id = %message_id,
            total = entries.len(),
            "interactive element stored"
        );
        Ok(())
    }

    /// Elements created at or after `now - window`.
    pub async fn load_recent(&self, window: Duration, now: i64) -> Vec<InteractiveElement> {
        let window = i64::try_from(window.as_secs()).unwrap_or(i64::MAX);
        let cutoff = now.saturating_sub(window);
        self.entries
            .lock()
            .await
            .iter()
            .filter_map(|entry| match entry {
                StoredEntry::Element(element) if element.time >= cutoff => Some(element.clone()),
                _ => None,
            })
            .collect()
    }

    /// Every readable element, oldest first.
    pub async fn all(&self) -> Vec<InteractiveElement> {
        self.entries
            .lock()
            .await
            .iter()
            .filter_map(|entry| match entry {
                StoredEntry::Element(element) => Some(element.clone()),
                StoredEntry::Unreadable(_) => None,
            })
            .collect()
    }

    /// Stored entries, including unreadable ones.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Entries kept verbatim because they did not decode.
    pub async fn unreadable(&self) -> usize {
        self.entries
            .lock()
            .await
            .iter()
            .filter(|e| matches!(e, StoredEntry::Unreadable(_)))
            .count()
    }

    async fn write_all(&self, entries: &[StoredEntry]) -> Result<(), YalError> {
        let values = entries
            .iter()
            .map(StoredEntry::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        let body = serde_json::to_vec(&StoreFileOut { elements: &values })
            .map_err(YalError::storage)?;

        let tmp = tmp_path(&self.path);
        tokio::fs::write(&tmp, body)
            .await
            .map_err(YalError::storage)?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(YalError::storage)
    }
}

fn decode_entries(raw: Vec<Value>) -> Vec<StoredEntry> {
    raw.into_iter()
        .enumerate()
        .map(
            |(index, value)| match serde_json::from_value::<InteractiveElement>(value.clone()) {
                Ok(element) => StoredEntry::Element(element),
                Err(e) => {
                    let err = YalError::StoreEntryCorrupt {
                        index,
                        message: e.to_string(),
                    };
                    tracing::warn!(error = %err, "skipping unreadable interactive element");
                    StoredEntry::Unreadable(value)
                }
            },
        )
        .collect()
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Moves an unparseable store file out of the way.
async fn quarantine(path: &Path, cause: &serde_json::Error) -> Result<(), YalError> {
    let mut aside = path.as_os_str().to_os_string();
    aside.push(format!(".corrupt-{}", chrono::Utc::now().timestamp()));
    let aside = PathBuf::from(aside);
    tokio::fs::rename(path, &aside)
        .await
        .map_err(YalError::storage)?;
    tracing::warn!(
        path = %path.display(),
        moved_to = %aside.display(),
        error = %cause,
        "element store unreadable, starting empty"
    );
    Ok(())
}
