// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `yal elements` command implementation.

use chrono::DateTime;
use colored::Colorize;
use yal_config::YalConfig;
use yal_core::YalError;
use yal_core::types::InteractiveElement;
use yal_storage::ElementStore;

/// Prompt characters shown per element.
const DRAFT_PREVIEW_CHARS: usize = 40;

/// Lists the deployment's interactive elements.
///
/// Without `all`, only elements a restart would reactivate are shown.
pub async fn run_elements(config: &YalConfig, all: bool) -> Result<(), YalError> {
    let path = config.storage.element_store_path(config.bot.deployment_id);
    let store = ElementStore::open(&path).await?;

    let elements = if all {
        store.all().await
    } else {
        let window = config.storage.reload_window();
        store.load_recent(window, chrono::Utc::now().timestamp()).await
    };

    println!("{}", path.display().to_string().bold());
    for element in &elements {
        println!("{}", describe(element));
    }

    let unreadable = store.unreadable().await;
    let summary = format!(
        "{} shown, {} stored, {} unreadable",
        elements.len(),
        store.len().await,
        unreadable
    );
    if unreadable > 0 {
        println!("{}", summary.yellow());
    } else {
        println!("{}", summary.dimmed());
    }
    Ok(())
}

fn describe(element: &InteractiveElement) -> String {
    let created = DateTime::from_timestamp(element.time, 0)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| element.time.to_string());
    let controls = element
        .items
        .iter()
        .map(|c| c.custom_id())
        .collect::<Vec<_>>()
        .join(", ");

    let mut line = format!(
        "{}  user={} message={} created={}  [{}]",
        element.short_id_parent, element.uid, element.message_id, created, controls
    );
    if !element.prompt.is_empty() {
        let preview: String = element.prompt.chars().take(DRAFT_PREVIEW_CHARS).collect();
        line.push_str(&format!("  draft={preview:?}"));
    }
    line
}
