// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Yal generation bot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use yal_core::types::{SamplingBounds, SamplingParams};

/// Top-level Yal configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct YalConfig {
    /// Bot identity and logging.
    #[serde(default)]
    pub bot: BotConfig,

    /// Per-user admission policy.
    #[serde(default)]
    pub queue: QueueConfig,

    /// Prompt moderation settings.
    #[serde(default)]
    pub moderation: ModerationConfig,

    /// Channel and membership restrictions.
    #[serde(default)]
    pub access: AccessConfig,

    /// Engine invocation policy (timeout, retries, post-processing).
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Sampling defaults and accepted ranges.
    #[serde(default)]
    pub sampling: SamplingConfig,

    /// Durable state locations.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Generation engine endpoint.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Transport size limits.
    #[serde(default)]
    pub delivery: DeliveryConfig,
}

/// Bot identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Display name of the bot.
    #[serde(default = "default_bot_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Guild the bot serves. Scopes the interactive element store file.
    #[serde(default)]
    pub deployment_id: Option<u64>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_bot_name(),
            log_level: default_log_level(),
            deployment_id: None,
        }
    }
}

fn default_bot_name() -> String {
    "yal".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Admission policy for concurrent requests of one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueMode {
    /// At most one in-flight request per user.
    #[default]
    Single,
    /// Up to `max_depth` in-flight requests per user.
    Bounded,
}

/// Per-user admission configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QueueConfig {
    #[serde(default)]
    pub mode: QueueMode,

    /// Maximum simultaneous requests per user in bounded mode.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            mode: QueueMode::default(),
            max_depth: default_max_depth(),
        }
    }
}

fn default_max_depth() -> usize {
    9999
}

/// Prompt moderation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ModerationConfig {
    /// Score prompts with the toxicity classifier.
    #[serde(default)]
    pub classifier_enabled: bool,

    /// Endpoint of the HTTP toxicity classifier.
    #[serde(default)]
    pub classifier_url: Option<String>,

    /// Per-category score above which a prompt is blocked.
    #[serde(default = "default_thresholds")]
    pub thresholds: BTreeMap<String, f32>,

    /// Newline separated wordlist. Entries wrapped as `r/.../` are regexes.
    #[serde(default)]
    pub wordlist_path: Option<PathBuf>,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            classifier_enabled: false,
            classifier_url: None,
            thresholds: default_thresholds(),
            wordlist_path: None,
        }
    }
}

/// Cutoffs tuned against the multilingual Detoxify model.
pub fn default_thresholds() -> BTreeMap<String, f32> {
    [
        ("sexual_explicit", 0.1),
        ("obscene", 0.5),
        ("toxicity", 0.8),
        ("severe_toxicity", 0.5),
        ("identity_attack", 0.5),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

/// Channel and membership restrictions.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AccessConfig {
    /// Every command must come from this channel.
    #[serde(default)]
    pub restrict_all_to_channel: Option<u64>,

    /// Slash commands must come from this channel.
    #[serde(default)]
    pub restrict_slash_to_channel: Option<u64>,

    /// Hours a user must have been on the server before using the bot.
    #[serde(default)]
    pub minimum_membership_hours: Option<u64>,
}

/// Engine invocation policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationConfig {
    /// Wall-clock budget for the whole attempt loop of one request.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Total engine calls allowed when the output keeps echoing the prompt.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Text delivered when every attempt was degenerate.
    #[serde(default = "default_fallback_text")]
    pub fallback_text: String,

    /// Cut displayed output back to its last full line.
    #[serde(default)]
    pub truncate_to_last_line: bool,

    /// Wrap prompts in the Alpaca instruction template.
    #[serde(default)]
    pub alpaca: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
            fallback_text: default_fallback_text(),
            truncate_to_last_line: false,
            alpaca: false,
        }
    }
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_max_attempts() -> u32 {
    5
}

fn default_fallback_text() -> String {
    "Sorry, I don't know how to answer this prompt.".to_string()
}

/// Sampling defaults and the ranges accepted from users.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SamplingConfig {
    #[serde(default)]
    pub defaults: SamplingParams,

    #[serde(default)]
    pub bounds: SamplingBounds,
}

/// Backend holding completed request records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordBackend {
    /// One JSON file per record in `data_dir`.
    #[default]
    Json,
    /// One row per record in `database_path`.
    Sqlite,
}

/// Durable state configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory for record files and the element store.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default)]
    pub record_backend: RecordBackend,

    /// SQLite file used when `record_backend = "sqlite"`.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// How far back interactive elements are reactivated on startup.
    #[serde(default = "default_reload_window_minutes")]
    pub reload_window_minutes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            record_backend: RecordBackend::default(),
            database_path: default_database_path(),
            reload_window_minutes: default_reload_window_minutes(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|p| p.join("yal"))
        .unwrap_or_else(|| PathBuf::from("yal-data"))
}

fn default_database_path() -> PathBuf {
    default_data_dir().join("records.db")
}

fn default_reload_window_minutes() -> u64 {
    120
}

impl StorageConfig {
    /// Path of the element store for a deployment.
    pub fn element_store_path(&self, deployment_id: Option<u64>) -> PathBuf {
        let deployment = deployment_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "None".to_string());
        self.data_dir.join(format!("button-store-{deployment}.json"))
    }

    /// The reload window, saturating rather than overflowing.
    pub fn reload_window(&self) -> Duration {
        Duration::from_secs(self.reload_window_minutes.saturating_mul(60))
    }
}

/// Generation engine endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Base URL of the llama.cpp-compatible completion server.
    #[serde(default = "default_engine_url")]
    pub base_url: String,

    /// HTTP-level timeout. Kept above `generation.timeout_secs`.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: default_engine_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_engine_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_request_timeout_secs() -> u64 {
    600
}

/// Transport size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DeliveryConfig {
    /// Maximum characters in one embed field.
    #[serde(default = "default_field_limit")]
    pub field_limit: usize,

    /// Maximum characters in one plain message.
    #[serde(default = "default_message_limit")]
    pub message_limit: usize,

    /// Characters of prompt shown above the output.
    #[serde(default = "default_prompt_display_chars")]
    pub prompt_display_chars: usize,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            field_limit: default_field_limit(),
            message_limit: default_message_limit(),
            prompt_display_chars: default_prompt_display_chars(),
        }
    }
}

fn default_field_limit() -> usize {
    1024
}

fn default_message_limit() -> usize {
    2000
}

fn default_prompt_display_chars() -> usize {
    256
}
