// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Yal components.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::YalError;

/// Length of every generated [`ShortId`].
pub const SHORT_ID_LEN: usize = 12;

/// Chat platform user identifier (a snowflake on Discord).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

/// Chat platform channel identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub u64);

/// Chat platform message identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub u64);

/// Identifier of an interaction (button press, modal submit) awaiting acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InteractionId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for InteractionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Compact random identifier correlating a request, its durable record, and
/// any interactive element spawned from it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortId(pub String);

impl ShortId {
    /// Parses a short id, accepting exactly [`SHORT_ID_LEN`] ASCII alphanumerics.
    pub fn parse(s: &str) -> Option<Self> {
        if s.len() == SHORT_ID_LEN && s.bytes().all(|b| b.is_ascii_alphanumeric()) {
            Some(Self(s.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of external collaborator behind an adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Engine,
    Classifier,
    Transport,
}

/// Why the admission controller refused a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum DenialReason {
    /// Single mode: the user already has a request in flight.
    Busy,
    /// Bounded mode: the user holds `max_depth` slots already.
    AtCapacity,
}

/// Outcome of a moderation check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModerationVerdict {
    Allow,
    Block(String),
}

impl ModerationVerdict {
    pub fn is_blocked(&self) -> bool {
        matches!(self, ModerationVerdict::Block(_))
    }
}

// --- Sampling ---

/// Sampling parameters handed to the generation engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingParams {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            max_tokens: 256,
            temperature: 0.8,
            top_p: 0.95,
        }
    }
}

/// Inclusive range accepted for one sampling parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParamRange<T> {
    pub min: T,
    pub max: T,
}

impl<T: PartialOrd + Copy> ParamRange<T> {
    pub fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Accepted ranges for every sampling parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SamplingBounds {
    pub max_tokens: ParamRange<u32>,
    pub temperature: ParamRange<f32>,
    pub top_p: ParamRange<f32>,
}

impl Default for SamplingBounds {
    fn default() -> Self {
        Self {
            max_tokens: ParamRange::new(128, 2048),
            temperature: ParamRange::new(0.01, 1.0),
            top_p: ParamRange::new(0.01, 10.0),
        }
    }
}

impl SamplingBounds {
    /// Checks every parameter, reporting the first one out of range.
    pub fn check(&self, params: &SamplingParams) -> Result<(), YalError> {
        if !self.max_tokens.contains(params.max_tokens) {
            return Err(YalError::InvalidSampling(format!(
                "max_tokens must be between {} and {}, got {}",
                self.max_tokens.min, self.max_tokens.max, params.max_tokens
            )));
        }
        if !self.temperature.contains(params.temperature) {
            return Err(YalError::InvalidSampling(format!(
                "temperature must be between {} and {}, got {}",
                self.temperature.min, self.temperature.max, params.temperature
            )));
        }
        if !self.top_p.contains(params.top_p) {
            return Err(YalError::InvalidSampling(format!(
                "top_p must be between {} and {}, got {}",
                self.top_p.min, self.top_p.max, params.top_p
            )));
        }
        Ok(())
    }
}

// --- Requests and results ---

/// How a request entered the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum RequestOrigin {
    /// A `/chat` style command.
    #[default]
    Command,
    /// A control on an earlier result ("Continue", draft submit).
    Continuation,
}

/// One prompt submitted by a user.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub sampling: SamplingParams,
    pub user: UserId,
    pub channel: ChannelId,
    pub short_id: ShortId,
    pub created_at: DateTime<Utc>,
    /// Optional context paired with the instruction when templating.
    pub input: Option<String>,
    /// Skip instruction templating (continuations already carry it).
    pub bypass_template: bool,
    pub origin: RequestOrigin,
}

impl GenerationRequest {
    pub fn new(
        prompt: impl Into<String>,
        sampling: SamplingParams,
        user: UserId,
        channel: ChannelId,
        short_id: ShortId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            sampling,
            user,
            channel,
            short_id,
            created_at,
            input: None,
            bypass_template: false,
            origin: RequestOrigin::Command,
        }
    }

    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    pub fn bypassing_template(mut self) -> Self {
        self.bypass_template = true;
        self
    }

    /// Marks the request as coming from a control on an earlier result.
    pub fn from_continuation(mut self) -> Self {
        self.origin = RequestOrigin::Continuation;
        self.bypass_template = true;
        self
    }
}

/// The delivered outcome of a successful generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult {
    pub short_id: ShortId,
    /// Full engine output as persisted.
    pub output: String,
    /// Output as shown to the user (echo stripped, optionally line-truncated).
    pub display_output: String,
    /// Extra engine calls spent on degenerate output.
    pub retries: u32,
    /// The fixed fallback text replaced the engine output.
    pub used_fallback: bool,
    /// Message that carries the result and its controls.
    pub message_id: MessageId,
}

/// Durable key of a [`RequestRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub user: UserId,
    pub short_id: ShortId,
}

impl RecordKey {
    pub fn new(user: UserId, short_id: ShortId) -> Self {
        Self { user, short_id }
    }
}

/// Completed prompt, output and settings, read back by continuation flows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestRecord {
    pub prompt: String,
    pub output: String,
    #[serde(flatten)]
    pub sampling: SamplingParams,
}

// --- Interactive elements ---

/// Kind tag written next to each persisted control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlKind {
    #[default]
    Button,
    Select,
}

/// One control attached to an interactive element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ControlRecord", into = "ControlRecord")]
pub enum ControlDescriptor {
    Button {
        label: String,
        row: u8,
        custom_id: String,
    },
    Select {
        placeholder: String,
        row: u8,
        custom_id: String,
    },
}

impl ControlDescriptor {
    /// Button label or select placeholder.
    pub fn label(&self) -> &str {
        match self {
            ControlDescriptor::Button { label, .. } => label,
            ControlDescriptor::Select { placeholder, .. } => placeholder,
        }
    }

    pub fn row(&self) -> u8 {
        match self {
            ControlDescriptor::Button { row, .. } | ControlDescriptor::Select { row, .. } => *row,
        }
    }

    pub fn custom_id(&self) -> &str {
        match self {
            ControlDescriptor::Button { custom_id, .. }
            | ControlDescriptor::Select { custom_id, .. } => custom_id,
        }
    }

    pub fn kind(&self) -> ControlKind {
        match self {
            ControlDescriptor::Button { .. } => ControlKind::Button,
            ControlDescriptor::Select { .. } => ControlKind::Select,
        }
    }
}

/// Flat on-disk shape shared by both control kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ControlRecord {
    #[serde(default)]
    kind: ControlKind,
    label: String,
    custom_id: String,
    #[serde(default)]
    row: u8,
}

impl From<ControlRecord> for ControlDescriptor {
    fn from(rec: ControlRecord) -> Self {
        match rec.kind {
            ControlKind::Button => ControlDescriptor::Button {
                label: rec.label,
                row: rec.row,
                custom_id: rec.custom_id,
            },
            ControlKind::Select => ControlDescriptor::Select {
                placeholder: rec.label,
                row: rec.row,
                custom_id: rec.custom_id,
            },
        }
    }
}

impl From<ControlDescriptor> for ControlRecord {
    fn from(control: ControlDescriptor) -> Self {
        ControlRecord {
            kind: control.kind(),
            label: control.label().to_string(),
            custom_id: control.custom_id().to_string(),
            row: control.row(),
        }
    }
}

/// A persisted, restartable set of controls letting a user continue a prior request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractiveElement {
    pub message_id: MessageId,
    pub short_id_parent: ShortId,
    pub uid: UserId,
    /// Creation time, unix seconds.
    pub time: i64,
    pub prompt_input_element_custom_id: String,
    pub items: Vec<ControlDescriptor>,
    /// Draft text entered before the element was persisted.
    #[serde(default)]
    pub prompt: String,
}

impl InteractiveElement {
    /// Finds the control with the given custom id.
    pub fn control(&self, custom_id: &str) -> Option<&ControlDescriptor> {
        self.items.iter().find(|c| c.custom_id() == custom_id)
    }
}

// --- Transport payloads ---

/// A named field of a rich message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
}

/// Rich message body (a Discord embed).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Embed {
    pub description: Option<String>,
    pub fields: Vec<EmbedField>,
}

impl Embed {
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
        });
        self
    }
}

/// A message to be sent or used as the replacement body of an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub channel: ChannelId,
    pub content: String,
    pub embed: Option<Embed>,
    pub controls: Vec<ControlDescriptor>,
}

impl OutboundMessage {
    pub fn text(channel: ChannelId, content: impl Into<String>) -> Self {
        Self {
            channel,
            content: content.into(),
            embed: None,
            controls: Vec::new(),
        }
    }

    pub fn with_embed(mut self, embed: Embed) -> Self {
        self.embed = Some(embed);
        self
    }

    pub fn with_controls(mut self, controls: Vec<ControlDescriptor>) -> Self {
        self.controls = controls;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_id_parse_accepts_only_twelve_alphanumerics() {
        assert!(ShortId::parse("abcDEF123456").is_some());
        assert!(ShortId::parse("abcDEF12345").is_none());
        assert!(ShortId::parse("abcDEF12345-").is_none());
    }

    #[test]
    fn sampling_bounds_reject_out_of_range() {
        let bounds = SamplingBounds::default();
        assert!(bounds.check(&SamplingParams::default()).is_ok());

        let too_many = SamplingParams {
            max_tokens: 4096,
            ..SamplingParams::default()
        };
        let err = bounds.check(&too_many).unwrap_err();
        assert!(err.to_string().contains("max_tokens"));
    }

    #[test]
    fn control_descriptor_uniform_accessors() {
        let select = ControlDescriptor::Select {
            placeholder: "Pick one".into(),
            row: 1,
            custom_id: "abc-select".into(),
        };
        assert_eq!(select.label(), "Pick one");
        assert_eq!(select.row(), 1);
        assert_eq!(select.custom_id(), "abc-select");
    }

    #[test]
    fn control_without_kind_reads_as_button() {
        let json = r#"{"label":"Continue","custom_id":"x-continue","row":0}"#;
        let control: ControlDescriptor = serde_json::from_str(json).unwrap();
        assert!(matches!(control, ControlDescriptor::Button { .. }));
        assert_eq!(control.label(), "Continue");
    }

    #[test]
    fn request_record_uses_flat_layout() {
        let record = RequestRecord {
            prompt: "p".into(),
            output: "o".into(),
            sampling: SamplingParams::default(),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["max_tokens"], 256);
        assert_eq!(value["prompt"], "p");
        assert!(value.get("sampling").is_none());
    }

    #[test]
    fn denial_reason_display_is_kebab_case() {
        assert_eq!(DenialReason::AtCapacity.to_string(), "at-capacity");
        assert_eq!(DenialReason::Busy.to_string(), "busy");
    }
}
