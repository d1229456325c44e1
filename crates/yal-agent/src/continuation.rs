// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Live interactive elements and the requests built from them.
//!
//! Every completed request gets an element with two buttons: "Write Next
//! Prompt" opens a draft editor, "Continue" re-runs the stored prompt and
//! output (plus any draft) with the same sampling settings.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tracing::{debug, info};
use yal_core::YalError;
use yal_core::traits::{Clock, IdGenerator};
use yal_core::types::{
    ChannelId, ControlDescriptor, GenerationRequest, InteractiveElement, MessageId, RecordKey,
    ShortId, UserId,
};
use yal_storage::{ElementStore, RecordStore};

pub const WRITE_NEXT_PROMPT_LABEL: &str = "Write Next Prompt";
pub const CONTINUE_LABEL: &str = "Continue";

const DRAFT_EDITOR_SUFFIX: &str = "-prompt-modal";
const CONTINUE_SUFFIX: &str = "-continue";
const DRAFT_ENTRY_SUFFIX: &str = "-prompt-entry";

/// What pressing or submitting a control asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    /// Open the draft editor.
    EditDraft,
    /// Draft text was submitted.
    SubmitDraft,
    /// Re-run the parent request.
    Continue,
}

impl ControlAction {
    pub fn from_custom_id(custom_id: &str) -> Option<Self> {
        if custom_id.ends_with(CONTINUE_SUFFIX) {
            Some(ControlAction::Continue)
        } else if custom_id.ends_with(DRAFT_EDITOR_SUFFIX) {
            Some(ControlAction::EditDraft)
        } else if custom_id.ends_with(DRAFT_ENTRY_SUFFIX) {
            Some(ControlAction::SubmitDraft)
        } else {
            None
        }
    }
}

/// Builds the element attached to a finished result.
pub fn new_element(
    ids: &dyn IdGenerator,
    message_id: MessageId,
    parent: ShortId,
    uid: UserId,
    time: i64,
) -> InteractiveElement {
    InteractiveElement {
        message_id,
        short_id_parent: parent,
        uid,
        time,
        prompt_input_element_custom_id: format!("{}{DRAFT_ENTRY_SUFFIX}", ids.short_id()),
        items: vec![
            ControlDescriptor::Button {
                label: WRITE_NEXT_PROMPT_LABEL.to_string(),
                row: 0,
                custom_id: format!("{}{DRAFT_EDITOR_SUFFIX}", ids.short_id()),
            },
            ControlDescriptor::Button {
                label: CONTINUE_LABEL.to_string(),
                row: 0,
                custom_id: format!("{}{CONTINUE_SUFFIX}", ids.short_id()),
            },
        ],
        prompt: String::new(),
    }
}

/// Index of live elements by control id.
///
/// Elements older than the reload window are dropped as new ones arrive,
/// matching what a restart would reactivate.
pub struct ContinuationRegistry {
    records: Arc<dyn RecordStore>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
    window: Duration,
    elements: DashMap<ShortId, InteractiveElement>,
    by_control: DashMap<String, ShortId>,
}

impl ContinuationRegistry {
    pub fn new(
        records: Arc<dyn RecordStore>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
        window: Duration,
    ) -> Self {
        Self {
            records,
            ids,
            clock,
            window,
            elements: DashMap::new(),
            by_control: DashMap::new(),
        }
    }

    /// Makes every control of `element` resolvable.
    pub fn register(&self, element: InteractiveElement) {
        self.evict_expired();
        let parent = element.short_id_parent.clone();
        for control in &element.items {
            self.by_control
                .insert(control.custom_id().to_string(), parent.clone());
        }
        self.by_control
            .insert(element.prompt_input_element_custom_id.clone(), parent.clone());
        debug!(short_id = %parent, message_id = %element.message_id, "element registered");
        self.elements.insert(parent, element);
    }

    fn evict_expired(&self) {
        let window = i64::try_from(self.window.as_secs()).unwrap_or(i64::MAX);
        let cutoff = self.clock.now().timestamp().saturating_sub(window);
        let expired: Vec<ShortId> = self
            .elements
            .iter()
            .filter(|e| e.value().time < cutoff)
            .map(|e| e.key().clone())
            .collect();

        for parent in expired {
            if let Some((_, element)) = self.elements.remove(&parent) {
                for control in &element.items {
                    self.by_control.remove(control.custom_id());
                }
                self.by_control.remove(&element.prompt_input_element_custom_id);
                debug!(short_id = %parent, created = element.time, "element expired");
            }
        }
    }

    /// Reinstates elements created within `window` of `now`.
    pub async fn reload(&self, store: &ElementStore, window: Duration, now: i64) -> usize {
        let recent = store.load_recent(window, now).await;
        let count = recent.len();
        for element in recent {
            self.register(element);
        }
        info!(count, window_secs = window.as_secs(), "interactive elements reloaded");
        count
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Copy of the element owning `control_id`.
    pub fn lookup(&self, control_id: &str) -> Option<InteractiveElement> {
        let parent = self.by_control.get(control_id)?;
        self.elements.get(parent.value()).map(|e| e.value().clone())
    }

    /// Stores draft text used by the next "Continue".
    pub fn submit_draft(&self, control_id: &str, text: &str) -> Result<(), YalError> {
        let parent = self
            .by_control
            .get(control_id)
            .map(|p| p.value().clone())
            .ok_or_else(|| YalError::UnknownControl(control_id.to_string()))?;
        let mut element = self
            .elements
            .get_mut(&parent)
            .ok_or_else(|| YalError::UnknownControl(control_id.to_string()))?;
        element.prompt = text.to_string();
        debug!(short_id = %parent, chars = text.chars().count(), "draft stored");
        Ok(())
    }

    /// Builds the follow-up request for a "Continue" press by `user`.
    ///
    /// The record is read from the element's owner; the new request belongs
    /// to whoever pressed the control.
    pub async fn continue_from(
        &self,
        control_id: &str,
        user: UserId,
        channel: ChannelId,
    ) -> Result<GenerationRequest, YalError> {
        let element = self
            .lookup(control_id)
            .ok_or_else(|| YalError::UnknownControl(control_id.to_string()))?;

        let key = RecordKey::new(element.uid, element.short_id_parent.clone());
        let record = self.records.load(&key).await?;

        let mut prompt = format!("{} {}", record.prompt, record.output);
        if !element.prompt.is_empty() {
            prompt.push('\n');
            prompt.push_str(&element.prompt);
        }

        Ok(GenerationRequest::new(
            prompt,
            record.sampling,
            user,
            channel,
            self.ids.short_id(),
            self.clock.now(),
        )
        .from_continuation())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_actions_follow_suffix() {
        assert_eq!(
            ControlAction::from_custom_id("abc-continue"),
            Some(ControlAction::Continue)
        );
        assert_eq!(
            ControlAction::from_custom_id("abc-prompt-modal"),
            Some(ControlAction::EditDraft)
        );
        assert_eq!(
            ControlAction::from_custom_id("abc-prompt-entry"),
            Some(ControlAction::SubmitDraft)
        );
        assert_eq!(ControlAction::from_custom_id("abc-other"), None);
    }

    #[test]
    fn new_element_has_both_buttons_on_first_row() {
        let element = new_element(
            &yal_core::RandomIdGenerator,
            MessageId(9),
            ShortId("abcdefghijkl".into()),
            UserId(3),
            100,
        );
        let labels: Vec<_> = element.items.iter().map(|c| c.label()).collect();
        assert_eq!(labels, [WRITE_NEXT_PROMPT_LABEL, CONTINUE_LABEL]);
        assert!(element.items.iter().all(|c| c.row() == 0));
        assert!(element.prompt_input_element_custom_id.ends_with("-prompt-entry"));
        assert!(element.items[1].custom_id().ends_with("-continue"));
    }
}
