// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock chat transport for deterministic testing.
//!
//! `MockTransport` implements `ChatTransport`, capturing every sent and
//! edited message for assertion and answering membership lookups from an
//! injectable table.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use yal_core::YalError;
use yal_core::traits::{ChatTransport, PluginAdapter};
use yal_core::types::{
    AdapterType, ChannelId, HealthStatus, InteractionId, MessageId, OutboundMessage, UserId,
};

/// First id handed out by [`MockTransport::send`].
const FIRST_MESSAGE_ID: u64 = 1000;

/// A captured message and the id it was stored under.
#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub id: MessageId,
    pub message: OutboundMessage,
}

/// A mock chat platform.
///
/// - **sent**: messages passed to `send()`, in order
/// - **edits**: replacement bodies passed to `edit()`, in order
pub struct MockTransport {
    sent: Arc<Mutex<Vec<SentMessage>>>,
    edits: Arc<Mutex<Vec<SentMessage>>>,
    deferred: Arc<Mutex<Vec<InteractionId>>>,
    joined: Arc<Mutex<HashMap<UserId, DateTime<Utc>>>>,
    next_id: AtomicU64,
    guild: Option<u64>,
    fail_edits: AtomicBool,
    fail_membership: AtomicBool,
}

impl MockTransport {
    /// Create a new mock transport with empty captures.
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            edits: Arc::new(Mutex::new(Vec::new())),
            deferred: Arc::new(Mutex::new(Vec::new())),
            joined: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(FIRST_MESSAGE_ID),
            guild: None,
            fail_edits: AtomicBool::new(false),
            fail_membership: AtomicBool::new(false),
        }
    }

    /// Report `guild` as the owner of every channel.
    pub fn with_guild(mut self, guild: u64) -> Self {
        self.guild = Some(guild);
        self
    }

    /// Record when `user` joined the server.
    pub async fn set_joined(&self, user: UserId, at: DateTime<Utc>) {
        self.joined.lock().await.insert(user, at);
    }

    /// Make every later `edit()` fail.
    pub fn fail_edits(&self, fail: bool) {
        self.fail_edits.store(fail, Ordering::SeqCst);
    }

    /// Make every later membership lookup fail.
    pub fn fail_membership(&self, fail: bool) {
        self.fail_membership.store(fail, Ordering::SeqCst);
    }

    /// All messages passed to `send()`.
    pub async fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }

    /// Message contents passed to `send()`, in order.
    pub async fn sent_texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .map(|m| m.message.content.clone())
            .collect()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    /// All replacement bodies passed to `edit()`.
    pub async fn edited_messages(&self) -> Vec<SentMessage> {
        self.edits.lock().await.clone()
    }

    /// Interactions acknowledged through `defer()`.
    pub async fn deferred(&self) -> Vec<InteractionId> {
        self.deferred.lock().await.clone()
    }

    /// Clear all captured messages.
    pub async fn clear(&self) {
        self.sent.lock().await.clear();
        self.edits.lock().await.clear();
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockTransport {
    fn name(&self) -> &str {
        "mock-transport"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    async fn health_check(&self) -> Result<HealthStatus, YalError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), YalError> {
        Ok(())
    }
}

#[async_trait]
impl ChatTransport for MockTransport {
    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, YalError> {
        let id = MessageId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.sent.lock().await.push(SentMessage { id, message: msg });
        Ok(id)
    }

    async fn edit(&self, id: &MessageId, msg: OutboundMessage) -> Result<MessageId, YalError> {
        if self.fail_edits.load(Ordering::SeqCst) {
            return Err(YalError::Transport {
                message: format!("mock edit of message {id} failed"),
                source: None,
            });
        }
        self.edits.lock().await.push(SentMessage {
            id: *id,
            message: msg,
        });
        Ok(*id)
    }

    async fn defer(&self, interaction: &InteractionId) -> Result<(), YalError> {
        self.deferred.lock().await.push(*interaction);
        Ok(())
    }

    async fn member_since(
        &self,
        _channel: &ChannelId,
        user: &UserId,
    ) -> Result<Option<DateTime<Utc>>, YalError> {
        if self.fail_membership.load(Ordering::SeqCst) {
            return Err(YalError::Transport {
                message: "mock membership lookup failed".to_string(),
                source: None,
            });
        }
        Ok(self.joined.lock().await.get(user).copied())
    }

    fn guild_of(&self, _channel: &ChannelId) -> Option<u64> {
        self.guild
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_assigns_increasing_ids() {
        let transport = MockTransport::new();
        let a = transport
            .send(OutboundMessage::text(ChannelId(1), "a"))
            .await
            .unwrap();
        let b = transport
            .send(OutboundMessage::text(ChannelId(1), "b"))
            .await
            .unwrap();
        assert_eq!(a, MessageId(FIRST_MESSAGE_ID));
        assert_eq!(b, MessageId(FIRST_MESSAGE_ID + 1));
        assert_eq!(transport.sent_texts().await, ["a", "b"]);
    }

    #[tokio::test]
    async fn membership_comes_from_table() {
        let transport = MockTransport::new();
        let at = Utc::now();
        transport.set_joined(UserId(1), at).await;
        assert_eq!(
            transport.member_since(&ChannelId(1), &UserId(1)).await.unwrap(),
            Some(at)
        );
        assert_eq!(
            transport.member_since(&ChannelId(1), &UserId(2)).await.unwrap(),
            None
        );
    }
}
