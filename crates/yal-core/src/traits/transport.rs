// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat transport trait for the messaging platform (Discord, console, etc.).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::YalError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ChannelId, InteractionId, MessageId, OutboundMessage, UserId};

/// Adapter for the chat platform the bot is deployed on.
#[async_trait]
pub trait ChatTransport: PluginAdapter {
    /// Sends a new message and returns its id.
    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, YalError>;

    /// Replaces the body of an existing message.
    async fn edit(&self, id: &MessageId, msg: OutboundMessage) -> Result<MessageId, YalError>;

    /// Acknowledges an interaction so the platform does not time it out.
    async fn defer(&self, _interaction: &InteractionId) -> Result<(), YalError> {
        Ok(())
    }

    /// When the user joined the server owning `channel`. `None` when the
    /// platform has no membership concept there (direct messages).
    async fn member_since(
        &self,
        channel: &ChannelId,
        user: &UserId,
    ) -> Result<Option<DateTime<Utc>>, YalError>;

    /// Server (guild) that owns `channel`, used for jump links.
    fn guild_of(&self, _channel: &ChannelId) -> Option<u64> {
        None
    }
}
