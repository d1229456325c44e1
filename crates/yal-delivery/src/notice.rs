// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User-facing notice texts.

use yal_core::types::{ChannelId, Embed, MessageId, UserId};

/// Room reserved around error text inside a plain message.
pub const ERROR_WRAPPER_RESERVE: usize = 100;

pub const CHANNEL_RESTRICTED: &str = "You are not allowed to use this in this channel!";

pub const MODERATION_BLOCKED: &str =
    "Sorry, this prompt potentially contains NSFW or offensive content.";

/// Mentions a user the way the chat platform renders it.
pub fn mention(user: UserId) -> String {
    format!("<@{user}>")
}

pub fn work_started(user: UserId) -> String {
    format!(
        "Now beginning work on new prompt for {}. Please be patient until I finish that.",
        mention(user)
    )
}

pub fn generation_complete(user: UserId) -> String {
    format!("Text generation for {} complete.", mention(user))
}

pub fn membership_too_short(needed_hours: u64, have_hours: u64) -> String {
    format!(
        "Sorry, you have not been on this server long enough to use the bot \
         (needed {needed_hours} hours, have {have_hours} hours)."
    )
}

pub fn busy(in_flight: usize) -> String {
    format!(
        "Sorry, I am currently working on {in_flight} of your prompt(s). \
         Please be patient until I finish that."
    )
}

pub fn at_capacity(in_flight: usize) -> String {
    format!(
        "Sorry, I am currently working on {in_flight} of your prompt(s) and you are \
         presently at your limit of simultaneous actions. Please be patient until I finish that."
    )
}

pub fn invalid_sampling(detail: &str) -> String {
    format!("Sorry, those generation settings are not allowed: {detail}.")
}

pub fn timed_out(seconds: u64) -> String {
    format!("Sorry, generating a response took longer than {seconds} seconds and was abandoned.")
}

/// Keeps the last `message_limit - ERROR_WRAPPER_RESERVE` chars of an error.
pub fn truncate_error(text: &str, message_limit: usize) -> String {
    let keep = message_limit.saturating_sub(ERROR_WRAPPER_RESERVE);
    let total = text.chars().count();
    text.chars().skip(total.saturating_sub(keep)).collect()
}

/// Failure notice with the error text in a code block.
pub fn failure(detail: &str, message_limit: usize) -> String {
    let detail = truncate_error(detail, message_limit);
    if detail.is_empty() {
        "Sorry, something went wrong while working on your prompt.".to_string()
    } else {
        format!("Sorry, something went wrong while working on your prompt.\n```\n{detail}\n```")
    }
}

/// Link that opens a specific message; direct messages use `@me`.
pub fn jump_link(guild: Option<u64>, channel: ChannelId, message: MessageId) -> String {
    let guild = guild
        .map(|g| g.to_string())
        .unwrap_or_else(|| "@me".to_string());
    format!("https://discord.com/channels/{guild}/{channel}/{message}")
}

/// Ping sent once the result message is in place.
pub fn completion_alert(
    user: UserId,
    guild: Option<u64>,
    channel: ChannelId,
    message: MessageId,
) -> (String, Embed) {
    let embed = Embed {
        description: Some(format!(
            "Your request has finished. [Please view it here]({}).",
            jump_link(guild, channel, message)
        )),
        fields: Vec::new(),
    };
    (format!("Job completed for {}.", mention(user)), embed)
}
