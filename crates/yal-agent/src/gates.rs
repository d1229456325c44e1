// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Access gates evaluated before moderation and admission.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use yal_config::model::AccessConfig;
use yal_core::traits::ChatTransport;
use yal_core::types::{ChannelId, RequestOrigin, UserId};

use crate::outcome::Rejection;

/// Restricts where commands are accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelGate {
    /// Every request must come from this channel.
    pub restrict_all: Option<ChannelId>,
    /// Command requests must come from this channel. Continuations are exempt.
    pub restrict_commands: Option<ChannelId>,
}

impl From<&AccessConfig> for ChannelGate {
    fn from(config: &AccessConfig) -> Self {
        Self {
            restrict_all: config.restrict_all_to_channel.map(ChannelId),
            restrict_commands: config.restrict_slash_to_channel.map(ChannelId),
        }
    }
}

impl ChannelGate {
    pub fn check(&self, channel: ChannelId, origin: RequestOrigin) -> Result<(), Rejection> {
        let allowed = |restriction: Option<ChannelId>| restriction.is_none_or(|c| c == channel);

        if !allowed(self.restrict_all) {
            return Err(Rejection::ChannelRestricted { channel });
        }
        if origin == RequestOrigin::Command && !allowed(self.restrict_commands) {
            return Err(Rejection::ChannelRestricted { channel });
        }
        Ok(())
    }
}

/// Requires users to have been on the server for a minimum time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MembershipGate {
    pub minimum_hours: Option<u64>,
}

impl From<&AccessConfig> for MembershipGate {
    fn from(config: &AccessConfig) -> Self {
        Self {
            minimum_hours: config.minimum_membership_hours,
        }
    }
}

impl MembershipGate {
    /// Unknown join times (direct messages) and failed lookups are allowed.
    pub async fn check(
        &self,
        transport: &dyn ChatTransport,
        channel: ChannelId,
        user: UserId,
        now: DateTime<Utc>,
    ) -> Result<(), Rejection> {
        let Some(needed_hours) = self.minimum_hours.filter(|h| *h > 0) else {
            return Ok(());
        };

        let joined = match transport.member_since(&channel, &user).await {
            Ok(Some(joined)) => joined,
            Ok(None) => {
                debug!(user_id = %user, "no membership record, allowing");
                return Ok(());
            }
            Err(e) => {
                warn!(user_id = %user, error = %e, "membership lookup failed, allowing");
                return Ok(());
            }
        };

        let member_for = now.signed_duration_since(joined);
        // A requirement too large for chrono can never be met.
        let needed = i64::try_from(needed_hours)
            .ok()
            .and_then(chrono::Duration::try_hours);
        if needed.is_none_or(|needed| member_for < needed) {
            let have_hours = member_for.num_hours().max(0) as u64;
            return Err(Rejection::MembershipTooShort {
                needed_hours,
                have_hours,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrestricted_accepts_everything() {
        let gate = ChannelGate::default();
        assert!(gate.check(ChannelId(1), RequestOrigin::Command).is_ok());
        assert!(gate.check(ChannelId(2), RequestOrigin::Continuation).is_ok());
    }

    #[test]
    fn restrict_all_applies_to_continuations() {
        let gate = ChannelGate {
            restrict_all: Some(ChannelId(7)),
            restrict_commands: None,
        };
        assert!(gate.check(ChannelId(7), RequestOrigin::Continuation).is_ok());
        assert_eq!(
            gate.check(ChannelId(8), RequestOrigin::Continuation),
            Err(Rejection::ChannelRestricted {
                channel: ChannelId(8)
            })
        );
    }

    #[test]
    fn restrict_commands_exempts_continuations() {
        let gate = ChannelGate {
            restrict_all: None,
            restrict_commands: Some(ChannelId(7)),
        };
        assert!(gate.check(ChannelId(8), RequestOrigin::Command).is_err());
        assert!(gate.check(ChannelId(8), RequestOrigin::Continuation).is_ok());
        assert!(gate.check(ChannelId(7), RequestOrigin::Command).is_ok());
    }

    #[test]
    fn gates_from_config() {
        let config = AccessConfig {
            restrict_all_to_channel: Some(1),
            restrict_slash_to_channel: Some(2),
            minimum_membership_hours: Some(24),
        };
        assert_eq!(ChannelGate::from(&config).restrict_all, Some(ChannelId(1)));
        assert_eq!(ChannelGate::from(&config).restrict_commands, Some(ChannelId(2)));
        assert_eq!(MembershipGate::from(&config).minimum_hours, Some(24));
    }
}
