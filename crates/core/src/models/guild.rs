use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ChannelId, GuildId};

/// A Discord guild the bot is, or once was, a member of.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guild {
    pub id: GuildId,
    /// The channel scanned for submissions, once configured.
    pub submission_channel: Option<ChannelId>,
    /// The period currently tracked for this guild.
    pub current_period: Option<Uuid>,
    /// Whether the bot is currently in the guild.
    pub active: bool,
    pub joined: DateTime<Utc>,
    pub last_joined: Option<DateTime<Utc>>,
}

impl Guild {
    pub fn new(id: GuildId) -> Self {
        Self {
            id,
            submission_channel: None,
            current_period: None,
            active: true,
            joined: Utc::now(),
            last_joined: None,
        }
    }

    pub fn is_submission_channel(&self, channel: ChannelId) -> bool {
        self.submission_channel == Some(channel)
    }
}
