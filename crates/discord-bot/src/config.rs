use eyre::{eyre, Result};
use serde::Deserialize;
use serenity::model::{channel::ReactionType, id::EmojiId};
use std::{env, str::FromStr, time::Duration};

pub const DEFAULT_UPVOTE_EMOJI_ID: u64 = 810310002220859393;
pub const DEFAULT_UPVOTE_EMOJI_NAME: &str = "upvote";
pub const DEFAULT_EXPECTED_EVENT_TTL_SECS: u64 = 60;

/// Configuration for the Discord bot.
///
/// Everything is read from the environment; see [`BotConfig::from_env`].
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Discord bot token (required)
    pub token: String,
    /// Application ID for Discord bot (required)
    pub application_id: u64,
    /// Database connection URL (required)
    pub database_url: String,
    /// Test guild ID for faster command registration during development
    pub test_guild_id: Option<u64>,
    /// Custom emoji counted as a vote
    pub upvote_emoji_id: u64,
    pub upvote_emoji_name: String,
    /// How long the bot remembers deletions and removals it caused itself
    pub expected_event_ttl_secs: u64,
}

impl BotConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let token = env::var("DISCORD_TOKEN")
            .map_err(|_| eyre!("DISCORD_TOKEN environment variable not set"))?;

        let application_id = env::var("DISCORD_APPLICATION_ID")
            .map_err(|_| eyre!("DISCORD_APPLICATION_ID environment variable not set"))?
            .parse::<u64>()
            .map_err(|_| eyre!("DISCORD_APPLICATION_ID must be a valid u64"))?;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| eyre!("DATABASE_URL environment variable not set"))?;

        // Optional test guild ID for development
        let test_guild_id = env::var("DISCORD_TEST_GUILD_ID")
            .ok()
            .and_then(|id| id.parse::<u64>().ok());

        let upvote_emoji_id =
            optional_var("CONTEST_UPVOTE_EMOJI_ID")?.unwrap_or(DEFAULT_UPVOTE_EMOJI_ID);
        let upvote_emoji_name = env::var("CONTEST_UPVOTE_EMOJI_NAME")
            .unwrap_or_else(|_| DEFAULT_UPVOTE_EMOJI_NAME.to_string());
        let expected_event_ttl_secs = optional_var("CONTEST_EXPECTED_EVENT_TTL_SECS")?
            .unwrap_or(DEFAULT_EXPECTED_EVENT_TTL_SECS);

        Ok(Self {
            token,
            application_id,
            database_url,
            test_guild_id,
            upvote_emoji_id,
            upvote_emoji_name,
            expected_event_ttl_secs,
        })
    }

    /// The reaction the bot adds, counts and removes.
    pub fn upvote_reaction(&self) -> ReactionType {
        ReactionType::Custom {
            animated: false,
            id: EmojiId(self.upvote_emoji_id),
            name: Some(self.upvote_emoji_name.clone()),
        }
    }

    pub fn is_upvote(&self, emoji: &ReactionType) -> bool {
        matches!(emoji, ReactionType::Custom { id, .. } if id.0 == self.upvote_emoji_id)
    }

    pub fn expected_event_ttl(&self) -> Duration {
        Duration::from_secs(self.expected_event_ttl_secs)
    }
}

fn optional_var<T: FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|_| eyre!("{} has an invalid value: {}", name, value)),
        Err(_) => Ok(None),
    }
}
