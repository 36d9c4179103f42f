pub mod guild;
pub mod period;
pub mod submission;

/// Discord user id (snowflake).
pub type UserId = u64;

/// Discord message id (snowflake). Doubles as the submission id.
pub type MessageId = u64;

/// Discord guild id (snowflake).
pub type GuildId = u64;

/// Discord channel id (snowflake).
pub type ChannelId = u64;
