use serenity::{
    async_trait,
    builder::CreateEmbed,
    model::{
        application::{
            command::Command,
            interaction::{
                application_command::ApplicationCommandInteraction, Interaction,
                InteractionResponseType,
            },
        },
        channel::{Message, Reaction},
        gateway::Ready,
        guild::{Guild as DiscordGuild, UnavailableGuild},
        id::{ChannelId, GuildId, MessageId},
        Timestamp,
    },
    prelude::*,
    utils::Color,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use contestbot_core::errors::ContestError;
use contestbot_core::models::{guild::Guild, period::Period};
use contestbot_core::tracking::ExpiringSet;
use contestbot_db::repositories::{guild, period};
use contestbot_db::PgSubmissionStore;

pub mod contest;
pub mod guilds;
pub mod submissions;
pub mod votes;

use crate::config::BotConfig;
use crate::locks::KeyedLocks;
use crate::reactions::{ChannelReactions, ExpectedRemovals};

/// Upper bound on remembered deletions and removals the bot caused itself.
const EXPECTED_EVENT_CAPACITY: usize = 1024;

pub type ExpectedDeletions = Arc<Mutex<ExpiringSet<contestbot_core::models::MessageId>>>;

/// Main Discord handler that processes all events.
///
/// Besides the configuration and database pool it owns the sets of events
/// the bot expects because it caused them, and the locks that serialise
/// vote reconciliation per period and advancing per guild.
pub struct Handler {
    config: BotConfig,
    db_pool: PgPool,
    expected_deletions: ExpectedDeletions,
    expected_removals: ExpectedRemovals,
    period_locks: Arc<KeyedLocks<Uuid>>,
    guild_locks: Arc<KeyedLocks<contestbot_core::models::GuildId>>,
}

impl Handler {
    /// Create a new handler
    pub fn new(config: BotConfig, db_pool: PgPool) -> Self {
        let ttl = config.expected_event_ttl();

        Self {
            config,
            db_pool,
            expected_deletions: Arc::new(Mutex::new(ExpiringSet::new(
                ttl,
                EXPECTED_EVENT_CAPACITY,
            ))),
            expected_removals: Arc::new(Mutex::new(ExpiringSet::new(
                ttl,
                EXPECTED_EVENT_CAPACITY,
            ))),
            period_locks: Arc::new(KeyedLocks::new()),
            guild_locks: Arc::new(KeyedLocks::new()),
        }
    }

    fn context(&self, ctx: Context) -> HandlerContext {
        HandlerContext {
            ctx,
            config: self.config.clone(),
            db_pool: self.db_pool.clone(),
            expected_deletions: self.expected_deletions.clone(),
            expected_removals: self.expected_removals.clone(),
            period_locks: self.period_locks.clone(),
            guild_locks: self.guild_locks.clone(),
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    /// Handle ready events (when bot connects to Discord)
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);

        // Guild commands show up immediately, global ones after a cache delay
        if let Some(test_guild_id) = self.config.test_guild_id {
            match GuildId(test_guild_id)
                .set_application_commands(&ctx.http, |commands| {
                    crate::commands::register_commands(commands)
                })
                .await
            {
                Ok(cmds) => {
                    info!(
                        "Guild commands registered successfully for {}! Total commands: {}",
                        test_guild_id,
                        cmds.len()
                    );
                }
                Err(why) => {
                    error!("Error registering guild commands: {:?}", why);
                }
            }
        }

        match Command::set_global_application_commands(&ctx.http, |commands| {
            crate::commands::register_commands(commands)
        })
        .await
        {
            Ok(cmds) => {
                info!("Global commands registered successfully! Total commands: {}", cmds.len());
                for cmd in cmds {
                    debug!("Command registered: /{} - {}", cmd.name, cmd.description);
                }
            }
            Err(why) => {
                error!("Error registering global commands: {:?}", why);
            }
        }
    }

    async fn guild_create(&self, ctx: Context, guild: DiscordGuild, _is_new: bool) {
        if let Err(e) = guilds::handle_guild_join(self.context(ctx), guild.id).await {
            error!("Error handling guild join for {}: {:?}", guild.id, e);
        }
    }

    async fn guild_delete(&self, ctx: Context, incomplete: UnavailableGuild, _full: Option<DiscordGuild>) {
        // Outages are reported as deletions too
        if incomplete.unavailable {
            warn!("Guild {} became unavailable", incomplete.id);
            return;
        }

        if let Err(e) = guilds::handle_guild_leave(self.context(ctx), incomplete.id).await {
            error!("Error handling guild leave for {}: {:?}", incomplete.id, e);
        }
    }

    async fn message(&self, ctx: Context, new_message: Message) {
        if let Err(e) = submissions::handle_message(self.context(ctx), &new_message).await {
            error!("Error handling message {}: {:?}", new_message.id, e);
        }
    }

    async fn message_delete(
        &self,
        ctx: Context,
        _channel_id: ChannelId,
        deleted_message_id: MessageId,
        _guild_id: Option<GuildId>,
    ) {
        if let Err(e) = submissions::handle_message_delete(self.context(ctx), deleted_message_id).await {
            error!("Error handling deletion of {}: {:?}", deleted_message_id, e);
        }
    }

    async fn message_delete_bulk(
        &self,
        ctx: Context,
        _channel_id: ChannelId,
        multiple_deleted_messages_ids: Vec<MessageId>,
        _guild_id: Option<GuildId>,
    ) {
        if let Err(e) =
            submissions::handle_bulk_delete(self.context(ctx), &multiple_deleted_messages_ids).await
        {
            error!("Error handling bulk deletion: {:?}", e);
        }
    }

    async fn reaction_add(&self, ctx: Context, add_reaction: Reaction) {
        if let Err(e) = votes::handle_reaction_add(self.context(ctx), &add_reaction).await {
            error!("Error handling reaction on {}: {:?}", add_reaction.message_id, e);
        }
    }

    async fn reaction_remove(&self, ctx: Context, removed_reaction: Reaction) {
        if let Err(e) = votes::handle_reaction_remove(self.context(ctx), &removed_reaction).await {
            error!(
                "Error handling reaction removal on {}: {:?}",
                removed_reaction.message_id, e
            );
        }
    }

    async fn reaction_remove_all(
        &self,
        ctx: Context,
        channel_id: ChannelId,
        removed_from_message_id: MessageId,
    ) {
        if let Err(e) =
            votes::handle_reactions_cleared(self.context(ctx), channel_id, removed_from_message_id).await
        {
            error!(
                "Error handling cleared reactions on {}: {:?}",
                removed_from_message_id, e
            );
        }
    }

    async fn reaction_remove_emoji(&self, ctx: Context, removed_reactions: Reaction) {
        if !self.config.is_upvote(&removed_reactions.emoji) {
            return;
        }

        if let Err(e) = votes::handle_reactions_cleared(
            self.context(ctx),
            removed_reactions.channel_id,
            removed_reactions.message_id,
        )
        .await
        {
            error!(
                "Error handling cleared upvotes on {}: {:?}",
                removed_reactions.message_id, e
            );
        }
    }

    /// Handle interactions (slash commands)
    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::ApplicationCommand(command) = interaction else {
            return;
        };
        info!("Received command: {}", command.data.name);

        let handler_ctx = self.context(ctx.clone());
        let result = match command.data.name.as_str() {
            "contest" => contest::handle_contest_command(handler_ctx, &command).await,
            "status" => contest::handle_status_command(handler_ctx, &command).await,
            "leaderboard" => contest::handle_leaderboard_command(handler_ctx, &command).await,
            _ => {
                error!("Unknown command: {}", command.data.name);
                Err(eyre::eyre!("Unknown command"))
            }
        };

        if let Err(e) = result {
            error!("Error handling command: {:?}", e);

            if let Err(why) = respond_error(&ctx, &command, &user_message(&e)).await {
                error!("Failed to send error response: {:?}", why);
            }
        }
    }
}

/// Shared context for event and command handlers.
#[derive(Clone)]
pub struct HandlerContext {
    pub ctx: Context,
    pub config: BotConfig,
    pub db_pool: PgPool,
    pub expected_deletions: ExpectedDeletions,
    pub expected_removals: ExpectedRemovals,
    pub period_locks: Arc<KeyedLocks<Uuid>>,
    pub guild_locks: Arc<KeyedLocks<contestbot_core::models::GuildId>>,
}

impl HandlerContext {
    /// The bot's own user id.
    pub fn self_id(&self) -> contestbot_core::models::UserId {
        self.ctx.cache.current_user_id().0
    }

    pub fn store(&self) -> PgSubmissionStore {
        PgSubmissionStore::new(self.db_pool.clone())
    }

    pub fn reactions(&self, channel_id: ChannelId) -> ChannelReactions {
        ChannelReactions::new(
            self.ctx.http.clone(),
            channel_id,
            self.config.upvote_reaction(),
            self.expected_removals.clone(),
        )
    }

    /// Loads the guild's record, creating it if the join event was missed.
    pub async fn ensure_guild(&self, guild_id: GuildId) -> eyre::Result<Guild> {
        match guild::get_guild(&self.db_pool, guild_id.0).await? {
            Some(existing) => Ok(existing),
            None => guild::create_guild(&self.db_pool, guild_id.0).await,
        }
    }

    /// The period the guild points at, active or not.
    pub async fn current_period(&self, guild: &Guild) -> eyre::Result<Option<Period>> {
        match guild.current_period {
            Some(period_id) => period::get_period(&self.db_pool, period_id).await,
            None => Ok(None),
        }
    }

    /// Deletes a message and swallows the resulting delete event.
    pub async fn delete_message(&self, channel_id: ChannelId, message_id: MessageId) -> eyre::Result<()> {
        self.expected_deletions.lock().await.insert(message_id.0);
        channel_id.delete_message(&self.ctx.http, message_id).await?;
        Ok(())
    }

    /// Deletes a message once `delay` has passed.
    pub fn delete_message_later(&self, channel_id: ChannelId, message_id: MessageId, delay: Duration) {
        let ctx = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = ctx.delete_message(channel_id, message_id).await {
                warn!("Could not delete message {}: {:?}", message_id, e);
            }
        });
    }
}

/// Shown in place of faults the invoker cannot act on.
pub const GENERIC_ERROR: &str = "Something went wrong, try again later.";

/// The text an invoker sees for a failed command.
///
/// Only refusals typed as user-facing [`ContestError`]s are shown verbatim.
/// Database and gateway failures are logged by the caller and replaced with
/// [`GENERIC_ERROR`].
pub fn user_message(err: &eyre::Report) -> String {
    match err.downcast_ref::<ContestError>() {
        Some(contest_err) if contest_err.is_user_facing() => contest_err.to_string(),
        _ => GENERIC_ERROR.to_string(),
    }
}

pub fn success_embed(embed: &mut CreateEmbed, title: &str, description: &str) {
    embed
        .title(title)
        .description(description)
        .color(Color::DARK_GREEN)
        .timestamp(Timestamp::now());
}

pub fn error_embed(embed: &mut CreateEmbed, description: &str) {
    embed
        .title("Error")
        .description(description)
        .color(Color::RED);
}

async fn respond_error(
    ctx: &Context,
    command: &ApplicationCommandInteraction,
    description: &str,
) -> serenity::Result<()> {
    command
        .create_interaction_response(&ctx.http, |r| {
            r.kind(InteractionResponseType::ChannelMessageWithSource)
                .interaction_response_data(|m| {
                    m.embed(|e| {
                        error_embed(e, description);
                        e
                    })
                    .ephemeral(true)
                })
        })
        .await
}
