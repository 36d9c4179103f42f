use eyre::{eyre, Result};
use serenity::{
    builder::CreateEmbed,
    model::{
        application::interaction::{
            application_command::{
                ApplicationCommandInteraction, CommandDataOption, CommandDataOptionValue,
            },
            InteractionResponseType,
        },
        channel::{PermissionOverwrite, PermissionOverwriteType},
        id::{ChannelId, GuildId, MessageId, RoleId, UserId},
        mention::Mentionable,
        permissions::Permissions,
        Timestamp,
    },
    utils::Color,
};
use std::time::Duration;
use tracing::{error, info, warn};

use contestbot_core::errors::ContestError;
use contestbot_core::leaderboard::{leaderboard, Standing, DEFAULT_COUNT, MAX_COUNT};
use contestbot_core::ledger::ReactionGateway;
use contestbot_core::models::period::{Period, PeriodState};
use contestbot_db::repositories::{guild, period, submission as submissions};

use crate::handlers::{error_embed, success_embed, user_message, votes, HandlerContext};

/// A refusal shown to the invoker as is.
fn refused(message: impl Into<String>) -> eyre::Report {
    ContestError::Precondition(message.into()).into()
}

/// Whether a member may run `/contest`.
pub fn is_privileged(permissions: Option<Permissions>) -> bool {
    permissions.is_some_and(|p| p.manage_guild() || p.administrator())
}

/// The @everyone overwrite for the submission channel while in `state`.
pub fn channel_overwrite(guild_id: GuildId, state: PeriodState) -> PermissionOverwrite {
    let access = state.channel_access();

    let mut allow = Permissions::empty();
    allow.set(Permissions::SEND_MESSAGES, access.send_messages);
    allow.set(Permissions::ADD_REACTIONS, access.add_reactions);
    let deny = (Permissions::SEND_MESSAGES | Permissions::ADD_REACTIONS) - allow;

    // The @everyone role shares the guild's id
    PermissionOverwrite {
        allow,
        deny,
        kind: PermissionOverwriteType::Role(RoleId(guild_id.0)),
    }
}

/// What the invoker is told after the period entered `state`.
pub fn advance_message(state: PeriodState) -> &'static str {
    match state {
        PeriodState::Ready => "New period started - submissions and voting disabled.",
        PeriodState::Submissions => "Period started, submissions allowed. Advance again to pause.",
        PeriodState::Paused => {
            "Period paused, submissions disabled. Advance again to start voting."
        }
        PeriodState::Voting => {
            "Period unpaused, reactions allowed. Advance again to stop voting and finalize the tallying."
        }
        PeriodState::Finished => {
            "Period stopped. Reactions and submissions disabled. Advance again to start a new period."
        }
    }
}

pub fn jump_url(guild_id: GuildId, channel_id: ChannelId, message_id: MessageId) -> String {
    format!(
        "https://discord.com/channels/{}/{}/{}",
        guild_id, channel_id, message_id
    )
}

/// One leaderboard row: rank, medal, author, votes and a link to the entry.
pub fn leaderboard_line(guild_id: GuildId, channel_id: ChannelId, standing: &Standing) -> String {
    let medal = standing
        .medal()
        .map(|medal| format!("{} ", medal))
        .unwrap_or_default();
    let votes = standing.submission.count();

    format!(
        "`{:02}` {}{} {} vote{} [Jump]({})",
        standing.rank,
        medal,
        UserId(standing.submission.user).mention(),
        votes,
        if votes == 1 { "" } else { "s" },
        jump_url(guild_id, channel_id, MessageId(standing.submission.id))
    )
}

/// Handle the /contest command.
///
/// Checks that the invoker may manage the server, then dispatches to the
/// `advance`, `close`, `channel` or `resync` subcommand.
///
/// # Arguments
///
/// * `ctx` - Shared handler state: database pool, locks and expected events
/// * `command` - The slash command interaction to respond to
///
/// # Returns
///
/// * `Ok(())` once the interaction has been answered
/// * `Err` if the command was refused or failed before a response was sent
pub async fn handle_contest_command(
    ctx: HandlerContext,
    command: &ApplicationCommandInteraction,
) -> Result<()> {
    let subcommand = command
        .data
        .options
        .first()
        .ok_or_else(|| eyre!("Missing subcommand"))?;
    let guild_id = command
        .guild_id
        .ok_or_else(|| refused("Command must be used in a server"))?;

    let permissions = command.member.as_ref().and_then(|member| member.permissions);
    if !is_privileged(permissions) {
        return Err(refused("You need the Manage Server permission to run the contest."));
    }

    match subcommand.name.as_str() {
        "advance" => handle_advance(ctx, command, subcommand, guild_id).await,
        "close" => handle_close(ctx, command, guild_id).await,
        "channel" => handle_channel(ctx, command, subcommand, guild_id).await,
        "resync" => handle_resync(ctx, command, guild_id).await,
        _ => {
            command
                .create_interaction_response(&ctx.ctx.http, |r| {
                    r.kind(InteractionResponseType::ChannelMessageWithSource)
                        .interaction_response_data(|m| m.content("Unknown subcommand").ephemeral(true))
                })
                .await?;

            Ok(())
        }
    }
}

/// Handle the /contest advance subcommand
async fn handle_advance(
    ctx: HandlerContext,
    command: &ApplicationCommandInteraction,
    subcommand: &CommandDataOption,
    guild_id: GuildId,
) -> Result<()> {
    let after = match get_option_i64(&subcommand.options, "after") {
        Some(secs) if secs < 0 => {
            return Err(refused("If specified, after must be zero or more seconds."));
        }
        Some(secs) => Some(Duration::from_secs(secs as u64)),
        None => None,
    };
    let pingback = get_option_bool(&subcommand.options, "pingback").unwrap_or(true);

    // Adding markers to every submission can take a while
    command
        .create_interaction_response(&ctx.ctx.http, |r| {
            r.kind(InteractionResponseType::DeferredChannelMessageWithSource)
        })
        .await?;

    let outcome = advance_period(&ctx, guild_id).await;
    command
        .edit_original_interaction_response(&ctx.ctx.http, |m| {
            m.embed(|e| {
                match &outcome {
                    Ok(message) => success_embed(e, "Period Advanced", message),
                    Err(err) => error_embed(e, &user_message(err)),
                }
                e
            })
        })
        .await?;

    let Err(err) = outcome else {
        if let Some(delay) = after {
            let invoker = pingback.then_some(command.user.id);
            schedule_advance(ctx, guild_id, command.channel_id, invoker, delay);
        }
        return Ok(());
    };
    error!("Error advancing period in {}: {:?}", guild_id, err);

    Ok(())
}

/// Advances once more after `delay` and posts the outcome in `channel_id`,
/// mentioning `invoker` when one is given.
fn schedule_advance(
    ctx: HandlerContext,
    guild_id: GuildId,
    channel_id: ChannelId,
    invoker: Option<UserId>,
    delay: Duration,
) {
    info!("Scheduled advance in {} after {:?}", guild_id, delay);

    tokio::spawn(async move {
        tokio::time::sleep(delay).await;

        let outcome = advance_period(&ctx, guild_id).await;
        if let Err(err) = &outcome {
            error!("Scheduled advance in {} failed: {:?}", guild_id, err);
        }

        let sent = channel_id
            .send_message(&ctx.ctx.http, |m| {
                if let Some(invoker) = invoker {
                    m.content(invoker.mention());
                }
                m.embed(|e| {
                    match &outcome {
                        Ok(message) => success_embed(e, "Scheduled Advance", message),
                        Err(err) => error_embed(e, &user_message(err)),
                    }
                    e
                })
            })
            .await;
        if let Err(why) = sent {
            error!("Failed to announce scheduled advance: {:?}", why);
        }
    });
}

/// Moves the guild's contest one step forward, starting a new period when
/// none is running. At most one advance runs per guild at a time.
///
/// Leaving VOTING tallies every submission once more; entering VOTING marks
/// every submission with the bot's upvote. The channel permissions are
/// updated before the new state is stored.
///
/// # Returns
///
/// The message describing the state the period entered.
pub async fn advance_period(ctx: &HandlerContext, guild_id: GuildId) -> Result<&'static str> {
    let _guard = ctx.guild_locks.lock(&guild_id.0).await;

    let record = ctx.ensure_guild(guild_id).await?;
    let channel_id = ChannelId(
        record
            .submission_channel
            .ok_or_else(|| refused("Set a submission channel with /contest channel first."))?,
    );

    let running = ctx
        .current_period(&record)
        .await?
        .filter(|current| current.active);
    let Some(mut current) = running else {
        let created = Period::new(record.id);
        set_channel_access(ctx, guild_id, channel_id, created.state).await?;

        let mut tx = ctx.db_pool.begin().await?;
        period::create_period(&mut *tx, &created).await?;
        guild::set_current_period(&mut *tx, record.id, created.id).await?;
        tx.commit().await?;

        info!("Period {} created in guild {}", created.id, guild_id);
        return Ok(advance_message(created.state));
    };

    let entering = current.state.next().ok_or_else(|| {
        ContestError::FinishedPeriod(format!("period {} has already finished", current.id))
    })?;

    if current.is_voting() {
        let tallied = reconcile_period(ctx, channel_id, &current, false).await?;
        info!("Final tally of {} submissions in period {}", tallied, current.id);
    }
    if entering == PeriodState::Voting {
        add_markers(ctx, channel_id, &current).await?;
    }
    set_channel_access(ctx, guild_id, channel_id, entering).await?;

    current.advance_state()?;
    let mut tx = ctx.db_pool.begin().await?;
    period::update_period(&mut *tx, &current).await?;
    tx.commit().await?;

    info!("Period {} advanced to {}", current.id, current.state);
    Ok(advance_message(current.state))
}

async fn set_channel_access(
    ctx: &HandlerContext,
    guild_id: GuildId,
    channel_id: ChannelId,
    state: PeriodState,
) -> Result<()> {
    channel_id
        .create_permission(&ctx.ctx.http, &channel_overwrite(guild_id, state))
        .await
        .map_err(|e| {
            warn!("Could not update permissions in {}: {:?}", channel_id, e);
            refused(format!(
                "Could not update permissions in {}. Check that the bot can manage roles in this channel.",
                channel_id.mention()
            ))
        })
}

async fn add_markers(ctx: &HandlerContext, channel_id: ChannelId, current: &Period) -> Result<()> {
    let reactions = ctx.reactions(channel_id);
    let entries = submissions::get_period_submissions(&ctx.db_pool, current.id).await?;

    for entry in &entries {
        if let Err(e) = reactions.add_marker(entry.id).await {
            warn!("Could not add marker reaction to submission {}: {}", entry.id, e);
        }
    }
    info!("Added markers to {} submissions in period {}", entries.len(), current.id);

    Ok(())
}

/// Reconciles every submission of the period, returning how many were updated.
async fn reconcile_period(
    ctx: &HandlerContext,
    channel_id: ChannelId,
    current: &Period,
    force: bool,
) -> Result<usize> {
    let entries = submissions::get_period_submissions(&ctx.db_pool, current.id).await?;

    let mut applied = 0;
    for entry in entries {
        let report = votes::reconcile(ctx, channel_id, MessageId(entry.id), force).await?;
        if report.is_some_and(|report| report.applied) {
            applied += 1;
        }
    }

    Ok(applied)
}

/// Handle the /contest close subcommand
async fn handle_close(
    ctx: HandlerContext,
    command: &ApplicationCommandInteraction,
    guild_id: GuildId,
) -> Result<()> {
    {
        let _guard = ctx.guild_locks.lock(&guild_id.0).await;

        let record = ctx.ensure_guild(guild_id).await?;
        let mut current = ctx
            .current_period(&record)
            .await?
            .filter(|current| current.active)
            .ok_or_else(|| refused("No period is currently active."))?;

        current.deactivate()?;
        period::update_period(&ctx.db_pool, &current).await?;
        if let Some(channel) = record.submission_channel {
            set_channel_access(&ctx, guild_id, ChannelId(channel), PeriodState::Finished).await?;
        }
        info!("Period {} closed in guild {}", current.id, guild_id);
    }

    respond_success(&ctx, command, "Period Closed", "The current period has been closed.").await
}

/// Handle the /contest channel subcommand
async fn handle_channel(
    ctx: HandlerContext,
    command: &ApplicationCommandInteraction,
    subcommand: &CommandDataOption,
    guild_id: GuildId,
) -> Result<()> {
    let channel_id = get_option_channel(subcommand, "channel")?;
    let record = ctx.ensure_guild(guild_id).await?;

    if record.submission_channel == Some(channel_id.0) {
        return Err(refused(format!(
            "The submission channel is already set to {}.",
            channel_id.mention()
        )));
    }

    guild::set_submission_channel(&ctx.db_pool, guild_id.0, channel_id.0).await?;
    info!("Submission channel of {} set to {}", guild_id, channel_id);

    respond_success(
        &ctx,
        command,
        "Submission Channel",
        &format!(":white_check_mark: Submission channel changed to {}.", channel_id.mention()),
    )
    .await
}

/// Handle the /contest resync subcommand
async fn handle_resync(
    ctx: HandlerContext,
    command: &ApplicationCommandInteraction,
    guild_id: GuildId,
) -> Result<()> {
    command
        .create_interaction_response(&ctx.ctx.http, |r| {
            r.kind(InteractionResponseType::DeferredChannelMessageWithSource)
                .interaction_response_data(|m| m.ephemeral(true))
        })
        .await?;

    let outcome = resync(&ctx, guild_id).await;
    if let Err(err) = &outcome {
        error!("Error resyncing votes in {}: {:?}", guild_id, err);
    }

    command
        .edit_original_interaction_response(&ctx.ctx.http, |m| {
            m.embed(|e| {
                match &outcome {
                    Ok(count) => success_embed(
                        e,
                        "Votes Recounted",
                        &format!("Recounted the votes of {} submissions.", count),
                    ),
                    Err(err) => error_embed(e, &user_message(err)),
                }
                e
            })
        })
        .await?;

    Ok(())
}

async fn resync(ctx: &HandlerContext, guild_id: GuildId) -> Result<usize> {
    let record = ctx.ensure_guild(guild_id).await?;
    let channel_id = record
        .submission_channel
        .ok_or_else(|| refused("No submission channel has been set."))?;
    let current = ctx
        .current_period(&record)
        .await?
        .ok_or_else(|| refused("No period has been started yet."))?;

    reconcile_period(ctx, ChannelId(channel_id), &current, true).await
}

/// Handle the /status command
pub async fn handle_status_command(
    ctx: HandlerContext,
    command: &ApplicationCommandInteraction,
) -> Result<()> {
    let guild_id = command
        .guild_id
        .ok_or_else(|| refused("Command must be used in a server"))?;
    let record = ctx.ensure_guild(guild_id).await?;
    let current = ctx.current_period(&record).await?;

    let mut embed = CreateEmbed::default();
    embed.title("Status").color(Color::BLURPLE);

    let channel = match record.submission_channel {
        Some(channel) => ChannelId(channel).mention().to_string(),
        None => "Please set a submission channel.".to_string(),
    };
    embed.field("Submission Channel", channel, false);

    if let Some(current) = current {
        let state = if current.active {
            current.state.to_string()
        } else if current.completed {
            "Finished".to_string()
        } else {
            format!("Closed ({})", current.state)
        };
        embed.field(
            "Status",
            format!("{} - {}", state, current.state.permission_explanation()),
            false,
        );

        let count = submissions::count_period_submissions(&ctx.db_pool, current.id).await?;
        embed.field(
            "Submissions",
            format!("{} submission{}", count, if count == 1 { "" } else { "s" }),
            false,
        );
    }

    command
        .create_interaction_response(&ctx.ctx.http, |r| {
            r.kind(InteractionResponseType::ChannelMessageWithSource)
                .interaction_response_data(|m| m.add_embed(embed))
        })
        .await?;

    Ok(())
}

/// Handle the /leaderboard command
pub async fn handle_leaderboard_command(
    ctx: HandlerContext,
    command: &ApplicationCommandInteraction,
) -> Result<()> {
    let guild_id = command
        .guild_id
        .ok_or_else(|| refused("Command must be used in a server"))?;

    let count = get_option_i64(&command.data.options, "count")
        .map(|count| count.clamp(1, MAX_COUNT as i64) as usize)
        .unwrap_or(DEFAULT_COUNT);
    let page = get_option_i64(&command.data.options, "page")
        .map(|page| page.max(0) as usize)
        .unwrap_or(0);

    let record = ctx.ensure_guild(guild_id).await?;
    let current = ctx
        .current_period(&record)
        .await?
        .ok_or_else(|| refused("No period has been started yet."))?;
    let channel_id = ChannelId(
        record
            .submission_channel
            .ok_or_else(|| refused("No submission channel has been set."))?,
    );

    let entries = submissions::get_period_submissions(&ctx.db_pool, current.id).await?;
    let lines: Vec<String> = leaderboard(entries, count, page)
        .iter()
        .map(|standing| leaderboard_line(guild_id, channel_id, standing))
        .collect();
    let description = if lines.is_empty() {
        "No one has submitted anything yet.".to_string()
    } else {
        lines.join("\n")
    };

    command
        .create_interaction_response(&ctx.ctx.http, |r| {
            r.kind(InteractionResponseType::ChannelMessageWithSource)
                .interaction_response_data(|m| {
                    m.embed(|e| {
                        e.title("Leaderboard")
                            .description(description)
                            .color(Color::GOLD)
                            .timestamp(Timestamp::now())
                            .footer(|f| {
                                f.text(if current.active {
                                    "Contest is still in progress..."
                                } else {
                                    "Contest has finished."
                                })
                            })
                    })
                })
        })
        .await?;

    Ok(())
}

async fn respond_success(
    ctx: &HandlerContext,
    command: &ApplicationCommandInteraction,
    title: &str,
    description: &str,
) -> Result<()> {
    command
        .create_interaction_response(&ctx.ctx.http, |r| {
            r.kind(InteractionResponseType::ChannelMessageWithSource)
                .interaction_response_data(|m| {
                    m.embed(|e| {
                        success_embed(e, title, description);
                        e
                    })
                })
        })
        .await?;

    Ok(())
}

fn get_option_i64(options: &[CommandDataOption], name: &str) -> Option<i64> {
    options
        .iter()
        .find(|opt| opt.name == name)
        .and_then(|opt| opt.value.as_ref())
        .and_then(|val| val.as_i64())
}

fn get_option_bool(options: &[CommandDataOption], name: &str) -> Option<bool> {
    options
        .iter()
        .find(|opt| opt.name == name)
        .and_then(|opt| opt.value.as_ref())
        .and_then(|val| val.as_bool())
}

fn get_option_channel(options: &CommandDataOption, name: &str) -> Result<ChannelId> {
    options
        .options
        .iter()
        .find(|opt| opt.name == name)
        .and_then(|opt| match &opt.resolved {
            Some(CommandDataOptionValue::Channel(channel)) => Some(channel.id),
            _ => None,
        })
        .ok_or_else(|| eyre!("Missing {} parameter", name))
}
