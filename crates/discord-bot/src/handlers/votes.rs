//! Reaction events on the submission channel.
//!
//! Every upvote change triggers a full reconciliation of the submission's
//! votes against the reactions on its message, serialised per period.

use eyre::{eyre, Result};
use serenity::model::{
    channel::Reaction,
    id::{ChannelId, MessageId},
};
use tracing::{debug, warn};

use contestbot_core::ledger::{ReactionGateway, Reconciliation};
use contestbot_db::repositories::{period, submission as submissions};

use crate::handlers::HandlerContext;

/// Re-derives the votes of one submission from its reactions and stores them.
///
/// Returns `None` when the message is not a submission.
pub async fn reconcile(
    ctx: &HandlerContext,
    channel_id: ChannelId,
    message_id: MessageId,
    force: bool,
) -> Result<Option<Reconciliation>> {
    let Some(found) = submissions::get_submission(&ctx.db_pool, message_id.0).await? else {
        return Ok(None);
    };

    let _guard = ctx.period_locks.lock(&found.period_id).await;

    // Re-read under the lock, another reconciliation may have moved votes
    let Some(mut entry) = submissions::get_submission(&ctx.db_pool, found.id).await? else {
        return Ok(None);
    };
    let contest_period = period::get_period(&ctx.db_pool, entry.period_id)
        .await?
        .ok_or_else(|| eyre!("Period {} of submission {} not found", entry.period_id, entry.id))?;

    let store = ctx.store();
    let reactions = ctx.reactions(channel_id);
    let report = entry
        .update(&contest_period, &store, &reactions, ctx.self_id(), force)
        .await;

    if report.applied && !submissions::update_votes(&ctx.db_pool, entry.id, &entry.votes).await? {
        debug!("Submission {} was deleted while reconciling", entry.id);
        return Ok(None);
    }
    debug!(
        "Reconciled submission {}: +{} -{} moved {}, {} votes",
        entry.id,
        report.added.len(),
        report.removed.len(),
        report.displaced.len(),
        entry.count()
    );

    Ok(Some(report))
}

pub async fn handle_reaction_add(ctx: HandlerContext, reaction: &Reaction) -> Result<()> {
    let (Some(user_id), Some(guild_id)) = (reaction.user_id, reaction.guild_id) else {
        return Ok(());
    };
    if user_id.0 == ctx.self_id() {
        return Ok(());
    }

    let guild = ctx.ensure_guild(guild_id).await?;
    if !guild.is_submission_channel(reaction.channel_id.0) {
        return Ok(());
    }

    if ctx.config.is_upvote(&reaction.emoji) {
        let Some(entry) = submissions::get_submission(&ctx.db_pool, reaction.message_id.0).await?
        else {
            warn!(
                "Upvote reaction added to message {}, but no submission found in database.",
                reaction.message_id
            );
            return Ok(());
        };

        let contest_period = period::get_period(&ctx.db_pool, entry.period_id).await?;
        if contest_period.as_ref().is_some_and(|p| p.is_voting()) {
            reconcile(&ctx, reaction.channel_id, reaction.message_id, false).await?;
            return Ok(());
        }

        warn!(
            "User {} attempted to vote on submission {} outside of voting.",
            user_id, entry.id
        );
    }

    // Anything else should have been blocked by the channel permissions
    ctx.expected_removals
        .lock()
        .await
        .insert((reaction.message_id.0, user_id.0));
    reaction
        .channel_id
        .delete_reaction(
            &ctx.ctx.http,
            reaction.message_id,
            Some(user_id),
            reaction.emoji.clone(),
        )
        .await?;

    Ok(())
}

pub async fn handle_reaction_remove(ctx: HandlerContext, reaction: &Reaction) -> Result<()> {
    let Some(user_id) = reaction.user_id else {
        return Ok(());
    };
    if ctx
        .expected_removals
        .lock()
        .await
        .take(&(reaction.message_id.0, user_id.0))
    {
        debug!(
            "Skipping expected reaction removal on {}.",
            reaction.message_id
        );
        return Ok(());
    }
    if !ctx.config.is_upvote(&reaction.emoji) {
        return Ok(());
    }

    let Some(guild_id) = reaction.guild_id else {
        return Ok(());
    };
    let guild = ctx.ensure_guild(guild_id).await?;
    if !guild.is_submission_channel(reaction.channel_id.0) {
        return Ok(());
    }

    if reconcile(&ctx, reaction.channel_id, reaction.message_id, false)
        .await?
        .is_none()
    {
        warn!(
            "Upvote reaction removed from message {}, but no submission found in database.",
            reaction.message_id
        );
    }

    Ok(())
}

/// All reactions, or all upvotes, were wiped from a message: its votes go
/// with them and the marker is put back.
pub async fn handle_reactions_cleared(
    ctx: HandlerContext,
    channel_id: ChannelId,
    message_id: MessageId,
) -> Result<()> {
    let Some(found) = submissions::get_submission(&ctx.db_pool, message_id.0).await? else {
        return Ok(());
    };

    {
        let _guard = ctx.period_locks.lock(&found.period_id).await;
        let Some(mut entry) = submissions::get_submission(&ctx.db_pool, found.id).await? else {
            return Ok(());
        };
        entry.set_votes(Vec::new());
        submissions::update_votes(&ctx.db_pool, entry.id, &entry.votes).await?;
    }
    warn!("Reactions cleared from submission {}, votes reset.", message_id);

    ctx.reactions(channel_id).add_marker(message_id.0).await?;

    Ok(())
}
