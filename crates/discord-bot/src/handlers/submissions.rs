use chrono::{TimeZone, Utc};
use eyre::Result;
use serenity::model::{channel::Message, id::MessageId, mention::Mentionable};
use std::time::Duration;
use tracing::{debug, info, warn};

use contestbot_core::intake::{check_submission, AttachmentMeta, Rejection};
use contestbot_core::models::{period::Period, submission::Submission};
use contestbot_db::repositories::{period, submission as submissions};

use crate::handlers::HandlerContext;

/// How long a rejection notice stays in the submission channel.
const REJECTION_NOTICE_SECS: u64 = 10;

/// Validates a message posted in the submission channel and records it as
/// its author's entry, replacing any earlier one from the same period.
pub async fn handle_message(ctx: HandlerContext, message: &Message) -> Result<()> {
    if message.author.bot {
        return Ok(());
    }
    let Some(guild_id) = message.guild_id else {
        return Ok(());
    };

    let guild = ctx.ensure_guild(guild_id).await?;
    if !guild.is_submission_channel(message.channel_id.0) {
        return Ok(());
    }

    let period = ctx.current_period(&guild).await?;
    let attachments: Vec<AttachmentMeta> = message
        .attachments
        .iter()
        .map(|attachment| AttachmentMeta {
            filename: attachment.filename.clone(),
            width: attachment.width,
        })
        .collect();

    if let Err(rejection) = check_submission(&attachments, period.as_ref()) {
        return reject(&ctx, message, rejection).await;
    }
    let Some(period) = period else {
        return Ok(());
    };

    accept(&ctx, message, &period).await
}

async fn reject(ctx: &HandlerContext, message: &Message, rejection: Rejection) -> Result<()> {
    ctx.delete_message(message.channel_id, message.id).await?;

    if !rejection.notifies_author() {
        warn!(
            "Valid submission was sent outside of submissions in {}/{}. Permissions error? Removed.",
            message.channel_id, message.id
        );
        return Ok(());
    }

    debug!("Rejected message {}: {}", message.id, rejection);
    let notice = message
        .channel_id
        .say(
            &ctx.ctx.http,
            format!(":no_entry_sign: {} {}", message.author.mention(), rejection),
        )
        .await?;
    ctx.delete_message_later(
        message.channel_id,
        notice.id,
        Duration::from_secs(REJECTION_NOTICE_SECS),
    );

    Ok(())
}

async fn accept(ctx: &HandlerContext, message: &Message, checked: &Period) -> Result<()> {
    let timestamp = Utc
        .timestamp_opt(message.timestamp.unix_timestamp(), 0)
        .single()
        .unwrap_or_else(Utc::now);
    let entry = Submission::new(message.id.0, message.author.id.0, checked.id, timestamp);

    let _guard = ctx.period_locks.lock(&checked.id).await;
    let mut tx = ctx.db_pool.begin().await?;

    // The period may have advanced since the message was checked
    let accepting = period::get_period_for_share(&mut *tx, checked.id)
        .await?
        .is_some_and(|current| current.is_accepting_submissions());
    if !accepting {
        tx.rollback().await?;
        return reject(ctx, message, Rejection::OutsideSubmissions).await;
    }

    let previous =
        submissions::get_user_submission(&mut *tx, checked.id, message.author.id.0).await?;
    if let Some(previous) = &previous {
        submissions::delete_submission(&mut *tx, previous.id).await?;
    }
    submissions::create_submission(&mut *tx, &entry).await?;
    tx.commit().await?;

    if let Some(previous) = previous {
        match ctx
            .delete_message(message.channel_id, MessageId(previous.id))
            .await
        {
            Ok(()) => info!(
                "Old submission deleted. {} (Old) -> {} (New)",
                previous.id, entry.id
            ),
            Err(e) => warn!(
                "Could not delete replaced submission message {}: {:?}",
                previous.id, e
            ),
        }
    }
    info!("New submission created ({}).", entry.id);

    Ok(())
}

/// Drops the submission behind a deleted message, unless the bot deleted it.
pub async fn handle_message_delete(ctx: HandlerContext, message_id: MessageId) -> Result<()> {
    if ctx.expected_deletions.lock().await.take(&message_id.0) {
        debug!("Skipping expected deletion of {}", message_id);
        return Ok(());
    }

    if submissions::delete_submission(&ctx.db_pool, message_id.0).await? {
        info!("Submission {} deleted by outside source.", message_id);
    }

    Ok(())
}

pub async fn handle_bulk_delete(ctx: HandlerContext, message_ids: &[MessageId]) -> Result<()> {
    let unexpected: Vec<u64> = {
        let mut expected = ctx.expected_deletions.lock().await;
        message_ids
            .iter()
            .map(|id| id.0)
            .filter(|id| !expected.take(id))
            .collect()
    };
    if unexpected.is_empty() {
        return Ok(());
    }

    let deleted = submissions::delete_submissions(&ctx.db_pool, &unexpected).await?;
    if !deleted.is_empty() {
        info!(
            "{} submissions deleted in bulk message deletion.",
            deleted.len()
        );
        debug!("Messages deleted: {:?}", deleted);
    }

    Ok(())
}
