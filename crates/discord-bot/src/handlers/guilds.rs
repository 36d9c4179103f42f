use eyre::Result;
use serenity::model::id::GuildId;
use tracing::info;

use contestbot_db::repositories::{guild, period};

use crate::handlers::HandlerContext;

/// Records a guild the bot is (again) a member of.
///
/// Discord sends this for every guild at startup as well, so known active
/// guilds are left alone.
pub async fn handle_guild_join(ctx: HandlerContext, guild_id: GuildId) -> Result<()> {
    match guild::get_guild(&ctx.db_pool, guild_id.0).await? {
        None => {
            guild::create_guild(&ctx.db_pool, guild_id.0).await?;
            info!("Joined new guild {}", guild_id);
        }
        Some(existing) if !existing.active => {
            guild::reactivate_guild(&ctx.db_pool, guild_id.0).await?;
            info!("Rejoined guild {}", guild_id);
        }
        Some(_) => {}
    }

    Ok(())
}

/// Marks a guild the bot left as inactive and stops its running period.
pub async fn handle_guild_leave(ctx: HandlerContext, guild_id: GuildId) -> Result<()> {
    let mut tx = ctx.db_pool.begin().await?;

    let Some(existing) = guild::get_guild(&mut *tx, guild_id.0).await? else {
        return Ok(());
    };
    guild::deactivate_guild(&mut *tx, guild_id.0).await?;

    if let Some(period_id) = existing.current_period {
        if let Some(mut running) = period::get_period(&mut *tx, period_id).await? {
            if running.active {
                running.deactivate()?;
                period::update_period(&mut *tx, &running).await?;
            }
        }
    }

    tx.commit().await?;
    info!("Left guild {}", guild_id);

    Ok(())
}
