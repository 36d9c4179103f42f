use crate::models::{to_db_id, DbGuild};
use chrono::Utc;
use contestbot_core::models::{guild::Guild, ChannelId, GuildId};
use eyre::Result;
use sqlx::PgExecutor;
use uuid::Uuid;

pub async fn create_guild<'e, E>(executor: E, id: GuildId) -> Result<Guild>
where
    E: PgExecutor<'e>,
{
    let now = Utc::now();

    let guild = sqlx::query_as::<_, DbGuild>(
        r#"
        INSERT INTO guilds (id, active, joined)
        VALUES ($1, TRUE, $2)
        ON CONFLICT (id)
        DO UPDATE SET active = TRUE
        RETURNING id, submission_channel, current_period, active, joined, last_joined
        "#,
    )
    .bind(to_db_id(id))
    .bind(now)
    .fetch_one(executor)
    .await?;

    Ok(guild.into())
}

pub async fn get_guild<'e, E>(executor: E, id: GuildId) -> Result<Option<Guild>>
where
    E: PgExecutor<'e>,
{
    let guild = sqlx::query_as::<_, DbGuild>(
        r#"
        SELECT id, submission_channel, current_period, active, joined, last_joined
        FROM guilds
        WHERE id = $1
        "#,
    )
    .bind(to_db_id(id))
    .fetch_optional(executor)
    .await?;

    Ok(guild.map(Guild::from))
}

/// Marks a guild the bot has rejoined as active again.
pub async fn reactivate_guild<'e, E>(executor: E, id: GuildId) -> Result<()>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        UPDATE guilds
        SET active = TRUE, last_joined = $2
        WHERE id = $1
        "#,
    )
    .bind(to_db_id(id))
    .bind(Utc::now())
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn deactivate_guild<'e, E>(executor: E, id: GuildId) -> Result<()>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        UPDATE guilds
        SET active = FALSE
        WHERE id = $1
        "#,
    )
    .bind(to_db_id(id))
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn set_submission_channel<'e, E>(
    executor: E,
    id: GuildId,
    channel: ChannelId,
) -> Result<()>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        UPDATE guilds
        SET submission_channel = $2
        WHERE id = $1
        "#,
    )
    .bind(to_db_id(id))
    .bind(to_db_id(channel))
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn set_current_period<'e, E>(executor: E, id: GuildId, period_id: Uuid) -> Result<()>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        UPDATE guilds
        SET current_period = $2
        WHERE id = $1
        "#,
    )
    .bind(to_db_id(id))
    .bind(period_id)
    .execute(executor)
    .await?;

    Ok(())
}
