use crate::models::{to_db_id, DbPeriod};
use contestbot_core::models::period::Period;
use eyre::Result;
use sqlx::PgExecutor;
use uuid::Uuid;

pub async fn create_period<'e, E>(executor: E, period: &Period) -> Result<()>
where
    E: PgExecutor<'e>,
{
    tracing::debug!("Creating period: id={}, guild={}", period.id, period.guild_id);

    sqlx::query(
        r#"
        INSERT INTO periods (id, guild_id, state, active, completed, start_time)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(period.id)
    .bind(to_db_id(period.guild_id))
    .bind(period.state.as_i16())
    .bind(period.active)
    .bind(period.completed)
    .bind(period.start_time)
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn get_period<'e, E>(executor: E, id: Uuid) -> Result<Option<Period>>
where
    E: PgExecutor<'e>,
{
    let period = sqlx::query_as::<_, DbPeriod>(
        r#"
        SELECT id, guild_id, state, active, completed, start_time,
               submissions_time, paused_time, voting_time, finished_time
        FROM periods
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    period.map(Period::try_from).transpose()
}

/// Reads a period and holds a share lock on its row until the transaction
/// ends, so it cannot advance underneath the caller.
pub async fn get_period_for_share<'e, E>(executor: E, id: Uuid) -> Result<Option<Period>>
where
    E: PgExecutor<'e>,
{
    let period = sqlx::query_as::<_, DbPeriod>(
        r#"
        SELECT id, guild_id, state, active, completed, start_time,
               submissions_time, paused_time, voting_time, finished_time
        FROM periods
        WHERE id = $1
        FOR SHARE
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    period.map(Period::try_from).transpose()
}

/// Writes the state, flags and timestamps of an advanced or deactivated period.
pub async fn update_period<'e, E>(executor: E, period: &Period) -> Result<()>
where
    E: PgExecutor<'e>,
{
    tracing::debug!(
        "Updating period: id={}, state={}, active={}",
        period.id,
        period.state,
        period.active
    );

    sqlx::query(
        r#"
        UPDATE periods
        SET state = $2, active = $3, completed = $4,
            submissions_time = $5, paused_time = $6, voting_time = $7, finished_time = $8
        WHERE id = $1
        "#,
    )
    .bind(period.id)
    .bind(period.state.as_i16())
    .bind(period.active)
    .bind(period.completed)
    .bind(period.submissions_time)
    .bind(period.paused_time)
    .bind(period.voting_time)
    .bind(period.finished_time)
    .execute(executor)
    .await?;

    Ok(())
}
