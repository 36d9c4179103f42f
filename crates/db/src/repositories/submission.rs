use crate::models::{from_db_id, to_db_id, DbSubmission};
use contestbot_core::models::{
    submission::{Submission, VoteSet},
    MessageId, UserId,
};
use eyre::Result;
use sqlx::PgExecutor;
use uuid::Uuid;

pub async fn create_submission<'e, E>(executor: E, submission: &Submission) -> Result<()>
where
    E: PgExecutor<'e>,
{
    let row = DbSubmission::from(submission);

    sqlx::query(
        r#"
        INSERT INTO submissions (id, user_id, period_id, created_at, votes)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(row.id)
    .bind(row.user_id)
    .bind(row.period_id)
    .bind(row.created_at)
    .bind(row.votes)
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn get_submission<'e, E>(executor: E, id: MessageId) -> Result<Option<Submission>>
where
    E: PgExecutor<'e>,
{
    let submission = sqlx::query_as::<_, DbSubmission>(
        r#"
        SELECT id, user_id, period_id, created_at, votes
        FROM submissions
        WHERE id = $1
        "#,
    )
    .bind(to_db_id(id))
    .fetch_optional(executor)
    .await?;

    Ok(submission.map(Submission::from))
}

/// The live submission `user` made in a period, if any.
pub async fn get_user_submission<'e, E>(
    executor: E,
    period_id: Uuid,
    user: UserId,
) -> Result<Option<Submission>>
where
    E: PgExecutor<'e>,
{
    let submission = sqlx::query_as::<_, DbSubmission>(
        r#"
        SELECT id, user_id, period_id, created_at, votes
        FROM submissions
        WHERE period_id = $1 AND user_id = $2
        "#,
    )
    .bind(period_id)
    .bind(to_db_id(user))
    .fetch_optional(executor)
    .await?;

    Ok(submission.map(Submission::from))
}

pub async fn get_period_submissions<'e, E>(executor: E, period_id: Uuid) -> Result<Vec<Submission>>
where
    E: PgExecutor<'e>,
{
    let submissions = sqlx::query_as::<_, DbSubmission>(
        r#"
        SELECT id, user_id, period_id, created_at, votes
        FROM submissions
        WHERE period_id = $1
        ORDER BY created_at ASC
        "#,
    )
    .bind(period_id)
    .fetch_all(executor)
    .await?;

    Ok(submissions.into_iter().map(Submission::from).collect())
}

pub async fn count_period_submissions<'e, E>(executor: E, period_id: Uuid) -> Result<i64>
where
    E: PgExecutor<'e>,
{
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM submissions
        WHERE period_id = $1
        "#,
    )
    .bind(period_id)
    .fetch_one(executor)
    .await?;

    Ok(count)
}

/// Replaces a submission's votes, returning whether the submission still exists.
pub async fn update_votes<'e, E>(executor: E, id: MessageId, votes: &VoteSet) -> Result<bool>
where
    E: PgExecutor<'e>,
{
    let votes: Vec<i64> = votes.iter().map(to_db_id).collect();

    let result = sqlx::query(
        r#"
        UPDATE submissions
        SET votes = $2
        WHERE id = $1
        "#,
    )
    .bind(to_db_id(id))
    .bind(votes)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Deletes a submission, returning whether it existed.
pub async fn delete_submission<'e, E>(executor: E, id: MessageId) -> Result<bool>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        DELETE FROM submissions
        WHERE id = $1
        "#,
    )
    .bind(to_db_id(id))
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Deletes every listed submission, returning the ids that existed.
pub async fn delete_submissions<'e, E>(executor: E, ids: &[MessageId]) -> Result<Vec<MessageId>>
where
    E: PgExecutor<'e>,
{
    let ids: Vec<i64> = ids.iter().copied().map(to_db_id).collect();

    let deleted = sqlx::query_scalar::<_, i64>(
        r#"
        DELETE FROM submissions
        WHERE id = ANY($1)
        RETURNING id
        "#,
    )
    .bind(ids)
    .fetch_all(executor)
    .await?;

    Ok(deleted.into_iter().map(from_db_id).collect())
}
