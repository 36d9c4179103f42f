use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

const INDEXES: [&str; 4] = [
    "CREATE INDEX IF NOT EXISTS idx_periods_guild_id ON periods(guild_id)",
    "CREATE INDEX IF NOT EXISTS idx_submissions_period_id ON submissions(period_id)",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_submissions_period_user ON submissions(period_id, user_id)",
    "CREATE INDEX IF NOT EXISTS idx_submissions_votes ON submissions USING GIN (votes)",
];

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create guilds table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS guilds (
            id BIGINT PRIMARY KEY,
            submission_channel BIGINT NULL,
            current_period UUID NULL,
            active BOOLEAN NOT NULL DEFAULT TRUE,
            joined TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            last_joined TIMESTAMP WITH TIME ZONE NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create periods table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS periods (
            id UUID PRIMARY KEY,
            guild_id BIGINT NOT NULL REFERENCES guilds(id),
            state SMALLINT NOT NULL DEFAULT 0,
            active BOOLEAN NOT NULL DEFAULT TRUE,
            completed BOOLEAN NOT NULL DEFAULT FALSE,
            start_time TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            submissions_time TIMESTAMP WITH TIME ZONE NULL,
            paused_time TIMESTAMP WITH TIME ZONE NULL,
            voting_time TIMESTAMP WITH TIME ZONE NULL,
            finished_time TIMESTAMP WITH TIME ZONE NULL,
            CONSTRAINT valid_state CHECK (state BETWEEN 0 AND 4),
            CONSTRAINT completed_is_inactive CHECK (NOT (completed AND active))
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create submissions table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS submissions (
            id BIGINT PRIMARY KEY,
            user_id BIGINT NOT NULL,
            period_id UUID NOT NULL REFERENCES periods(id),
            created_at TIMESTAMP WITH TIME ZONE NOT NULL,
            votes BIGINT[] NOT NULL DEFAULT '{}'
        );
        "#,
    )
    .execute(pool)
    .await?;

    for statement in INDEXES {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Database schema initialized successfully.");
    Ok(())
}
