use chrono::{DateTime, Utc};
use contestbot_core::models::{
    guild::Guild,
    period::{Period, PeriodState},
    submission::Submission,
};
use eyre::Result;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Snowflakes fit in 63 bits, so they are stored as `BIGINT`.
pub fn to_db_id(id: u64) -> i64 {
    id as i64
}

pub fn from_db_id(id: i64) -> u64 {
    id as u64
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbGuild {
    pub id: i64,
    pub submission_channel: Option<i64>,
    pub current_period: Option<Uuid>,
    pub active: bool,
    pub joined: DateTime<Utc>,
    pub last_joined: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbPeriod {
    pub id: Uuid,
    pub guild_id: i64,
    pub state: i16,
    pub active: bool,
    pub completed: bool,
    pub start_time: DateTime<Utc>,
    pub submissions_time: Option<DateTime<Utc>>,
    pub paused_time: Option<DateTime<Utc>>,
    pub voting_time: Option<DateTime<Utc>>,
    pub finished_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSubmission {
    pub id: i64,
    pub user_id: i64,
    pub period_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub votes: Vec<i64>,
}

impl From<DbGuild> for Guild {
    fn from(row: DbGuild) -> Self {
        Guild {
            id: from_db_id(row.id),
            submission_channel: row.submission_channel.map(from_db_id),
            current_period: row.current_period,
            active: row.active,
            joined: row.joined,
            last_joined: row.last_joined,
        }
    }
}

impl TryFrom<DbPeriod> for Period {
    type Error = eyre::Report;

    fn try_from(row: DbPeriod) -> Result<Self> {
        let state = PeriodState::try_from(row.state)?;
        Ok(Period {
            id: row.id,
            guild_id: from_db_id(row.guild_id),
            state,
            active: row.active,
            completed: row.completed,
            start_time: row.start_time,
            submissions_time: row.submissions_time,
            paused_time: row.paused_time,
            voting_time: row.voting_time,
            finished_time: row.finished_time,
        })
    }
}

impl From<DbSubmission> for Submission {
    fn from(row: DbSubmission) -> Self {
        let mut submission = Submission::new(
            from_db_id(row.id),
            from_db_id(row.user_id),
            row.period_id,
            row.created_at,
        );
        submission.set_votes(row.votes.into_iter().map(from_db_id));
        submission
    }
}

impl From<&Submission> for DbSubmission {
    fn from(submission: &Submission) -> Self {
        DbSubmission {
            id: to_db_id(submission.id),
            user_id: to_db_id(submission.user),
            period_id: submission.period_id,
            created_at: submission.timestamp,
            votes: submission.votes.iter().map(to_db_id).collect(),
        }
    }
}
