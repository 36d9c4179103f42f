use async_trait::async_trait;
use contestbot_core::errors::{ContestError, ContestResult};
use contestbot_core::ledger::SubmissionStore;
use contestbot_core::models::submission::Submission;
use uuid::Uuid;

use crate::DbPool;
use crate::repositories::submission as submissions;

/// `SubmissionStore` backed by the `submissions` table.
#[derive(Debug, Clone)]
pub struct PgSubmissionStore {
    pool: DbPool,
}

impl PgSubmissionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubmissionStore for PgSubmissionStore {
    async fn submissions_in_period(&self, period_id: Uuid) -> ContestResult<Vec<Submission>> {
        Ok(submissions::get_period_submissions(&self.pool, period_id).await?)
    }

    async fn save_votes(&self, submission: &Submission) -> ContestResult<()> {
        if submissions::update_votes(&self.pool, submission.id, &submission.votes).await? {
            Ok(())
        } else {
            Err(ContestError::NotFound(format!("submission {}", submission.id)))
        }
    }
}
