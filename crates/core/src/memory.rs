//! In-memory implementation of `SubmissionStore`.
//!
//! All submissions are held in a map and lost on restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::{ContestError, ContestResult};
use crate::ledger::SubmissionStore;
use crate::models::MessageId;
use crate::models::submission::Submission;

#[derive(Debug, Default)]
pub struct MemoryStore {
    submissions: RwLock<HashMap<MessageId, Submission>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, submission: Submission) {
        let mut submissions = self.submissions.write().await;
        submissions.insert(submission.id, submission);
    }

    pub async fn get(&self, id: MessageId) -> Option<Submission> {
        let submissions = self.submissions.read().await;
        submissions.get(&id).cloned()
    }

    pub async fn remove(&self, id: MessageId) -> Option<Submission> {
        let mut submissions = self.submissions.write().await;
        submissions.remove(&id)
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn submissions_in_period(&self, period_id: Uuid) -> ContestResult<Vec<Submission>> {
        let submissions = self.submissions.read().await;
        let mut found: Vec<Submission> = submissions
            .values()
            .filter(|submission| submission.period_id == period_id)
            .cloned()
            .collect();
        found.sort_by_key(|submission| submission.id);
        Ok(found)
    }

    async fn save_votes(&self, submission: &Submission) -> ContestResult<()> {
        let mut submissions = self.submissions.write().await;
        let stored = submissions
            .get_mut(&submission.id)
            .ok_or_else(|| ContestError::NotFound(format!("submission {}", submission.id)))?;
        stored.votes = submission.votes.clone();
        Ok(())
    }
}
