use async_trait::async_trait;
use mockall::mock;
use uuid::Uuid;

use crate::errors::ContestResult;
use crate::ledger::{ReactionGateway, SubmissionStore};
use crate::models::submission::Submission;
use crate::models::{MessageId, UserId};

// Mock collaborators for testing
mock! {
    pub Reactions {}

    #[async_trait]
    impl ReactionGateway for Reactions {
        async fn upvoters(&self, message: MessageId) -> ContestResult<Vec<UserId>>;

        async fn retract_upvote(&self, message: MessageId, user: UserId) -> ContestResult<()>;

        async fn add_marker(&self, message: MessageId) -> ContestResult<()>;
    }
}

mock! {
    pub Store {}

    #[async_trait]
    impl SubmissionStore for Store {
        async fn submissions_in_period(&self, period_id: Uuid) -> ContestResult<Vec<Submission>>;

        async fn save_votes(&self, submission: &Submission) -> ContestResult<()>;
    }
}
