use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContestError {
    /// The period is inactive or already in its final state.
    #[error("Period is inactive: {0}")]
    FinishedPeriod(String),

    #[error("You can't vote on your own submission. Please choose another post.")]
    SelfVote,

    #[error("You can't vote for a submission twice.")]
    DoubleVote,

    #[error("You can't remove a vote that never or no longer exists.")]
    NoVote,

    /// A command was refused because the guild is not set up for it.
    #[error("{0}")]
    Precondition(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] eyre::Report),

    /// The chat transport failed to fetch or mutate reactions.
    #[error("Gateway error: {0}")]
    Gateway(String),
}

impl ContestError {
    /// Whether the error describes a rejected user action rather than a fault.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            ContestError::FinishedPeriod(_)
                | ContestError::SelfVote
                | ContestError::DoubleVote
                | ContestError::NoVote
                | ContestError::Precondition(_)
        )
    }
}

pub type ContestResult<T> = Result<T, ContestError>;
