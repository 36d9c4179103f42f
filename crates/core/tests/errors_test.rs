use std::error::Error;
use contestbot_core::errors::{ContestError, ContestResult};

#[test]
fn test_contest_error_display() {
    let finished = ContestError::FinishedPeriod("period is no longer active".to_string());
    let not_found = ContestError::NotFound("submission 42".to_string());
    let validation = ContestError::Validation("Unknown period state 9".to_string());
    let database = ContestError::Database(eyre::eyre!("Database connection failed"));
    let gateway = ContestError::Gateway("rate limited".to_string());

    assert_eq!(
        finished.to_string(),
        "Period is inactive: period is no longer active"
    );
    assert_eq!(not_found.to_string(), "Resource not found: submission 42");
    assert_eq!(
        validation.to_string(),
        "Validation error: Unknown period state 9"
    );
    assert!(database.to_string().contains("Database error:"));
    assert_eq!(gateway.to_string(), "Gateway error: rate limited");
    assert_eq!(
        ContestError::Precondition("No submission channel has been set.".to_string()).to_string(),
        "No submission channel has been set."
    );
}

#[test]
fn test_vote_error_messages() {
    assert_eq!(
        ContestError::SelfVote.to_string(),
        "You can't vote on your own submission. Please choose another post."
    );
    assert_eq!(
        ContestError::DoubleVote.to_string(),
        "You can't vote for a submission twice."
    );
    assert_eq!(
        ContestError::NoVote.to_string(),
        "You can't remove a vote that never or no longer exists."
    );
}

#[test]
fn test_user_facing_errors() {
    assert!(ContestError::SelfVote.is_user_facing());
    assert!(ContestError::DoubleVote.is_user_facing());
    assert!(ContestError::NoVote.is_user_facing());
    assert!(ContestError::FinishedPeriod("finished".to_string()).is_user_facing());
    assert!(ContestError::Precondition("No period is currently active.".to_string()).is_user_facing());
    assert!(!ContestError::Validation("Unknown period state 9".to_string()).is_user_facing());
    assert!(!ContestError::Gateway("timeout".to_string()).is_user_facing());
    assert!(!ContestError::Database(eyre::eyre!("gone")).is_user_facing());
}

#[test]
fn test_from_eyre_report() {
    let report = eyre::eyre!("Database error");
    let contest_error: ContestError = report.into();

    assert!(matches!(contest_error, ContestError::Database(_)));
    assert!(contest_error.source().is_some());
}

#[test]
fn test_contest_result() {
    let result: ContestResult<i32> = Ok(42);
    assert_eq!(result.unwrap(), 42);

    let result: ContestResult<i32> = Err(ContestError::NoVote);
    assert!(result.is_err());
}
