use contestbot_core::errors::ContestError;
use contestbot_discord_bot::handlers::{user_message, GENERIC_ERROR};
use pretty_assertions::assert_eq;

#[test]
fn test_user_message_shows_refusals() {
    let finished: eyre::Report =
        ContestError::FinishedPeriod("period 7 has already finished".to_string()).into();
    let refused: eyre::Report =
        ContestError::Precondition("No period is currently active.".to_string()).into();

    assert_eq!(
        user_message(&finished),
        "Period is inactive: period 7 has already finished"
    );
    assert_eq!(user_message(&refused), "No period is currently active.");
}

#[test]
fn test_user_message_hides_faults() {
    let database = eyre::eyre!("error returned from database: relation \"periods\" does not exist");
    let wrapped: eyre::Report = ContestError::Database(eyre::eyre!("pool timed out")).into();
    let gateway: eyre::Report = ContestError::Gateway("Missing Access".to_string()).into();

    assert_eq!(user_message(&database), GENERIC_ERROR);
    assert_eq!(user_message(&wrapped), GENERIC_ERROR);
    assert_eq!(user_message(&gateway), GENERIC_ERROR);
}
