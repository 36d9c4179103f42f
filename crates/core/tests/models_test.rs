use chrono::Utc;
use contestbot_core::errors::ContestError;
use contestbot_core::models::{
    guild::Guild,
    period::{Period, PeriodState},
    submission::{Submission, VoteSet},
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{from_str, to_string};
use uuid::Uuid;

fn submission(id: u64, user: u64) -> Submission {
    Submission::new(id, user, Uuid::new_v4(), Utc::now())
}

#[test]
fn test_new_period_is_ready() {
    let period = Period::new(1);

    assert_eq!(period.state, PeriodState::Ready);
    assert!(period.active);
    assert!(!period.completed);
    assert!(period.submissions_time.is_none());
    assert!(period.finished_time.is_none());
}

#[test]
fn test_advance_through_every_state() {
    let mut period = Period::new(1);

    assert_eq!(period.advance_state().unwrap(), PeriodState::Submissions);
    assert!(period.submissions_time.is_some());
    assert!(period.paused_time.is_none());

    assert_eq!(period.advance_state().unwrap(), PeriodState::Paused);
    assert!(period.paused_time.is_some());

    assert_eq!(period.advance_state().unwrap(), PeriodState::Voting);
    assert!(period.voting_time.is_some());
    assert!(period.is_voting());

    assert_eq!(period.advance_state().unwrap(), PeriodState::Finished);
    assert!(period.finished_time.is_some());
    assert!(period.completed);
    assert!(!period.active);
    assert_eq!(period.state, PeriodState::Finished);
}

#[test]
fn test_advance_after_finished_fails() {
    let mut period = Period::new(1);
    for _ in 0..4 {
        period.advance_state().unwrap();
    }
    let before = period.clone();

    let result = period.advance_state();

    assert!(matches!(result, Err(ContestError::FinishedPeriod(_))));
    assert_eq!(period, before);
}

#[test]
fn test_timestamps_follow_transition_order() {
    let mut period = Period::new(1);
    for _ in 0..4 {
        period.advance_state().unwrap();
    }

    let stamps: Vec<_> = PeriodState::ALL
        .iter()
        .map(|&state| period.entered_at(state).unwrap())
        .collect();
    assert!(stamps.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[test]
fn test_deactivate_keeps_state() {
    let mut period = Period::new(1);
    period.advance_state().unwrap();
    period.advance_state().unwrap();

    period.deactivate().unwrap();

    assert_eq!(period.state, PeriodState::Paused);
    assert!(!period.active);
    assert!(!period.completed);
    assert!(period.finished_time.is_some());
    assert_eq!(period.entered_at(PeriodState::Finished), None);
}

#[test]
fn test_inactive_period_rejects_all_mutation() {
    let mut period = Period::new(1);
    period.deactivate().unwrap();
    let before = period.clone();

    assert!(matches!(period.advance_state(), Err(ContestError::FinishedPeriod(_))));
    assert!(matches!(period.deactivate(), Err(ContestError::FinishedPeriod(_))));
    assert_eq!(period, before);
}

#[test]
fn test_completed_period_cannot_deactivate() {
    let mut period = Period::new(1);
    for _ in 0..4 {
        period.advance_state().unwrap();
    }

    assert!(matches!(period.deactivate(), Err(ContestError::FinishedPeriod(_))));
}

#[rstest]
#[case(PeriodState::Ready, false, false)]
#[case(PeriodState::Submissions, true, false)]
#[case(PeriodState::Paused, false, false)]
#[case(PeriodState::Voting, false, true)]
#[case(PeriodState::Finished, false, false)]
fn test_channel_access(
    #[case] state: PeriodState,
    #[case] send_messages: bool,
    #[case] add_reactions: bool,
) {
    let access = state.channel_access();

    assert_eq!(access.send_messages, send_messages);
    assert_eq!(access.add_reactions, add_reactions);
}

#[rstest]
#[case(0, PeriodState::Ready)]
#[case(1, PeriodState::Submissions)]
#[case(2, PeriodState::Paused)]
#[case(3, PeriodState::Voting)]
#[case(4, PeriodState::Finished)]
fn test_period_state_from_i16(#[case] value: i16, #[case] state: PeriodState) {
    assert_eq!(PeriodState::try_from(value).unwrap(), state);
    assert_eq!(state.as_i16(), value);
}

#[rstest]
#[case(-1)]
#[case(5)]
fn test_period_state_from_invalid_i16(#[case] value: i16) {
    assert!(matches!(
        PeriodState::try_from(value),
        Err(ContestError::Validation(_))
    ));
}

#[test]
fn test_period_state_next_is_total_order() {
    let mut state = PeriodState::Ready;
    let mut seen = vec![state];
    while let Some(next) = state.next() {
        assert!(next > state);
        seen.push(next);
        state = next;
    }

    assert_eq!(seen, PeriodState::ALL.to_vec());
}

#[test]
fn test_vote_set_collapses_duplicates() {
    let votes = VoteSet::from(vec![1, 2, 2, 3]);

    assert_eq!(votes.as_slice(), &[1, 2, 3]);
    assert_eq!(votes.len(), 3);
}

#[test]
fn test_set_votes_collapses_duplicates() {
    let mut entry = submission(10, 100);

    entry.set_votes(vec![1, 2, 2, 3]);

    assert_eq!(entry.votes.as_slice(), &[1, 2, 3]);
    assert_eq!(entry.count(), 3);
}

#[test]
fn test_set_votes_drops_author() {
    let mut entry = submission(10, 100);

    entry.set_votes(vec![1, 100, 2]);

    assert_eq!(entry.votes.as_slice(), &[1, 2]);
}

#[test]
fn test_vote_set_serializes_as_array() {
    let votes = VoteSet::from(vec![5, 6]);

    let json = to_string(&votes).expect("Failed to serialize vote set");
    assert_eq!(json, "[5,6]");

    let deserialized: VoteSet = from_str("[5,6,6]").expect("Failed to deserialize vote set");
    assert_eq!(deserialized, votes);
}

#[test]
fn test_self_vote_rejected() {
    let mut entry = submission(10, 100);

    assert!(matches!(entry.increment(100), Err(ContestError::SelfVote)));
    assert!(entry.votes.is_empty());
}

#[test]
fn test_double_vote_rejected() {
    let mut entry = submission(10, 100);

    entry.increment(7).unwrap();
    assert!(matches!(entry.increment(7), Err(ContestError::DoubleVote)));
    assert_eq!(entry.votes.as_slice(), &[7]);
}

#[test]
fn test_decrement_missing_vote_rejected() {
    let mut entry = submission(10, 100);
    entry.increment(7).unwrap();

    assert!(matches!(entry.decrement(8), Err(ContestError::NoVote)));
    assert_eq!(entry.votes.as_slice(), &[7]);

    entry.decrement(7).unwrap();
    assert_eq!(entry.count(), 0);
}

#[test]
fn test_submission_serialization() {
    let mut entry = submission(10, 100);
    entry.set_votes(vec![1, 2]);

    let json = to_string(&entry).expect("Failed to serialize submission");
    let deserialized: Submission = from_str(&json).expect("Failed to deserialize submission");

    assert_eq!(deserialized, entry);
}

#[test]
fn test_guild_submission_channel() {
    let mut guild = Guild::new(1);
    assert!(!guild.is_submission_channel(5));

    guild.submission_channel = Some(5);
    assert!(guild.is_submission_channel(5));
    assert!(!guild.is_submission_channel(6));
}
