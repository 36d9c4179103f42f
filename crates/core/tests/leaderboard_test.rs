use chrono::{Duration, Utc};
use contestbot_core::leaderboard::{leaderboard, MAX_COUNT};
use contestbot_core::models::submission::Submission;
use pretty_assertions::assert_eq;
use uuid::Uuid;

fn entries(vote_counts: &[usize]) -> Vec<Submission> {
    let period_id = Uuid::new_v4();
    let start = Utc::now();
    vote_counts
        .iter()
        .enumerate()
        .map(|(index, &count)| {
            let id = index as u64 + 1;
            let mut submission =
                Submission::new(id, 100 + id, period_id, start + Duration::seconds(index as i64));
            submission.set_votes((0..count as u64).map(|voter| 1000 + voter));
            submission
        })
        .collect()
}

fn ids(standings: &[contestbot_core::leaderboard::Standing]) -> Vec<u64> {
    standings.iter().map(|standing| standing.submission.id).collect()
}

#[test]
fn test_orders_by_votes() {
    let board = leaderboard(entries(&[1, 5, 3]), 10, 0);

    assert_eq!(ids(&board), vec![2, 3, 1]);
    assert_eq!(board[0].rank, 1);
    assert_eq!(board[0].medal(), Some("🏆"));
    assert_eq!(board[2].medal(), Some("🥉"));
}

#[test]
fn test_ties_go_to_earlier_submission() {
    let board = leaderboard(entries(&[2, 2, 2]), 10, 0);

    assert_eq!(ids(&board), vec![1, 2, 3]);
}

#[test]
fn test_pages_keep_global_rank() {
    let board = leaderboard(entries(&[6, 5, 4, 3, 2]), 2, 1);

    assert_eq!(ids(&board), vec![3, 4]);
    assert_eq!(board[0].rank, 3);
    assert_eq!(board[1].rank, 4);
    assert_eq!(board[1].medal(), None);
}

#[test]
fn test_count_is_clamped() {
    let many: Vec<usize> = (0..30).collect();

    assert_eq!(leaderboard(entries(&many), 100, 0).len(), MAX_COUNT);
    assert_eq!(leaderboard(entries(&many), 0, 0).len(), 1);
}

#[test]
fn test_page_past_end_is_empty() {
    assert!(leaderboard(entries(&[1, 2]), 10, 3).is_empty());
    assert!(leaderboard(Vec::new(), 10, 0).is_empty());
}
