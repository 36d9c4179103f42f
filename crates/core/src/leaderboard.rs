use crate::models::submission::Submission;

pub const DEFAULT_COUNT: usize = 10;
pub const MAX_COUNT: usize = 15;

/// A submission's place on the leaderboard.
#[derive(Debug, Clone, PartialEq)]
pub struct Standing {
    /// 1-based across pages.
    pub rank: usize,
    pub submission: Submission,
}

impl Standing {
    pub fn medal(&self) -> Option<&'static str> {
        match self.rank {
            1 => Some("🏆"),
            2 => Some("🥈"),
            3 => Some("🥉"),
            _ => None,
        }
    }
}

/// Ranks submissions by vote count, earliest first on ties, and returns one page.
pub fn leaderboard(mut submissions: Vec<Submission>, count: usize, page: usize) -> Vec<Standing> {
    let count = count.clamp(1, MAX_COUNT);

    submissions.sort_by(|a, b| {
        b.count()
            .cmp(&a.count())
            .then(a.timestamp.cmp(&b.timestamp))
            .then(a.id.cmp(&b.id))
    });

    submissions
        .into_iter()
        .enumerate()
        .skip(page.saturating_mul(count))
        .take(count)
        .map(|(index, submission)| Standing {
            rank: index + 1,
            submission,
        })
        .collect()
}
