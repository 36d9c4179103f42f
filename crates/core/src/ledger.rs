//! Vote reconciliation between stored submissions and the reactions Discord
//! reports on their messages.
//!
//! Reaction events arrive out of order and can be missed, so the stored vote
//! set is never patched from event deltas. Instead every event triggers
//! [`Submission::update`], which re-reads the full upvote roster of the
//! message and makes it the new truth, after moving any of the new voters'
//! votes away from the other submissions of the period.

use std::collections::HashSet;

use async_trait::async_trait;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::ContestResult;
use crate::models::period::Period;
use crate::models::submission::{Submission, VoteSet};
use crate::models::{MessageId, UserId};

/// Storage access needed by the ledger.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Every live submission of a period.
    async fn submissions_in_period(&self, period_id: Uuid) -> ContestResult<Vec<Submission>>;

    /// Persists the vote set of `submission`.
    async fn save_votes(&self, submission: &Submission) -> ContestResult<()>;
}

/// Reaction access on the submission channel.
#[async_trait]
pub trait ReactionGateway: Send + Sync {
    /// Every user who applied the upvote reaction to `message`, the bot included.
    async fn upvoters(&self, message: MessageId) -> ContestResult<Vec<UserId>>;

    /// Removes `user`'s upvote from `message`.
    async fn retract_upvote(&self, message: MessageId, user: UserId) -> ContestResult<()>;

    /// Adds the bot's own upvote to `message`.
    async fn add_marker(&self, message: MessageId) -> ContestResult<()>;
}

/// What a call to [`Submission::update`] observed and changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// The bot's marker reaction was present on the message.
    pub saw_self: bool,
    /// Voters present in the roster but not in the stored set.
    pub added: Vec<UserId>,
    /// Voters in the stored set that no longer reacted.
    pub removed: Vec<UserId>,
    /// Votes taken away from other submissions of the period.
    pub displaced: Vec<(MessageId, UserId)>,
    /// The roster was written into the stored vote set.
    pub applied: bool,
}

/// Removes `users` from the vote sets of every submission of the period not
/// listed in `ignore`, returning each `(submission, user)` vote removed.
pub async fn clear_other_votes<S>(
    store: &S,
    period_id: Uuid,
    ignore: &HashSet<MessageId>,
    users: &HashSet<UserId>,
) -> ContestResult<Vec<(MessageId, UserId)>>
where
    S: SubmissionStore + ?Sized,
{
    if users.is_empty() {
        return Ok(Vec::new());
    }
    if ignore.is_empty() {
        warn!(
            "Clearing votes of {} users from every submission in period {}",
            users.len(),
            period_id
        );
    }

    let mut cleared = Vec::new();
    for mut submission in store.submissions_in_period(period_id).await? {
        if ignore.contains(&submission.id) {
            continue;
        }

        let removed = submission.votes.remove_all(users);
        if removed.is_empty() {
            continue;
        }

        store.save_votes(&submission).await?;
        debug!(
            "Cleared {} votes from submission {}",
            removed.len(),
            submission.id
        );
        cleared.extend(removed.into_iter().map(|user| (submission.id, user)));
    }

    Ok(cleared)
}

impl Submission {
    /// Re-derives this submission's votes from the upvotes on its message.
    ///
    /// Collaborator failures are logged and skipped; a failed roster fetch
    /// leaves the stored votes untouched. Votes are only written, and only
    /// taken from other submissions, while `period` is voting or `force` is set.
    pub async fn update<S, G>(
        &mut self,
        period: &Period,
        store: &S,
        reactions: &G,
        self_id: UserId,
        force: bool,
    ) -> Reconciliation
    where
        S: SubmissionStore + ?Sized,
        G: ReactionGateway + ?Sized,
    {
        let mut report = Reconciliation::default();

        let roster = match reactions.upvoters(self.id).await {
            Ok(roster) => roster,
            Err(e) => {
                warn!("Could not fetch upvotes for submission {}: {}", self.id, e);
                return report;
            }
        };

        let mut author_reacted = false;
        let mut current = VoteSet::new();
        for user in roster {
            if user == self_id {
                report.saw_self = true;
            } else if user == self.user {
                author_reacted = true;
            } else {
                current.insert(user);
            }
        }

        if author_reacted {
            debug!("Retracting self-vote by {} on submission {}", self.user, self.id);
            if let Err(e) = reactions.retract_upvote(self.id, self.user).await {
                warn!("Could not retract self-vote on submission {}: {}", self.id, e);
            }
        }

        let apply = force || period.is_voting();
        let old = self.votes.to_set();
        let now = current.to_set();
        report.added = current.iter().filter(|user| !old.contains(user)).collect();
        report.removed = self.votes.iter().filter(|user| !now.contains(user)).collect();

        // Votes only move when this submission takes them
        if apply && !report.added.is_empty() {
            let ignore = HashSet::from([self.id]);
            let users: HashSet<UserId> = report.added.iter().copied().collect();

            match clear_other_votes(store, self.period_id, &ignore, &users).await {
                Ok(displaced) => {
                    for &(message, user) in &displaced {
                        if let Err(e) = reactions.retract_upvote(message, user).await {
                            warn!(
                                "Could not retract moved vote of {} on submission {}: {}",
                                user, message, e
                            );
                        }
                    }
                    report.displaced = displaced;
                }
                Err(e) => warn!(
                    "Could not clear other votes for submission {}: {}",
                    self.id, e
                ),
            }
        }

        if apply {
            if report.added.len() + report.removed.len() > 1 {
                warn!(
                    "Submission {} drifted from its reactions: {} stored, {} reacted",
                    self.id,
                    self.votes.len(),
                    current.len()
                );
            }
            self.votes = current;
            report.applied = true;
        } else if !report.added.is_empty() || !report.removed.is_empty() {
            debug!(
                "Submission {} reactions changed outside of voting; votes kept",
                self.id
            );
        }

        if !report.saw_self {
            if let Err(e) = reactions.add_marker(self.id).await {
                warn!("Could not add marker reaction to submission {}: {}", self.id, e);
            }
        }

        report
    }
}
