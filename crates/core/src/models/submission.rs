use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{MessageId, UserId};
use crate::errors::{ContestError, ContestResult};

/// A de-duplicating set of voter ids that keeps insertion order for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<UserId>", into = "Vec<UserId>")]
pub struct VoteSet(Vec<UserId>);

impl VoteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `user`, returning `false` if they were already present.
    pub fn insert(&mut self, user: UserId) -> bool {
        if self.contains(user) {
            return false;
        }
        self.0.push(user);
        true
    }

    /// Removes `user`, returning `false` if they were absent.
    pub fn remove(&mut self, user: UserId) -> bool {
        match self.0.iter().position(|&voter| voter == user) {
            Some(index) => {
                self.0.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, user: UserId) -> bool {
        self.0.contains(&user)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = UserId> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[UserId] {
        &self.0
    }

    pub fn to_set(&self) -> HashSet<UserId> {
        self.0.iter().copied().collect()
    }

    /// Drops every voter in `users`, returning the ones that were present.
    pub fn remove_all(&mut self, users: &HashSet<UserId>) -> Vec<UserId> {
        let (removed, kept): (Vec<UserId>, Vec<UserId>) =
            self.0.iter().partition(|&&voter| users.contains(&voter));
        self.0 = kept;
        removed
    }
}

impl FromIterator<UserId> for VoteSet {
    fn from_iter<I: IntoIterator<Item = UserId>>(iter: I) -> Self {
        let mut votes = VoteSet::new();
        for user in iter {
            votes.insert(user);
        }
        votes
    }
}

impl From<Vec<UserId>> for VoteSet {
    fn from(users: Vec<UserId>) -> Self {
        users.into_iter().collect()
    }
}

impl From<VoteSet> for Vec<UserId> {
    fn from(votes: VoteSet) -> Self {
        votes.0
    }
}

/// A message accepted as a user's entry for a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    /// The id of the message the submission was posted in.
    pub id: MessageId,
    pub user: UserId,
    pub period_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub votes: VoteSet,
}

impl Submission {
    pub fn new(id: MessageId, user: UserId, period_id: Uuid, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            user,
            period_id,
            timestamp,
            votes: VoteSet::new(),
        }
    }

    pub fn count(&self) -> usize {
        self.votes.len()
    }

    /// Replaces the vote set wholesale. Duplicates collapse and the submitter
    /// is never kept as a voter on their own entry.
    pub fn set_votes<I: IntoIterator<Item = UserId>>(&mut self, voters: I) {
        let author = self.user;
        self.votes = voters.into_iter().filter(|&voter| voter != author).collect();
    }

    pub fn increment(&mut self, user: UserId) -> ContestResult<()> {
        if user == self.user {
            return Err(ContestError::SelfVote);
        }
        if !self.votes.insert(user) {
            return Err(ContestError::DoubleVote);
        }
        Ok(())
    }

    pub fn decrement(&mut self, user: UserId) -> ContestResult<()> {
        if !self.votes.remove(user) {
            return Err(ContestError::NoVote);
        }
        Ok(())
    }
}
