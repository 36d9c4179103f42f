use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::GuildId;
use crate::errors::{ContestError, ContestResult};

/// The states a contest period moves through, in order.
///
/// * `Ready` - channel locked, no messages or reactions.
/// * `Submissions` - channel open to image messages only.
/// * `Paused` - channel locked again.
/// * `Voting` - channel open to reactions only; the bot adds its marker
///   reaction to every submission.
/// * `Finished` - channel locked, results final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodState {
    Ready,
    Submissions,
    Paused,
    Voting,
    Finished,
}

/// What @everyone may do in the submission channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelAccess {
    pub send_messages: bool,
    pub add_reactions: bool,
}

impl PeriodState {
    pub const ALL: [PeriodState; 5] = [
        PeriodState::Ready,
        PeriodState::Submissions,
        PeriodState::Paused,
        PeriodState::Voting,
        PeriodState::Finished,
    ];

    /// The successor state, or `None` from `Finished`.
    pub fn next(self) -> Option<PeriodState> {
        match self {
            PeriodState::Ready => Some(PeriodState::Submissions),
            PeriodState::Submissions => Some(PeriodState::Paused),
            PeriodState::Paused => Some(PeriodState::Voting),
            PeriodState::Voting => Some(PeriodState::Finished),
            PeriodState::Finished => None,
        }
    }

    pub fn channel_access(self) -> ChannelAccess {
        ChannelAccess {
            send_messages: self == PeriodState::Submissions,
            add_reactions: self == PeriodState::Voting,
        }
    }

    pub fn permission_explanation(self) -> &'static str {
        match self {
            PeriodState::Ready => "Submissions and voting are closed until the period starts.",
            PeriodState::Submissions => "Submissions are open. Post exactly one image.",
            PeriodState::Paused => "Submissions are closed. Voting opens soon.",
            PeriodState::Voting => "Voting is open. React with the upvote to vote.",
            PeriodState::Finished => "The contest has finished. Results are final.",
        }
    }

    pub fn as_i16(self) -> i16 {
        self as i16
    }
}

impl TryFrom<i16> for PeriodState {
    type Error = ContestError;

    fn try_from(value: i16) -> ContestResult<Self> {
        usize::try_from(value)
            .ok()
            .and_then(|index| PeriodState::ALL.get(index).copied())
            .ok_or_else(|| ContestError::Validation(format!("Unknown period state {}", value)))
    }
}

impl fmt::Display for PeriodState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PeriodState::Ready => "Ready",
            PeriodState::Submissions => "Submissions",
            PeriodState::Paused => "Paused",
            PeriodState::Voting => "Voting",
            PeriodState::Finished => "Finished",
        };
        f.write_str(name)
    }
}

/// One run of the contest for a guild.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Period {
    pub id: Uuid,
    pub guild_id: GuildId,
    pub state: PeriodState,
    /// Cleared by `deactivate` or on reaching `Finished`.
    pub active: bool,
    /// Set only when `Finished` was reached through `advance_state`.
    pub completed: bool,
    pub start_time: DateTime<Utc>,
    pub submissions_time: Option<DateTime<Utc>>,
    pub paused_time: Option<DateTime<Utc>>,
    pub voting_time: Option<DateTime<Utc>>,
    pub finished_time: Option<DateTime<Utc>>,
}

impl Period {
    pub fn new(guild_id: GuildId) -> Self {
        Self {
            id: Uuid::new_v4(),
            guild_id,
            state: PeriodState::Ready,
            active: true,
            completed: false,
            start_time: Utc::now(),
            submissions_time: None,
            paused_time: None,
            voting_time: None,
            finished_time: None,
        }
    }

    /// Whether reactions on this period's submissions count as votes.
    pub fn is_voting(&self) -> bool {
        self.active && self.state == PeriodState::Voting
    }

    pub fn is_accepting_submissions(&self) -> bool {
        self.active && self.state == PeriodState::Submissions
    }

    /// Moves to the next state and stamps the time the new state was entered.
    ///
    /// Reaching `Finished` marks the period completed and inactive. Calling
    /// this twice performs two transitions.
    pub fn advance_state(&mut self) -> ContestResult<PeriodState> {
        self.ensure_mutable()?;

        let next = self
            .state
            .next()
            .ok_or_else(|| ContestError::FinishedPeriod("period is in its finished state".into()))?;
        let now = Utc::now();

        match next {
            PeriodState::Ready => {}
            PeriodState::Submissions => self.submissions_time = Some(now),
            PeriodState::Paused => self.paused_time = Some(now),
            PeriodState::Voting => self.voting_time = Some(now),
            PeriodState::Finished => {
                self.finished_time = Some(now);
                self.completed = true;
                self.active = false;
            }
        }

        self.state = next;
        Ok(next)
    }

    /// Ends the period early, leaving `state` where it was.
    pub fn deactivate(&mut self) -> ContestResult<()> {
        self.ensure_mutable()?;

        self.active = false;
        self.finished_time = Some(Utc::now());
        Ok(())
    }

    /// The time the period entered `state`, if it has.
    pub fn entered_at(&self, state: PeriodState) -> Option<DateTime<Utc>> {
        match state {
            PeriodState::Ready => Some(self.start_time),
            PeriodState::Submissions => self.submissions_time,
            PeriodState::Paused => self.paused_time,
            PeriodState::Voting => self.voting_time,
            PeriodState::Finished => self.finished_time.filter(|_| self.completed),
        }
    }

    fn ensure_mutable(&self) -> ContestResult<()> {
        if self.state == PeriodState::Finished || self.completed {
            return Err(ContestError::FinishedPeriod("period is in its finished state".into()));
        }
        if !self.active {
            return Err(ContestError::FinishedPeriod("period is no longer active".into()));
        }
        Ok(())
    }
}
