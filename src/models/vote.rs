use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;

/// Direction of a vote. Stored as +1 / -1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum VoteValue {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Voto inválido.")]
pub struct InvalidVote;

impl VoteValue {
    pub fn as_i32(self) -> i32 {
        match self {
            VoteValue::Up => 1,
            VoteValue::Down => -1,
        }
    }
}

impl TryFrom<i32> for VoteValue {
    type Error = InvalidVote;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(VoteValue::Up),
            -1 => Ok(VoteValue::Down),
            _ => Err(InvalidVote),
        }
    }
}

impl From<VoteValue> for i32 {
    fn from(value: VoteValue) -> Self {
        value.as_i32()
    }
}

impl FromStr for VoteValue {
    type Err = InvalidVote;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        raw.trim()
            .parse::<i32>()
            .map_err(|_| InvalidVote)
            .and_then(VoteValue::try_from)
    }
}

/// Stored vote row. `value` is always +1 or -1 (database check constraint).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Vote {
    pub id: i64,
    pub article_id: i64,
    pub user_id: i64,
    pub value: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vote {
    pub fn direction(&self) -> Option<VoteValue> {
        VoteValue::try_from(self.value).ok()
    }
}

/// Aggregate counts of an article's votes
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct VoteTally {
    pub score: i64,
    pub upvotes: i64,
    pub downvotes: i64,
}

/// What a vote request does to the (user, article) row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteTransition {
    /// No row existed; one is created with the requested value
    Cast(VoteValue),
    /// Same value requested again; the row is deleted
    Withdraw,
    /// Opposite value requested; the row is updated in place
    Switch(VoteValue),
}

impl VoteTransition {
    pub fn resolve(existing: Option<VoteValue>, requested: VoteValue) -> Self {
        match existing {
            None => VoteTransition::Cast(requested),
            Some(current) if current == requested => VoteTransition::Withdraw,
            Some(_) => VoteTransition::Switch(requested),
        }
    }

    /// Vote state after the transition: -1, 0 or 1
    pub fn resulting_state(self) -> i32 {
        match self {
            VoteTransition::Cast(value) | VoteTransition::Switch(value) => value.as_i32(),
            VoteTransition::Withdraw => 0,
        }
    }
}

/// JSON answer to an AJAX vote
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteOutcome {
    pub up: i64,
    pub down: i64,
    pub score: i64,
    pub voto_usuario: i32,
}

impl VoteOutcome {
    pub fn new(tally: VoteTally, state: i32) -> Self {
        Self {
            up: tally.upvotes,
            down: tally.downvotes,
            score: tally.score,
            voto_usuario: state,
        }
    }
}

/// Raw vote form; `valor` is validated by the service
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VoteForm {
    pub valor: Option<String>,
}
