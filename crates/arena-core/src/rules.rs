//! Actions and payoff rules

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ArenaError;

/// Per-round reward
pub type Reward = i32;

/// A move in the Prisoner's Dilemma
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Action {
    Cooperate,
    Cheat,
}

impl Action {
    /// The legal action set, in index order.
    pub const ALL: [Action; 2] = [Action::Cooperate, Action::Cheat];

    /// Position of this action in value vectors.
    pub fn index(self) -> usize {
        match self {
            Action::Cooperate => 0,
            Action::Cheat => 1,
        }
    }

    /// The other action.
    pub fn flip(self) -> Self {
        match self {
            Action::Cooperate => Action::Cheat,
            Action::Cheat => Action::Cooperate,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Cooperate => write!(f, "Cooperate"),
            Action::Cheat => write!(f, "Cheat"),
        }
    }
}

impl TryFrom<u8> for Action {
    type Error = ArenaError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Action::Cooperate),
            1 => Ok(Action::Cheat),
            other => Err(ArenaError::InvalidAction(other.to_string())),
        }
    }
}

impl FromStr for Action {
    type Err = ArenaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "c" | "cooperate" => Ok(Action::Cooperate),
            "d" | "cheat" | "defect" => Ok(Action::Cheat),
            _ => Err(ArenaError::InvalidAction(s.to_string())),
        }
    }
}

/// The four payoffs of a symmetric Prisoner's Dilemma
///
/// Valid tables satisfy `T > R > P > S` and `2R > T + S`, so mutual
/// cooperation is collectively optimal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayoffTable {
    /// T: cheating against a cooperator
    pub temptation: Reward,
    /// R: mutual cooperation
    pub reward: Reward,
    /// P: mutual cheating
    pub punishment: Reward,
    /// S: cooperating against a cheater
    pub sucker: Reward,
}

impl Default for PayoffTable {
    fn default() -> Self {
        Self {
            temptation: 5,
            reward: 3,
            punishment: 1,
            sucker: 0,
        }
    }
}

impl PayoffTable {
    pub fn validate(&self) -> Result<(), ArenaError> {
        let Self { temptation: t, reward: r, punishment: p, sucker: s } = *self;
        if !(t > r && r > p && p > s) {
            return Err(ArenaError::config(
                "payoffs",
                format!("expected T > R > P > S, got T={} R={} P={} S={}", t, r, p, s),
            ));
        }
        let (double_reward, alternation) = (2 * i64::from(r), i64::from(t) + i64::from(s));
        if double_reward <= alternation {
            return Err(ArenaError::config(
                "payoffs",
                format!("expected 2R > T + S, got 2R={} T+S={}", double_reward, alternation),
            ));
        }
        Ok(())
    }
}

/// Game rules: a validated, immutable payoff table
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rules {
    table: PayoffTable,
}

impl Rules {
    /// Build rules from a custom table, rejecting tables that break the
    /// dilemma ordering.
    pub fn new(table: PayoffTable) -> Result<Self, ArenaError> {
        table.validate()?;
        Ok(Self { table })
    }

    pub fn table(&self) -> &PayoffTable {
        &self.table
    }

    /// Returns `(reward_self, reward_other)`
    pub fn payoff(&self, own: Action, other: Action) -> (Reward, Reward) {
        let t = &self.table;
        match (own, other) {
            (Action::Cooperate, Action::Cooperate) => (t.reward, t.reward),
            (Action::Cooperate, Action::Cheat) => (t.sucker, t.temptation),
            (Action::Cheat, Action::Cooperate) => (t.temptation, t.sucker),
            (Action::Cheat, Action::Cheat) => (t.punishment, t.punishment),
        }
    }
}
