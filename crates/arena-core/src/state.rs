//! Bounded match history and the state keys derived from it
//!
//! A learner never sees the whole match. It sees the last `memory_length`
//! actions of each side, left-padded with [`Slot::Start`] while the match is
//! younger than its memory.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::ArenaError;
use crate::rules::Action;

/// Recent actions of one participant within one match
///
/// Holds at most `capacity` actions; pushing beyond that drops the oldest.
/// A zero-capacity history stays empty.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct History {
    moves: VecDeque<Action>,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            moves: VecDeque::new(),
            capacity,
        }
    }

    pub fn push(&mut self, action: Action) {
        if self.capacity == 0 {
            return;
        }
        if self.moves.len() == self.capacity {
            self.moves.pop_front();
        }
        self.moves.push_back(action);
    }

    pub fn last(&self) -> Option<Action> {
        self.moves.back().copied()
    }

    /// The `n`-th most recent action, where `nth_last(0)` is the last one.
    pub fn nth_last(&self, n: usize) -> Option<Action> {
        self.moves
            .len()
            .checked_sub(n + 1)
            .and_then(|i| self.moves.get(i).copied())
    }

    pub fn contains(&self, action: Action) -> bool {
        self.moves.contains(&action)
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = Action> + '_ {
        self.moves.iter().copied()
    }
}

/// One position of a state key
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Slot {
    /// Padding for rounds before the match began
    Start,
    Played(Action),
}

/// Fixed-width view of both participants' recent actions
///
/// `own` and `other` always hold exactly `memory_length` slots, oldest first.
/// Keys compare structurally, so identical recent play in different matches
/// maps to the same learned values.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateKey {
    pub own: Vec<Slot>,
    pub other: Vec<Slot>,
}

impl StateKey {
    pub fn memory_length(&self) -> usize {
        self.own.len()
    }
}

/// Encodes histories into state keys of a fixed memory length
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateEncoder {
    memory_length: usize,
}

impl Default for StateEncoder {
    fn default() -> Self {
        Self::new(1)
    }
}

impl StateEncoder {
    pub fn new(memory_length: usize) -> Self {
        Self { memory_length }
    }

    pub fn memory_length(&self) -> usize {
        self.memory_length
    }

    /// A fresh history sized to this encoder's memory
    pub fn history(&self) -> History {
        History::new(self.memory_length)
    }

    /// Build the key seen from `own`'s side of the table.
    pub fn encode(&self, own: &History, other: &History) -> StateKey {
        StateKey {
            own: self.window(own),
            other: self.window(other),
        }
    }

    fn window(&self, history: &History) -> Vec<Slot> {
        let m = self.memory_length;
        let kept = history.len().min(m);
        let mut slots = Vec::with_capacity(m);
        slots.resize(m - kept, Slot::Start);
        slots.extend(history.iter().skip(history.len() - kept).map(Slot::Played));
        slots
    }
}

impl TryFrom<i64> for StateEncoder {
    type Error = ArenaError;

    fn try_from(memory_length: i64) -> Result<Self, Self::Error> {
        usize::try_from(memory_length)
            .map(Self::new)
            .map_err(|_| ArenaError::config("memory_length", format!("{} is negative", memory_length)))
    }
}
