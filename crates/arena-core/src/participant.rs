//! The interface every match participant implements
//!
//! Participants declare what they need from the match engine through
//! [`Capabilities`] instead of being told apart by concrete type. The engine
//! reads the declaration once per match and then calls every participant the
//! same way.

use rand::RngCore;

use crate::rules::{Action, Reward};
use crate::state::{History, StateKey};

/// What a participant is shown when it decides
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    /// The encoded state key from this participant's side
    Encoded,
    /// Raw bounded histories of both sides
    Histories,
}

/// Declared needs of a participant
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    pub view: View,
    /// Receives a [`Transition`] after every training round
    pub learns: bool,
    /// Receives [`Participant::on_round_complete`] after every round
    pub round_feedback: bool,
}

impl Capabilities {
    /// A fixed policy reading histories only
    pub const REACTIVE: Self = Self {
        view: View::Histories,
        learns: false,
        round_feedback: false,
    };

    /// A fixed policy that also tracks round outcomes
    pub const REACTIVE_WITH_FEEDBACK: Self = Self {
        view: View::Histories,
        learns: false,
        round_feedback: true,
    };

    /// A learner deciding from state keys
    pub const LEARNER: Self = Self {
        view: View::Encoded,
        learns: true,
        round_feedback: false,
    };

    /// Transitions are expressed in state keys, so only participants shown
    /// state keys can learn from them.
    pub fn is_consistent(&self) -> bool {
        !self.learns || self.view == View::Encoded
    }
}

/// Input to [`Participant::decide`], shaped by the declared [`View`]
#[derive(Clone, Copy, Debug)]
pub enum Observation<'a> {
    Encoded(&'a StateKey),
    Histories {
        own: &'a History,
        opponent: &'a History,
    },
}

impl<'a> Observation<'a> {
    pub fn opponent(&self) -> Option<&'a History> {
        match *self {
            Observation::Histories { opponent, .. } => Some(opponent),
            Observation::Encoded(_) => None,
        }
    }

    pub fn state(&self) -> Option<&'a StateKey> {
        match *self {
            Observation::Encoded(state) => Some(state),
            Observation::Histories { .. } => None,
        }
    }
}

/// One observed step, from the learner's side
#[derive(Clone, Copy, Debug)]
pub struct Transition<'a> {
    pub state: &'a StateKey,
    pub action: Action,
    pub reward: Reward,
    pub next_state: &'a StateKey,
}

/// Anything that can sit at the table for a match
pub trait Participant {
    fn name(&self) -> &str;

    fn capabilities(&self) -> Capabilities;

    /// Choose this round's action.
    ///
    /// Any randomness must come from `rng` so matches replay under a seed.
    fn decide(&mut self, observation: &Observation<'_>, rng: &mut dyn RngCore) -> Action;

    /// Called in training matches when `capabilities().learns` is set.
    fn learn(&mut self, _transition: &Transition<'_>) {}

    /// Called after both histories are updated when
    /// `capabilities().round_feedback` is set.
    fn on_round_complete(&mut self, _own: Action, _opponent: Action) {}

    /// Clear per-match state. Durable learned state survives.
    fn reset(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_capabilities_are_consistent() {
        assert!(Capabilities::REACTIVE.is_consistent());
        assert!(Capabilities::REACTIVE_WITH_FEEDBACK.is_consistent());
        assert!(Capabilities::LEARNER.is_consistent());
    }

    #[test]
    fn test_learning_from_histories_is_inconsistent() {
        let caps = Capabilities { learns: true, ..Capabilities::REACTIVE };
        assert!(!caps.is_consistent());
    }

    #[test]
    fn test_observation_accessors() {
        let own = History::new(1);
        let opponent = History::new(1);
        let obs = Observation::Histories { own: &own, opponent: &opponent };
        assert!(obs.opponent().is_some());
        assert!(obs.state().is_none());

        let key = StateKey { own: vec![], other: vec![] };
        let obs = Observation::Encoded(&key);
        assert!(obs.opponent().is_none());
        assert_eq!(obs.state(), Some(&key));
    }
}
