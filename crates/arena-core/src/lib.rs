//! Arena core
//!
//! Iterated Prisoner's Dilemma between classic fixed-policy strategies and a
//! tabular Q-learning agent. The learner sees the match through a bounded
//! memory of recent moves and improves its value table online from the
//! rewards it observes.

mod agent;
mod error;
mod game;
mod participant;
mod rules;
mod state;
mod strategy;

pub use agent::{greedy, ActionValues, AgentParams, QAgent, ValueTable};
pub use error::ArenaError;
pub use game::{run_match, Game, Match, MatchPhase, MatchResult, Mode, RoundResult};
pub use participant::{Capabilities, Observation, Participant, Transition, View};
pub use rules::{Action, PayoffTable, Reward, Rules};
pub use state::{History, Slot, StateEncoder, StateKey};
pub use strategy::{
    AdaptiveParams, AdaptiveTitForTat, AlwaysCheat, AlwaysCooperate, GenerousParams,
    GenerousTitForTat, Grudger, Pavlov, RandomStrategy, StrategyKind, TitForTat, TitForTwoTats,
    TwoTitsForTat,
};

/// Payoff under the standard table
/// Returns (score_a, score_b)
pub fn payoff(a: Action, b: Action) -> (Reward, Reward) {
    Rules::default().payoff(a, b)
}
