//! Match execution engine

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::ArenaError;
use crate::participant::{Capabilities, Observation, Participant, Transition, View};
use crate::rules::{Action, Reward, Rules};
use crate::state::{History, StateEncoder, StateKey};

/// Upper bound on rounds reserved up front; longer matches grow as they play.
const RESERVED_ROUNDS: usize = 1024;

/// Result of a single round
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    pub round: usize,
    pub move_a: Action,
    pub move_b: Action,
    pub score_a: Reward,
    pub score_b: Reward,
    pub cumulative_a: i64,
    pub cumulative_b: i64,
}

/// Result of a complete match
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub name_a: String,
    pub name_b: String,
    pub rounds: Vec<RoundResult>,
    pub total_score_a: i64,
    pub total_score_b: i64,
    pub round_count: usize,
}

impl MatchResult {
    /// Per-round rewards of participant A, in round order
    pub fn rewards_a(&self) -> Vec<Reward> {
        self.rounds.iter().map(|r| r.score_a).collect()
    }

    /// Per-round rewards of participant B, in round order
    pub fn rewards_b(&self) -> Vec<Reward> {
        self.rounds.iter().map(|r| r.score_b).collect()
    }

    /// `(score_a, score_b, rewards_a, rewards_b)`
    pub fn scores(&self) -> (i64, i64, Vec<Reward>, Vec<Reward>) {
        (
            self.total_score_a,
            self.total_score_b,
            self.rewards_a(),
            self.rewards_b(),
        )
    }
}

/// Rules plus the memory through which participants see the match
#[derive(Clone, Copy, Debug, Default)]
pub struct Game {
    pub rules: Rules,
    pub encoder: StateEncoder,
}

impl Game {
    pub fn new(rules: Rules, encoder: StateEncoder) -> Self {
        Self { rules, encoder }
    }

    /// Standard payoffs with the given memory length
    pub fn with_memory(memory_length: usize) -> Self {
        Self::new(Rules::default(), StateEncoder::new(memory_length))
    }
}

/// Whether learners update from the rounds they play
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Training,
    Evaluation,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchPhase {
    NotStarted,
    InProgress { completed: usize },
    Finished,
}

/// One match between two participants, played a round at a time
pub struct Match<'p> {
    a: &'p mut dyn Participant,
    b: &'p mut dyn Participant,
    caps_a: Capabilities,
    caps_b: Capabilities,
    game: &'p Game,
    mode: Mode,
    num_rounds: usize,
    phase: MatchPhase,
    history_a: History,
    history_b: History,
    total_a: i64,
    total_b: i64,
    rounds: Vec<RoundResult>,
}

impl<'p> Match<'p> {
    /// Set up a match. Fails if either participant declares a capability set
    /// the engine cannot serve.
    pub fn new(
        a: &'p mut dyn Participant,
        b: &'p mut dyn Participant,
        game: &'p Game,
        num_rounds: usize,
        mode: Mode,
    ) -> Result<Self, ArenaError> {
        let caps_a = checked_capabilities(a)?;
        let caps_b = checked_capabilities(b)?;
        Ok(Self {
            a,
            b,
            caps_a,
            caps_b,
            game,
            mode,
            num_rounds,
            phase: MatchPhase::NotStarted,
            history_a: game.encoder.history(),
            history_b: game.encoder.history(),
            total_a: 0,
            total_b: 0,
            rounds: Vec::with_capacity(num_rounds.min(RESERVED_ROUNDS)),
        })
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn rounds(&self) -> &[RoundResult] {
        &self.rounds
    }

    fn start(&mut self) {
        self.a.reset();
        self.b.reset();
        log::debug!(
            "match {} vs {} ({} rounds, {:?})",
            self.a.name(),
            self.b.name(),
            self.num_rounds,
            self.mode
        );
        self.phase = if self.num_rounds == 0 {
            MatchPhase::Finished
        } else {
            MatchPhase::InProgress { completed: 0 }
        };
    }

    /// Play the next round. Returns `None` once all rounds are played.
    pub fn play_round(&mut self, rng: &mut dyn RngCore) -> Option<&RoundResult> {
        if self.phase == MatchPhase::NotStarted {
            self.start();
        }
        if self.phase == MatchPhase::Finished {
            return None;
        }

        let game = self.game;
        let encoder = &game.encoder;
        let state_a = encoder.encode(&self.history_a, &self.history_b);
        let state_b = encoder.encode(&self.history_b, &self.history_a);

        let move_a = self.a.decide(
            &observe(self.caps_a.view, &state_a, &self.history_a, &self.history_b),
            rng,
        );
        let move_b = self.b.decide(
            &observe(self.caps_b.view, &state_b, &self.history_b, &self.history_a),
            rng,
        );

        let (score_a, score_b) = game.rules.payoff(move_a, move_b);
        self.total_a += i64::from(score_a);
        self.total_b += i64::from(score_b);

        let round = self.rounds.len();
        self.rounds.push(RoundResult {
            round,
            move_a,
            move_b,
            score_a,
            score_b,
            cumulative_a: self.total_a,
            cumulative_b: self.total_b,
        });

        self.history_a.push(move_a);
        self.history_b.push(move_b);

        if self.mode == Mode::Training {
            if self.caps_a.learns {
                let next_a = encoder.encode(&self.history_a, &self.history_b);
                self.a.learn(&Transition {
                    state: &state_a,
                    action: move_a,
                    reward: score_a,
                    next_state: &next_a,
                });
            }
            if self.caps_b.learns {
                let next_b = encoder.encode(&self.history_b, &self.history_a);
                self.b.learn(&Transition {
                    state: &state_b,
                    action: move_b,
                    reward: score_b,
                    next_state: &next_b,
                });
            }
        }

        if self.caps_a.round_feedback {
            self.a.on_round_complete(move_a, move_b);
        }
        if self.caps_b.round_feedback {
            self.b.on_round_complete(move_b, move_a);
        }

        log::trace!(
            "round {}: {} {} ({}) | {} {} ({}) | totals {}={}, {}={}",
            round + 1,
            self.a.name(),
            move_a,
            score_a,
            self.b.name(),
            move_b,
            score_b,
            self.a.name(),
            self.total_a,
            self.b.name(),
            self.total_b
        );

        let completed = self.rounds.len();
        self.phase = if completed == self.num_rounds {
            MatchPhase::Finished
        } else {
            MatchPhase::InProgress { completed }
        };
        self.rounds.last()
    }

    /// Play any remaining rounds and return the result.
    pub fn finish(mut self, rng: &mut dyn RngCore) -> MatchResult {
        while self.play_round(rng).is_some() {}
        log::debug!(
            "match end: {}={}, {}={}",
            self.a.name(),
            self.total_a,
            self.b.name(),
            self.total_b
        );
        MatchResult {
            name_a: self.a.name().to_string(),
            name_b: self.b.name().to_string(),
            round_count: self.rounds.len(),
            rounds: self.rounds,
            total_score_a: self.total_a,
            total_score_b: self.total_b,
        }
    }
}

fn checked_capabilities(p: &dyn Participant) -> Result<Capabilities, ArenaError> {
    let caps = p.capabilities();
    if caps.is_consistent() {
        Ok(caps)
    } else {
        Err(ArenaError::UnsupportedParticipant {
            name: p.name().to_string(),
        })
    }
}

fn observe<'a>(
    view: View,
    state: &'a StateKey,
    own: &'a History,
    opponent: &'a History,
) -> Observation<'a> {
    match view {
        View::Encoded => Observation::Encoded(state),
        View::Histories => Observation::Histories { own, opponent },
    }
}

/// Run a complete match between two participants
///
/// # Arguments
/// * `a` - First participant
/// * `b` - Second participant
/// * `num_rounds` - Exact number of rounds to play
/// * `game` - Payoff rules and memory length
/// * `mode` - `Training` lets learners update after every round
/// * `rng` - Source of every random choice made in the match
///
/// # Returns
/// Complete match result with round-by-round details
pub fn run_match(
    a: &mut dyn Participant,
    b: &mut dyn Participant,
    num_rounds: usize,
    game: &Game,
    mode: Mode,
    rng: &mut dyn RngCore,
) -> Result<MatchResult, ArenaError> {
    Ok(Match::new(a, b, game, num_rounds, mode)?.finish(rng))
}
