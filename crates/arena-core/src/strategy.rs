//! Classic fixed-policy strategies
//!
//! Every strategy opens a match by cooperating. Strategies only see the
//! bounded histories the engine keeps, so a strategy that looks further back
//! than the configured memory sees less than it asks for.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::error::{check_step, check_unit, ArenaError};
use crate::participant::{Capabilities, Observation, Participant};
use crate::rules::Action;

/// Every classic strategy the arena knows how to build
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    /// Always cooperate, never cheat.
    AlwaysCooperate,
    /// Always cheat, never cooperate.
    AlwaysCheat,
    /// Copy opponent's last move. Start with cooperate.
    TitForTat,
    /// Cheat only if opponent cheated twice in a row.
    TitForTwoTats,
    /// Answer a cheat with two cheats.
    TwoTitsForTat,
    /// Cooperate until opponent cheats once, then always cheat.
    Grudger,
    /// Win-stay, lose-shift on the last pair of moves.
    Pavlov,
    /// Random choice each round.
    Random,
    /// Tit-for-Tat that sometimes forgives a cheat.
    GenerousTitForTat,
    /// Tit-for-Tat whose forgiveness tracks the opponent's cooperation.
    AdaptiveTitForTat,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 10] = [
        StrategyKind::AlwaysCooperate,
        StrategyKind::AlwaysCheat,
        StrategyKind::TitForTat,
        StrategyKind::TitForTwoTats,
        StrategyKind::TwoTitsForTat,
        StrategyKind::Grudger,
        StrategyKind::Pavlov,
        StrategyKind::Random,
        StrategyKind::GenerousTitForTat,
        StrategyKind::AdaptiveTitForTat,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StrategyKind::AlwaysCooperate => "AlwaysCooperate",
            StrategyKind::AlwaysCheat => "AlwaysCheat",
            StrategyKind::TitForTat => "TitForTat",
            StrategyKind::TitForTwoTats => "TitForTwoTats",
            StrategyKind::TwoTitsForTat => "TwoTitsForTat",
            StrategyKind::Grudger => "Grudger",
            StrategyKind::Pavlov => "Pavlov",
            StrategyKind::Random => "Random",
            StrategyKind::GenerousTitForTat => "GenerousTitForTat",
            StrategyKind::AdaptiveTitForTat => "AdaptiveTitForTat",
        }
    }

    /// Human-readable description of the rule
    pub fn describe(self) -> &'static str {
        match self {
            StrategyKind::AlwaysCooperate => "Never cheats. Always cooperates.",
            StrategyKind::AlwaysCheat => "Never cooperates. Always cheats.",
            StrategyKind::TitForTat => "Copies opponent's last move. Starts by cooperating.",
            StrategyKind::TitForTwoTats => "Only retaliates after two consecutive cheats.",
            StrategyKind::TwoTitsForTat => "Retaliates twice for every cheat.",
            StrategyKind::Grudger => "Cooperates until betrayed, then always cheats.",
            StrategyKind::Pavlov => "Cooperates after matching moves, switches after mismatched ones.",
            StrategyKind::Random => "Randomly cooperates or cheats each round.",
            StrategyKind::GenerousTitForTat => "Like Tit for Tat, but sometimes forgives a cheat.",
            StrategyKind::AdaptiveTitForTat => {
                "Like Tit for Tat, forgiving more the more its opponent cooperates."
            }
        }
    }

    /// Build a fresh instance with default parameters
    pub fn build(self) -> Box<dyn Participant> {
        match self {
            StrategyKind::AlwaysCooperate => Box::new(AlwaysCooperate),
            StrategyKind::AlwaysCheat => Box::new(AlwaysCheat),
            StrategyKind::TitForTat => Box::new(TitForTat),
            StrategyKind::TitForTwoTats => Box::new(TitForTwoTats),
            StrategyKind::TwoTitsForTat => Box::new(TwoTitsForTat::default()),
            StrategyKind::Grudger => Box::new(Grudger::default()),
            StrategyKind::Pavlov => Box::new(Pavlov::default()),
            StrategyKind::Random => Box::new(RandomStrategy),
            StrategyKind::GenerousTitForTat => Box::new(GenerousTitForTat::default()),
            StrategyKind::AdaptiveTitForTat => Box::new(AdaptiveTitForTat::default()),
        }
    }
}

/// Forgiveness setting for [`GenerousTitForTat`]
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerousParams {
    /// Chance to cooperate after the opponent cheats
    pub forgiveness: f64,
}

impl Default for GenerousParams {
    fn default() -> Self {
        Self { forgiveness: 0.1 }
    }
}

impl GenerousParams {
    pub fn validate(&self) -> Result<(), ArenaError> {
        check_unit("forgiveness", self.forgiveness)
    }
}

/// Settings for [`AdaptiveTitForTat`]
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveParams {
    /// Forgiveness at the start of every match
    pub initial_forgiveness: f64,
    /// Step applied to forgiveness after each round
    pub learning_rate: f64,
}

impl Default for AdaptiveParams {
    fn default() -> Self {
        Self {
            initial_forgiveness: 0.0,
            learning_rate: 0.05,
        }
    }
}

impl AdaptiveParams {
    pub fn validate(&self) -> Result<(), ArenaError> {
        check_unit("initial_forgiveness", self.initial_forgiveness)?;
        check_step("adaptive_learning_rate", self.learning_rate)
    }
}

/// Tit-for-Tat response to a cheat, forgiven with probability `forgiveness`
fn reply_to_cheat(forgiveness: f64, rng: &mut dyn RngCore) -> Action {
    if rng.gen::<f64>() < forgiveness {
        Action::Cooperate
    } else {
        Action::Cheat
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysCooperate;

impl Participant for AlwaysCooperate {
    fn name(&self) -> &str {
        StrategyKind::AlwaysCooperate.name()
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::REACTIVE
    }

    fn decide(&mut self, _: &Observation<'_>, _: &mut dyn RngCore) -> Action {
        Action::Cooperate
    }

    fn reset(&mut self) {}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysCheat;

impl Participant for AlwaysCheat {
    fn name(&self) -> &str {
        StrategyKind::AlwaysCheat.name()
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::REACTIVE
    }

    fn decide(&mut self, _: &Observation<'_>, _: &mut dyn RngCore) -> Action {
        Action::Cheat
    }

    fn reset(&mut self) {}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TitForTat;

impl Participant for TitForTat {
    fn name(&self) -> &str {
        StrategyKind::TitForTat.name()
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::REACTIVE
    }

    fn decide(&mut self, observation: &Observation<'_>, _: &mut dyn RngCore) -> Action {
        observation
            .opponent()
            .and_then(|h| h.last())
            .unwrap_or(Action::Cooperate)
    }

    fn reset(&mut self) {}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TitForTwoTats;

impl Participant for TitForTwoTats {
    fn name(&self) -> &str {
        StrategyKind::TitForTwoTats.name()
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::REACTIVE
    }

    fn decide(&mut self, observation: &Observation<'_>, _: &mut dyn RngCore) -> Action {
        let Some(opponent) = observation.opponent() else {
            return Action::Cooperate;
        };
        match (opponent.nth_last(1), opponent.last()) {
            (Some(Action::Cheat), Some(Action::Cheat)) => Action::Cheat,
            _ => Action::Cooperate,
        }
    }

    fn reset(&mut self) {}
}

/// Cheats on the round after an opponent cheat and once more after that.
#[derive(Clone, Copy, Debug, Default)]
pub struct TwoTitsForTat {
    /// Forced cheats still owed after the current one
    punish_remaining: u8,
}

impl Participant for TwoTitsForTat {
    fn name(&self) -> &str {
        StrategyKind::TwoTitsForTat.name()
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::REACTIVE
    }

    fn decide(&mut self, observation: &Observation<'_>, _: &mut dyn RngCore) -> Action {
        if self.punish_remaining > 0 {
            self.punish_remaining -= 1;
            return Action::Cheat;
        }
        match observation.opponent().and_then(|h| h.last()) {
            Some(Action::Cheat) => {
                self.punish_remaining = 1;
                Action::Cheat
            }
            _ => Action::Cooperate,
        }
    }

    fn reset(&mut self) {
        self.punish_remaining = 0;
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Grudger {
    grudge: bool,
}

impl Participant for Grudger {
    fn name(&self) -> &str {
        StrategyKind::Grudger.name()
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::REACTIVE
    }

    fn decide(&mut self, observation: &Observation<'_>, _: &mut dyn RngCore) -> Action {
        if !self.grudge {
            self.grudge = observation
                .opponent()
                .is_some_and(|h| h.contains(Action::Cheat));
        }
        if self.grudge {
            Action::Cheat
        } else {
            Action::Cooperate
        }
    }

    fn reset(&mut self) {
        self.grudge = false;
    }
}

/// Win-stay, lose-shift
///
/// Learns the previous round's moves through round feedback rather than
/// history, so it behaves the same at any memory length.
#[derive(Clone, Copy, Debug, Default)]
pub struct Pavlov {
    /// (own, opponent) moves of the previous round
    last: Option<(Action, Action)>,
}

impl Participant for Pavlov {
    fn name(&self) -> &str {
        StrategyKind::Pavlov.name()
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::REACTIVE_WITH_FEEDBACK
    }

    fn decide(&mut self, _: &Observation<'_>, _: &mut dyn RngCore) -> Action {
        match self.last {
            None => Action::Cooperate,
            Some((own, opponent)) if own == opponent => Action::Cooperate,
            Some((own, _)) => own.flip(),
        }
    }

    fn on_round_complete(&mut self, own: Action, opponent: Action) {
        self.last = Some((own, opponent));
    }

    fn reset(&mut self) {
        self.last = None;
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RandomStrategy;

impl Participant for RandomStrategy {
    fn name(&self) -> &str {
        StrategyKind::Random.name()
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::REACTIVE
    }

    fn decide(&mut self, _: &Observation<'_>, rng: &mut dyn RngCore) -> Action {
        Action::ALL[rng.gen_range(0..Action::ALL.len())]
    }

    fn reset(&mut self) {}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct GenerousTitForTat {
    params: GenerousParams,
}

impl GenerousTitForTat {
    pub fn new(params: GenerousParams) -> Result<Self, ArenaError> {
        params.validate()?;
        Ok(Self { params })
    }
}

impl Participant for GenerousTitForTat {
    fn name(&self) -> &str {
        StrategyKind::GenerousTitForTat.name()
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::REACTIVE
    }

    fn decide(&mut self, observation: &Observation<'_>, rng: &mut dyn RngCore) -> Action {
        match observation.opponent().and_then(|h| h.last()) {
            Some(Action::Cheat) => reply_to_cheat(self.params.forgiveness, rng),
            _ => Action::Cooperate,
        }
    }

    fn reset(&mut self) {}
}

/// Tit-for-Tat with forgiveness nudged by every round's outcome
#[derive(Clone, Copy, Debug)]
pub struct AdaptiveTitForTat {
    params: AdaptiveParams,
    forgiveness: f64,
}

impl Default for AdaptiveTitForTat {
    fn default() -> Self {
        let params = AdaptiveParams::default();
        Self {
            params,
            forgiveness: params.initial_forgiveness,
        }
    }
}

impl AdaptiveTitForTat {
    pub fn new(params: AdaptiveParams) -> Result<Self, ArenaError> {
        params.validate()?;
        Ok(Self {
            params,
            forgiveness: params.initial_forgiveness,
        })
    }

    pub fn forgiveness(&self) -> f64 {
        self.forgiveness
    }
}

impl Participant for AdaptiveTitForTat {
    fn name(&self) -> &str {
        StrategyKind::AdaptiveTitForTat.name()
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::REACTIVE_WITH_FEEDBACK
    }

    fn decide(&mut self, observation: &Observation<'_>, rng: &mut dyn RngCore) -> Action {
        match observation.opponent().and_then(|h| h.last()) {
            Some(Action::Cheat) => reply_to_cheat(self.forgiveness, rng),
            _ => Action::Cooperate,
        }
    }

    fn on_round_complete(&mut self, _own: Action, opponent: Action) {
        let step = self.params.learning_rate;
        self.forgiveness = match opponent {
            Action::Cooperate => (self.forgiveness + step).min(1.0),
            Action::Cheat => (self.forgiveness - step).max(0.0),
        };
    }

    fn reset(&mut self) {
        self.forgiveness = self.params.initial_forgiveness;
    }
}
