//! Trainer configuration

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use arena_core::{
    AdaptiveParams, AdaptiveTitForTat, AgentParams, Game, GenerousParams, GenerousTitForTat,
    Participant, PayoffTable, Rules, StateEncoder, StrategyKind,
};
use serde::{Deserialize, Serialize};

/// Everything a training and evaluation run needs
///
/// Every field has a default, so a config file only lists what it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Matches the learner trains for
    pub training_episodes: usize,
    /// Rounds in every match
    pub rounds_per_match: usize,
    /// Past moves per side the learner's state holds (0 = memoryless)
    pub memory_length: i64,
    /// Matches per ordered pair during evaluation
    pub eval_matches_per_pair: usize,
    /// Learner parameters; `epsilon` is the training exploration rate
    pub agent: AgentParams,
    /// Exploration rate while evaluating
    pub eval_epsilon: f64,
    /// Exploration rate for the demo match
    pub demo_epsilon: f64,
    pub payoffs: PayoffTable,
    pub generous: GenerousParams,
    pub adaptive: AdaptiveParams,
    /// Fixed RNG seed; fresh entropy when absent
    pub seed: Option<u64>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            training_episodes: 2000,
            rounds_per_match: 50,
            memory_length: 1,
            eval_matches_per_pair: 50,
            agent: AgentParams {
                alpha: 0.1,
                gamma: 0.9,
                epsilon: 0.2,
            },
            eval_epsilon: 0.05,
            demo_epsilon: 0.0,
            payoffs: PayoffTable::default(),
            generous: GenerousParams::default(),
            adaptive: AdaptiveParams::default(),
            seed: None,
        }
    }
}

impl TrainerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Check every parameter up front and build the game.
    pub fn validate(&self) -> Result<Game> {
        let rules = Rules::new(self.payoffs)?;
        let encoder = StateEncoder::try_from(self.memory_length)?;
        self.agent.validate()?;
        for epsilon in [self.eval_epsilon, self.demo_epsilon] {
            AgentParams { epsilon, ..self.agent }.validate()?;
        }
        self.generous.validate()?;
        self.adaptive.validate()?;
        Ok(Game::new(rules, encoder))
    }

    /// A fresh opponent of `kind`, using the configured parameters
    pub fn opponent(&self, kind: StrategyKind) -> Result<Box<dyn Participant>> {
        Ok(match kind {
            StrategyKind::GenerousTitForTat => Box::new(GenerousTitForTat::new(self.generous)?),
            StrategyKind::AdaptiveTitForTat => Box::new(AdaptiveTitForTat::new(self.adaptive)?),
            other => other.build(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let game = TrainerConfig::default().validate().unwrap();
        assert_eq!(game.encoder.memory_length(), 1);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: TrainerConfig =
            serde_json::from_str(r#"{ "memory_length": 2, "agent": { "alpha": 0.5 } }"#).unwrap();
        assert_eq!(config.memory_length, 2);
        assert_eq!(config.agent.alpha, 0.5);
        // Nested defaults come from AgentParams, not the trainer
        assert_eq!(config.agent.gamma, 0.9);
        assert_eq!(config.rounds_per_match, 50);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_negative_memory_rejected() {
        let config = TrainerConfig { memory_length: -1, ..Default::default() };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("memory_length"), "{}", err);
    }

    #[test]
    fn test_bad_eval_epsilon_rejected() {
        let config = TrainerConfig { eval_epsilon: 1.5, ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_payoffs_rejected() {
        let payoffs = PayoffTable { temptation: 1, ..Default::default() };
        let config = TrainerConfig { payoffs, ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_opponent_uses_configured_params() {
        let config = TrainerConfig::default();
        for kind in StrategyKind::ALL {
            assert_eq!(config.opponent(kind).unwrap().name(), kind.name());
        }
        let bad = TrainerConfig {
            generous: GenerousParams { forgiveness: 2.0 },
            ..Default::default()
        };
        assert!(bad.opponent(StrategyKind::GenerousTitForTat).is_err());
    }
}
