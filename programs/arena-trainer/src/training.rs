//! Training loop: the learner against a random classic opponent per episode

use anyhow::Result;
use arena_core::{run_match, Game, Mode, Participant, QAgent, StrategyKind};
use rand::{Rng, RngCore};
use serde::Serialize;

use crate::config::TrainerConfig;

/// Outcome of one training episode
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Episode {
    pub opponent: StrategyKind,
    pub score: i64,
    pub opponent_score: i64,
}

/// Train `agent` for `config.training_episodes` matches.
///
/// Each episode draws an opponent kind uniformly and plays a fresh instance
/// of it in training mode, so the learner updates after every round.
pub fn train(
    agent: &mut QAgent,
    config: &TrainerConfig,
    game: &Game,
    rng: &mut dyn RngCore,
) -> Result<Vec<Episode>> {
    let total = config.training_episodes;
    let report_every = (total / 10).max(1);
    let mut episodes = Vec::new();
    let mut running = 0i64;

    log::info!(
        "training {} for {} episodes of {} rounds",
        agent.name(),
        total,
        config.rounds_per_match
    );

    for episode in 0..total {
        let kind = StrategyKind::ALL[rng.gen_range(0..StrategyKind::ALL.len())];
        let mut opponent = config.opponent(kind)?;
        let result = run_match(
            agent,
            opponent.as_mut(),
            config.rounds_per_match,
            game,
            Mode::Training,
            rng,
        )?;
        running += result.total_score_a;
        episodes.push(Episode {
            opponent: kind,
            score: result.total_score_a,
            opponent_score: result.total_score_b,
        });

        let done = episode + 1;
        if done == 1 || done % report_every == 0 {
            log::info!(
                "episode {}/{}: {} vs {} -> {}:{} (mean {:.1}, {} states)",
                done,
                total,
                agent.name(),
                kind.name(),
                result.total_score_a,
                result.total_score_b,
                running as f64 / done as f64,
                agent.table().len()
            );
        }
    }

    Ok(episodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_core::AgentParams;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_config(episodes: usize) -> TrainerConfig {
        TrainerConfig {
            training_episodes: episodes,
            rounds_per_match: 10,
            ..Default::default()
        }
    }

    #[test]
    fn test_train_plays_every_episode() {
        let config = small_config(30);
        let game = config.validate().unwrap();
        let mut agent = QAgent::new("QLearner (Training)", config.agent).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        let episodes = train(&mut agent, &config, &game, &mut rng).unwrap();

        assert_eq!(episodes.len(), 30);
        assert!(!agent.table().is_empty());
        for e in &episodes {
            // 10 rounds, each worth between 0 and 5
            assert!((0..=50).contains(&e.score));
        }
    }

    #[test]
    fn test_zero_episodes_leave_agent_untouched() {
        let config = small_config(0);
        let game = config.validate().unwrap();
        let mut agent = QAgent::new("QLearner", AgentParams::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        assert!(train(&mut agent, &config, &game, &mut rng).unwrap().is_empty());
        assert!(agent.table().is_empty());
    }

    #[test]
    fn test_training_is_reproducible_under_seed() {
        let config = small_config(20);
        let game = config.validate().unwrap();
        let run = || {
            let mut agent = QAgent::new("QLearner", config.agent).unwrap();
            let mut rng = StdRng::seed_from_u64(99);
            let episodes = train(&mut agent, &config, &game, &mut rng).unwrap();
            (episodes, agent.table().greedy_policy())
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_learner_name_is_kept() {
        let config = small_config(1);
        let game = config.validate().unwrap();
        let mut agent = QAgent::new("QLearner (Training)", config.agent).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        train(&mut agent, &config, &game, &mut rng).unwrap();
        assert_eq!(agent.name(), "QLearner (Training)");
    }
}
