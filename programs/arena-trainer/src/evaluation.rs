//! Round-robin evaluation and the demo match

use anyhow::{bail, Result};
use arena_core::{
    run_match, Game, Match, MatchResult, Mode, Participant, QAgent, StrategyKind, TitForTat,
};
use rand::RngCore;
use serde::Serialize;

use crate::config::TrainerConfig;

/// One seat in the evaluation roster
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Contestant {
    Learner,
    Classic(StrategyKind),
}

/// Mean score the row contestant earned against the column contestant
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PairScore {
    pub row: String,
    pub column: String,
    pub mean_score: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Standing {
    pub name: String,
    pub mean_score: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub contestants: Vec<String>,
    pub matches_per_pair: usize,
    pub pairs: Vec<PairScore>,
    /// Highest mean score first
    pub ranking: Vec<Standing>,
}

impl EvaluationReport {
    pub fn mean(&self, row: &str, column: &str) -> Option<f64> {
        self.pairs
            .iter()
            .find(|p| p.row == row && p.column == column)
            .map(|p| p.mean_score)
    }
}

/// The learner followed by one of each classic strategy
pub fn roster() -> Vec<Contestant> {
    std::iter::once(Contestant::Learner)
        .chain(StrategyKind::ALL.iter().copied().map(Contestant::Classic))
        .collect()
}

/// Play every ordered pair of distinct contestants.
///
/// Each pair plays `config.eval_matches_per_pair` matches in evaluation mode,
/// so the learner's table is read but never updated. Classic strategies get a
/// fresh instance per pair.
pub fn evaluate(
    agent: &mut QAgent,
    config: &TrainerConfig,
    game: &Game,
    rng: &mut dyn RngCore,
) -> Result<EvaluationReport> {
    let roster = roster();
    let names: Vec<String> = roster.iter().map(|c| seat_name(*c, agent)).collect();
    let matches = config.eval_matches_per_pair;
    let mut pairs = Vec::with_capacity(roster.len() * (roster.len() - 1));

    log::info!(
        "evaluating {} contestants, {} matches per pair",
        roster.len(),
        matches
    );

    for (i, row) in roster.iter().enumerate() {
        for (j, column) in roster.iter().enumerate() {
            if i == j {
                continue;
            }
            let mut row_seat = instantiate(*row, config)?;
            let mut column_seat = instantiate(*column, config)?;
            let mut total = 0i64;
            for _ in 0..matches {
                let result = match (row_seat.as_deref_mut(), column_seat.as_deref_mut()) {
                    (Some(a), Some(b)) => {
                        run_match(a, b, config.rounds_per_match, game, Mode::Evaluation, rng)?
                    }
                    (None, Some(b)) => {
                        run_match(agent, b, config.rounds_per_match, game, Mode::Evaluation, rng)?
                    }
                    (Some(a), None) => {
                        run_match(a, agent, config.rounds_per_match, game, Mode::Evaluation, rng)?
                    }
                    (None, None) => bail!("the learner cannot be paired with itself"),
                };
                total += result.total_score_a;
            }
            let mean_score = if matches == 0 {
                0.0
            } else {
                total as f64 / matches as f64
            };
            log::debug!("{} vs {}: mean {:.2}", names[i], names[j], mean_score);
            pairs.push(PairScore {
                row: names[i].clone(),
                column: names[j].clone(),
                mean_score,
            });
        }
    }

    let ranking = rank(&names, &pairs);
    Ok(EvaluationReport {
        contestants: names,
        matches_per_pair: matches,
        pairs,
        ranking,
    })
}

/// Mean of each contestant's row scores, best first
fn rank(names: &[String], pairs: &[PairScore]) -> Vec<Standing> {
    let mut ranking: Vec<Standing> = names
        .iter()
        .map(|name| {
            let row: Vec<f64> = pairs
                .iter()
                .filter(|p| &p.row == name)
                .map(|p| p.mean_score)
                .collect();
            let mean_score = if row.is_empty() {
                0.0
            } else {
                row.iter().sum::<f64>() / row.len() as f64
            };
            Standing {
                name: name.clone(),
                mean_score,
            }
        })
        .collect();
    ranking.sort_by(|a, b| b.mean_score.total_cmp(&a.mean_score));
    ranking
}

fn seat_name(contestant: Contestant, agent: &QAgent) -> String {
    match contestant {
        Contestant::Learner => agent.name().to_string(),
        Contestant::Classic(kind) => kind.name().to_string(),
    }
}

/// `None` stands for the shared learner
fn instantiate(
    contestant: Contestant,
    config: &TrainerConfig,
) -> Result<Option<Box<dyn Participant>>> {
    match contestant {
        Contestant::Learner => Ok(None),
        Contestant::Classic(kind) => config.opponent(kind).map(Some),
    }
}

/// One learner-vs-TitForTat match, logged round by round
pub fn demo(
    agent: &mut QAgent,
    config: &TrainerConfig,
    game: &Game,
    rng: &mut dyn RngCore,
) -> Result<MatchResult> {
    let mut opponent = TitForTat;
    let mut stepper = Match::new(
        agent,
        &mut opponent,
        game,
        config.rounds_per_match,
        Mode::Evaluation,
    )?;
    while let Some(round) = stepper.play_round(rng) {
        log::info!(
            "round {:>3}: {} vs {} | {}:{} | total {}:{}",
            round.round + 1,
            round.move_a,
            round.move_b,
            round.score_a,
            round.score_b,
            round.cumulative_a,
            round.cumulative_b
        );
    }
    let result = stepper.finish(rng);
    log::info!(
        "demo result: {} {} - {} {}",
        result.name_a,
        result.total_score_a,
        result.total_score_b,
        result.name_b
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_core::AgentParams;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_config() -> TrainerConfig {
        TrainerConfig {
            rounds_per_match: 10,
            eval_matches_per_pair: 3,
            ..Default::default()
        }
    }

    fn frozen_agent() -> QAgent {
        let params = AgentParams {
            epsilon: 0.0,
            ..Default::default()
        };
        QAgent::new("QLearner (Eval)", params).unwrap()
    }

    #[test]
    fn test_roster_has_learner_and_every_kind() {
        let roster = roster();
        assert_eq!(roster.len(), StrategyKind::ALL.len() + 1);
        assert_eq!(roster[0], Contestant::Learner);
    }

    #[test]
    fn test_evaluate_covers_ordered_pairs() {
        let config = small_config();
        let game = config.validate().unwrap();
        let mut agent = frozen_agent();
        let mut rng = StdRng::seed_from_u64(5);

        let report = evaluate(&mut agent, &config, &game, &mut rng).unwrap();

        let n = report.contestants.len();
        assert_eq!(n, 11);
        assert_eq!(report.pairs.len(), n * (n - 1));
        assert!(report.pairs.iter().all(|p| p.row != p.column));
        assert_eq!(report.ranking.len(), n);
        assert!(report
            .ranking
            .windows(2)
            .all(|w| w[0].mean_score >= w[1].mean_score));
    }

    #[test]
    fn test_evaluate_known_means() {
        let config = small_config();
        let game = config.validate().unwrap();
        let mut agent = frozen_agent();
        let mut rng = StdRng::seed_from_u64(11);

        let report = evaluate(&mut agent, &config, &game, &mut rng).unwrap();

        assert_eq!(report.mean("AlwaysCheat", "AlwaysCooperate"), Some(50.0));
        assert_eq!(report.mean("AlwaysCooperate", "AlwaysCheat"), Some(0.0));
        assert_eq!(report.mean("TitForTat", "AlwaysCooperate"), Some(30.0));
        // Cheats once, then mutual cheating
        assert_eq!(report.mean("AlwaysCheat", "TitForTat"), Some(14.0));
        assert_eq!(report.mean("TitForTat", "TitForTat"), None);
    }

    #[test]
    fn test_evaluate_does_not_train() {
        let config = small_config();
        let game = config.validate().unwrap();
        let mut agent = frozen_agent();
        let mut rng = StdRng::seed_from_u64(2);

        evaluate(&mut agent, &config, &game, &mut rng).unwrap();

        // Visited states are added with zero values, never updated
        for (_, values) in agent.table().iter() {
            assert_eq!(*values, [0.0, 0.0]);
        }
    }

    #[test]
    fn test_rank_orders_by_row_mean() {
        let names = vec!["a".to_string(), "b".to_string()];
        let pairs = vec![
            PairScore {
                row: "a".into(),
                column: "b".into(),
                mean_score: 1.0,
            },
            PairScore {
                row: "b".into(),
                column: "a".into(),
                mean_score: 4.0,
            },
        ];
        let ranking = rank(&names, &pairs);
        assert_eq!(ranking[0].name, "b");
        assert_eq!(ranking[1].mean_score, 1.0);
    }

    #[test]
    fn test_demo_untrained_learner_cooperates() {
        let config = small_config();
        let game = config.validate().unwrap();
        let mut agent = frozen_agent();
        let mut rng = StdRng::seed_from_u64(0);

        let result = demo(&mut agent, &config, &game, &mut rng).unwrap();

        // Zero values tie, ties go to Cooperate
        assert_eq!(result.round_count, 10);
        assert_eq!(result.total_score_a, 30);
        assert_eq!(result.total_score_b, 30);
        assert_eq!(result.name_b, "TitForTat");
    }
}
