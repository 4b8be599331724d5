//! Arena trainer
//!
//! Trains a Q-learning agent against the classic strategies, evaluates it in
//! a round-robin against all of them, then plays a logged demo match.

mod config;
mod evaluation;
mod training;

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use arena_core::{Action, MatchResult, Participant, QAgent, StateKey};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::config::TrainerConfig;
use crate::evaluation::EvaluationReport;
use crate::training::Episode;

#[derive(Parser, Debug)]
#[command(author, version, about = "Train and evaluate a Q-learner in the Iterated Prisoner's Dilemma")]
struct Cli {
    /// JSON config file; missing fields take their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// RNG seed, overrides the config file
    #[arg(short, long)]
    seed: Option<u64>,

    /// Training episodes, overrides the config file
    #[arg(short, long)]
    episodes: Option<usize>,

    /// Write the full run report as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Repeat for more detail (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Serialize)]
struct RunReport {
    config: TrainerConfig,
    training: Vec<Episode>,
    evaluation: EvaluationReport,
    policy: Vec<(StateKey, Action)>,
    demo: MatchResult,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => TrainerConfig::load(path)?,
        None => TrainerConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if let Some(episodes) = cli.episodes {
        config.training_episodes = episodes;
    }
    let game = config.validate()?;

    let mut rng = match config.seed {
        Some(seed) => {
            log::info!("seed {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    let mut agent = QAgent::new("QLearner (Training)", config.agent)?;
    let training = training::train(&mut agent, &config, &game, &mut rng)?;
    log::info!("training done, {} states learned", agent.table().len());

    agent.set_name("QLearner (Eval)");
    agent.set_epsilon(config.eval_epsilon)?;
    let evaluation = evaluation::evaluate(&mut agent, &config, &game, &mut rng)?;
    for standing in &evaluation.ranking {
        log::info!("{:>20}  {:8.2}", standing.name, standing.mean_score);
    }
    let learner = evaluation
        .ranking
        .iter()
        .position(|s| s.name == agent.name())
        .map_or(0, |p| p + 1);
    log::info!(
        "{} ranked {} of {}",
        agent.name(),
        learner,
        evaluation.ranking.len()
    );

    let policy = agent.table().greedy_policy();
    for (state, action) in &policy {
        log::debug!("policy {:?} -> {}", state, action);
    }

    agent.set_epsilon(config.demo_epsilon)?;
    let demo = evaluation::demo(&mut agent, &config, &game, &mut rng)?;

    if let Some(path) = &cli.output {
        let report = RunReport {
            config,
            training,
            evaluation,
            policy,
            demo,
        };
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &report)
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("report written to {}", path.display());
    }

    Ok(())
}
