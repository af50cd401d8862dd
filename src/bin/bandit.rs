use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use egreedy_rl::experiment::{ExperimentConfig, ExperimentResults, ExperimentRunner, RunTrace};
use egreedy_rl::plot::plot_results;
use egreedy_rl::Result;
use kdam::tqdm;
use structopt::StructOpt;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Run epsilon-greedy experiments on the n-armed bandit testbed and plot the averaged results
#[derive(StructOpt, Debug)]
#[structopt(name = "egreedy - bandit")]
struct Cli {
    /// Exploration rate; repeat the flag to compare several rates
    #[structopt(long = "epsilon", short = "e", default_value = "0.1", number_of_values = 1)]
    epsilon: Vec<f64>,

    /// Number of arms on the bandit
    #[structopt(long = "num_arms", default_value = "10")]
    num_arms: usize,

    /// Number of times each experiment is repeated
    #[structopt(long = "runs", default_value = "100")]
    runs: usize,

    /// Number of plays within each run
    #[structopt(long = "plays", default_value = "1000")]
    plays: usize,

    /// Seed for the random number generators
    #[structopt(long = "seed", default_value = "42")]
    seed: u64,

    /// Write the two curves to this PNG file
    #[structopt(long = "plot", parse(from_os_str))]
    plot: Option<PathBuf>,

    /// Write the averaged metrics as JSON to this file
    #[structopt(long = "output", parse(from_os_str))]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "egreedy_rl=info,bandit=info".into()),
        )
        .init();

    let cli: Cli = Cli::from_args();
    let mut all_results: Vec<ExperimentResults> = vec![];

    for (i, epsilon) in cli.epsilon.iter().enumerate() {
        let config: ExperimentConfig = ExperimentConfig {
            epsilon: *epsilon,
            num_arms: cli.num_arms,
            runs: cli.runs,
            plays: cli.plays,
            seed: cli.seed.wrapping_add(i as u64),
        };
        let mut runner: ExperimentRunner = ExperimentRunner::new(config)?;

        info!(epsilon, runs = config.runs, plays = config.plays, "running experiment");
        let now: Instant = Instant::now();
        let mut traces: Vec<RunTrace> = Vec::with_capacity(config.runs);
        for _run in tqdm!(0..config.runs) {
            traces.push(runner.run_once()?);
        }
        let results: ExperimentResults = ExperimentResults::from_traces(config, &traces)?;
        info!(
            epsilon,
            elapsed = ?now.elapsed(),
            average_reward = results.final_average_reward(),
            percent_optimal = results.final_percent_optimal(),
            "experiment done"
        );
        all_results.push(results);
    }

    if let Some(path) = &cli.output {
        fs::write(path, serde_json::to_string_pretty(&all_results)?)?;
        info!(path = %path.display(), "results written");
    }
    if let Some(path) = &cli.plot {
        plot_results(&all_results, path)?;
        info!(path = %path.display(), "plot written");
    }
    Ok(())
}
