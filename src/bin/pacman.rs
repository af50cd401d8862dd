use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;

use egreedy_rl::agent::{Agent, BanditAgent, QLearnAgent, QLearnConfig};
use egreedy_rl::env::{Env, GameState, GridGame, GridState, Layout};
use egreedy_rl::trainer::{average_score, play_episode, win_rate, EpisodeOutcome};
use egreedy_rl::utils::moving_average;
use egreedy_rl::Result;
use kdam::tqdm;
use structopt::StructOpt;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy)]
enum AgentKind {
    QLearn,
    Bandit,
}

impl FromStr for AgentKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "qlearn" => Ok(AgentKind::QLearn),
            "bandit" => Ok(AgentKind::Bandit),
            other => Err(format!("unknown agent '{other}', expected qlearn or bandit")),
        }
    }
}

/// Train a learning agent on a small Pacman-style grid and report how it plays afterwards
#[derive(StructOpt, Debug)]
#[structopt(name = "egreedy - pacman")]
struct Cli {
    /// Agent to run: qlearn or bandit
    #[structopt(long = "agent", default_value = "qlearn")]
    agent: AgentKind,

    /// Total number of games, training included
    #[structopt(long = "num_games", short = "n", default_value = "2010")]
    num_games: u64,

    /// Number of training games
    #[structopt(long = "num_training", short = "x", default_value = "2000")]
    num_training: u64,

    /// Learning rate of the Q-learning agent
    #[structopt(long = "alpha", default_value = "0.2")]
    alpha: f64,

    /// Initial exploration rate; the bandit agent keeps it fixed.
    /// Defaults to 0.05 for qlearn and 0.5 for bandit
    #[structopt(long = "epsilon")]
    epsilon: Option<f64>,

    /// Discount factor of the Q-learning agent
    #[structopt(long = "gamma", default_value = "0.8")]
    gamma: f64,

    /// Keep epsilon fixed during training instead of decaying it
    #[structopt(long = "constant_epsilon")]
    constant_epsilon: bool,

    /// Maximum number of moves per game
    #[structopt(long = "max_steps", default_value = "1000")]
    max_steps: u64,

    /// Seed for the agent and the ghosts
    #[structopt(long = "seed", default_value = "42")]
    seed: u64,

    /// Layout file, defaults to the built-in small grid
    #[structopt(long = "layout", parse(from_os_str))]
    layout: Option<PathBuf>,

    /// Show one game, move by move, after training
    #[structopt(long = "show_example")]
    show_example: bool,
}

impl Cli {
    fn epsilon(&self) -> f64 {
        self.epsilon.unwrap_or(match self.agent {
            AgentKind::QLearn => QLearnConfig::default().epsilon,
            AgentKind::Bandit => BanditAgent::DEFAULT_EPSILON,
        })
    }
}

fn build_agent(cli: &Cli) -> Result<Box<dyn Agent<GridState>>> {
    Ok(match cli.agent {
        AgentKind::QLearn => Box::new(QLearnAgent::new(QLearnConfig {
            alpha: cli.alpha,
            epsilon: cli.epsilon(),
            gamma: cli.gamma,
            num_training: cli.num_training,
            constant_epsilon: cli.constant_epsilon,
            seed: cli.seed,
            ..QLearnConfig::default()
        })?),
        AgentKind::Bandit => Box::new(BanditAgent::new(cli.epsilon(), cli.seed)?),
    })
}

fn example(game: &mut GridGame, agent: &mut dyn Agent<GridState>, max_steps: u64) -> Result<()> {
    let mut state: GridState = game.reset();
    let mut steps: u64 = 0;
    while !state.is_terminal() && steps < max_steps {
        println!("{}", game.render());
        let action = agent.get_action(&state)?;
        println!("action {}", action);
        state = game.step(action)?;
        steps += 1;
    }
    println!("{}", game.render());
    println!("episode score {:?}", state.score());
    println!("terminated with {:?} steps", steps);
    if steps > 0 {
        agent.final_update(&state)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "egreedy_rl=info,pacman=info".into()),
        )
        .init();

    let cli: Cli = Cli::from_args();
    let layout: Layout = match &cli.layout {
        Some(path) => fs::read_to_string(path)?.parse()?,
        None => Layout::small_grid()?,
    };
    let mut game: GridGame = GridGame::new(layout, cli.seed);
    let mut agent: Box<dyn Agent<GridState>> = build_agent(&cli)?;

    info!(agent = ?cli.agent, games = cli.num_games, training = cli.num_training, "playing");
    let now: Instant = Instant::now();
    let mut outcomes: Vec<EpisodeOutcome> = Vec::with_capacity(cli.num_games as usize);
    for _game in tqdm!(0..cli.num_games) {
        outcomes.push(play_episode::<GridState>(&mut game, agent.as_mut(), cli.max_steps)?);
    }
    info!(elapsed = ?now.elapsed(), "games done");

    let split: usize = (cli.num_training as usize).min(outcomes.len());
    let (training, evaluation) = outcomes.split_at(split);
    info!(
        games = training.len(),
        win_rate = win_rate(training),
        average_score = average_score(training),
        "training games"
    );
    info!(
        games = evaluation.len(),
        win_rate = win_rate(evaluation),
        average_score = average_score(evaluation),
        "evaluation games"
    );

    let scores: Vec<f64> = outcomes.iter().map(|o| o.score).collect();
    for (i, average) in moving_average(100, &scores).iter().enumerate() {
        info!(from_game = i * 100, average_score = average, "score trend");
    }

    if cli.show_example {
        example(&mut game, agent.as_mut(), cli.max_steps)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epsilon_defaults_depend_on_the_agent() {
        let cli = Cli::from_iter(["pacman", "--agent", "bandit"]);
        assert_eq!(cli.epsilon(), 0.5);
        let cli = Cli::from_iter(["pacman"]);
        assert_eq!(cli.epsilon(), 0.05);
        let cli = Cli::from_iter(["pacman", "--agent", "bandit", "--epsilon", "0.2"]);
        assert_eq!(cli.epsilon(), 0.2);
    }
}
