//! Repeated n-armed bandit trials with epsilon-greedy action selection,
//! averaged over independent runs.

use ndarray::{Array1, Array2, Axis};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::action_selection::EpsilonGreedySelector;
use crate::env::BanditEnvironment;
use crate::error::{check_unit_interval, Error, Result};
use crate::policy::IncrementalValueEstimator;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub epsilon: f64,
    /// number of arms on the bandit
    pub num_arms: usize,
    /// number of times the experiment is repeated
    pub runs: usize,
    /// number of plays within each run
    pub plays: usize,
    pub seed: u64,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            epsilon: 0.1,
            num_arms: 10,
            runs: 100,
            plays: 1000,
            seed: 42,
        }
    }
}

impl ExperimentConfig {
    pub fn validate(&self) -> Result<()> {
        check_unit_interval("epsilon", self.epsilon)?;
        if self.num_arms == 0 {
            return Err(Error::invalid("num_arms", "must be at least 1"));
        }
        if self.runs == 0 {
            return Err(Error::invalid("runs", "must be at least 1"));
        }
        if self.plays == 0 {
            return Err(Error::invalid("plays", "must be at least 1"));
        }
        Ok(())
    }
}

/// What happened during a single run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunTrace {
    pub actions: Vec<usize>,
    pub rewards: Vec<f64>,
    pub optimal_action: usize,
}

impl RunTrace {
    /// Average reward over plays `0..=j`, for every `j`.
    pub fn average_rewards(&self) -> Array1<f64> {
        let mut total: f64 = 0.0;
        self.rewards
            .iter()
            .enumerate()
            .map(|(j, r)| {
                total += r;
                total / (j + 1) as f64
            })
            .collect()
    }

    /// Share of plays `0..=j` that picked the optimal arm, for every `j`.
    pub fn optimal_proportions(&self) -> Array1<f64> {
        let mut hits: usize = 0;
        self.actions
            .iter()
            .enumerate()
            .map(|(j, a)| {
                if *a == self.optimal_action {
                    hits += 1;
                }
                hits as f64 / (j + 1) as f64
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentResults {
    pub config: ExperimentConfig,
    /// mean over runs of the running average reward, one entry per play
    pub average_reward: Vec<f64>,
    /// mean over runs of the share of optimal picks, as a percentage
    pub percent_optimal: Vec<f64>,
}

impl ExperimentResults {
    pub fn from_traces(config: ExperimentConfig, traces: &[RunTrace]) -> Result<Self> {
        let plays: usize = traces.first().map_or(0, |t| t.rewards.len());
        if plays == 0 {
            return Err(Error::invalid("traces", "no plays to aggregate"));
        }
        let mut rewards: Array2<f64> = Array2::zeros((traces.len(), plays));
        let mut optimal: Array2<f64> = Array2::zeros((traces.len(), plays));
        for (i, trace) in traces.iter().enumerate() {
            if trace.rewards.len() != plays || trace.actions.len() != plays {
                return Err(Error::invalid(
                    "traces",
                    format!("run {i} has a different number of plays"),
                ));
            }
            rewards.row_mut(i).assign(&trace.average_rewards());
            optimal.row_mut(i).assign(&trace.optimal_proportions());
        }
        let average_reward: Array1<f64> = rewards.mean_axis(Axis(0)).unwrap_or_default();
        let percent_optimal: Array1<f64> =
            optimal.mean_axis(Axis(0)).unwrap_or_default() * 100.0;
        Ok(Self {
            config,
            average_reward: average_reward.to_vec(),
            percent_optimal: percent_optimal.to_vec(),
        })
    }

    pub fn final_average_reward(&self) -> f64 {
        self.average_reward.last().copied().unwrap_or(0.0)
    }

    pub fn final_percent_optimal(&self) -> f64 {
        self.percent_optimal.last().copied().unwrap_or(0.0)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub struct ExperimentRunner {
    config: ExperimentConfig,
    selector: EpsilonGreedySelector,
    rng: SmallRng,
}

impl ExperimentRunner {
    pub fn new(config: ExperimentConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            selector: EpsilonGreedySelector::new(config.epsilon, config.seed)?,
            rng: SmallRng::seed_from_u64(config.seed.wrapping_add(1)),
            config,
        })
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Plays a fresh bandit `plays` times, learning sample averages as it goes.
    /// The bandit and its payoffs come from the runner's own seeded RNG.
    pub fn run_once(&mut self) -> Result<RunTrace> {
        let bandit: BanditEnvironment =
            BanditEnvironment::new(self.config.num_arms, &mut self.rng)?;
        let arms: Vec<usize> = (0..self.config.num_arms).collect();
        let mut estimates: IncrementalValueEstimator<usize> =
            IncrementalValueEstimator::with_keys(arms.iter().copied());

        let mut actions: Vec<usize> = Vec::with_capacity(self.config.plays);
        let mut rewards: Vec<f64> = Vec::with_capacity(self.config.plays);
        for _ in 0..self.config.plays {
            let pick: usize = self.selector.select(&estimates.values_for(&arms))?;
            let reward: f64 = bandit.payoff(pick, &mut self.rng)?;
            estimates.update(pick, reward);
            actions.push(pick);
            rewards.push(reward);
        }

        let trace: RunTrace = RunTrace {
            actions,
            rewards,
            optimal_action: bandit.optimal_action(),
        };
        debug!(
            optimal_action = trace.optimal_action,
            best_value = bandit.q_star()[trace.optimal_action],
            "run finished"
        );
        Ok(trace)
    }

    pub fn run(&mut self) -> Result<ExperimentResults> {
        let traces: Vec<RunTrace> = (0..self.config.runs)
            .map(|_| self.run_once())
            .collect::<Result<_>>()?;
        let results: ExperimentResults = ExperimentResults::from_traces(self.config, &traces)?;
        info!(
            epsilon = self.config.epsilon,
            average_reward = results.final_average_reward(),
            percent_optimal = results.final_percent_optimal(),
            "experiment finished"
        );
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_metrics_include_the_current_play() {
        let trace = RunTrace {
            actions: vec![0, 1, 1],
            rewards: vec![1.0, 2.0, 3.0],
            optimal_action: 1,
        };
        assert_eq!(trace.average_rewards().to_vec(), vec![1.0, 1.5, 2.0]);
        let p = trace.optimal_proportions();
        assert_eq!(p[0], 0.0);
        assert_eq!(p[1], 0.5);
        assert!((p[2] - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn results_average_across_runs() {
        let a = RunTrace {
            actions: vec![0, 0],
            rewards: vec![2.0, 0.0],
            optimal_action: 0,
        };
        let b = RunTrace {
            actions: vec![1, 0],
            rewards: vec![0.0, 4.0],
            optimal_action: 0,
        };
        let results = ExperimentResults::from_traces(ExperimentConfig::default(), &[a, b]).unwrap();
        assert_eq!(results.average_reward, vec![1.0, 1.5]);
        assert_eq!(results.percent_optimal, vec![50.0, 75.0]);
    }

    #[test]
    fn mismatched_traces_are_rejected() {
        let a = RunTrace {
            actions: vec![0],
            rewards: vec![1.0],
            optimal_action: 0,
        };
        let b = RunTrace {
            actions: vec![0, 0],
            rewards: vec![1.0, 1.0],
            optimal_action: 0,
        };
        assert!(ExperimentResults::from_traces(ExperimentConfig::default(), &[a, b]).is_err());
        assert!(ExperimentResults::from_traces(ExperimentConfig::default(), &[]).is_err());
    }

    #[test]
    fn invalid_configs_are_rejected() {
        for config in [
            ExperimentConfig {
                num_arms: 0,
                ..Default::default()
            },
            ExperimentConfig {
                runs: 0,
                ..Default::default()
            },
            ExperimentConfig {
                plays: 0,
                ..Default::default()
            },
            ExperimentConfig {
                epsilon: 1.1,
                ..Default::default()
            },
        ] {
            assert!(ExperimentRunner::new(config).is_err());
        }
    }

    #[test]
    fn equal_seeds_give_equal_traces() {
        let config = ExperimentConfig {
            plays: 100,
            ..Default::default()
        };
        let mut a = ExperimentRunner::new(config).unwrap();
        let mut b = ExperimentRunner::new(config).unwrap();
        assert_eq!(a.run_once().unwrap(), b.run_once().unwrap());
        assert_eq!(a.run_once().unwrap(), b.run_once().unwrap());
    }

    #[test]
    fn run_once_records_every_play() {
        let config = ExperimentConfig {
            plays: 50,
            num_arms: 4,
            ..Default::default()
        };
        let mut runner = ExperimentRunner::new(config).unwrap();
        let trace = runner.run_once().unwrap();
        assert_eq!(trace.actions.len(), 50);
        assert_eq!(trace.rewards.len(), 50);
        assert!(trace.actions.iter().all(|a| *a < 4));
        assert!(trace.optimal_action < 4);
    }
}
