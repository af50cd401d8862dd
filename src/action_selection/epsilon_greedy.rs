use rand::distributions::{Distribution, Uniform};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::fmt::Debug;

use crate::error::{check_unit_interval, Error, Result};
use crate::utils::{argmax, random_argmax};

/// Exploits the best known option with probability `1 - epsilon` and
/// explores uniformly otherwise. Ties for the best value are broken
/// uniformly at random.
#[derive(Clone)]
pub struct EpsilonGreedySelector {
    exploration_decider: Uniform<f64>,
    epsilon: f64,
    rng: SmallRng,
}

impl Debug for EpsilonGreedySelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EpsilonGreedySelector")
            .field("epsilon", &self.epsilon)
            .finish()
    }
}

impl EpsilonGreedySelector {
    pub fn new(epsilon: f64, seed: u64) -> Result<Self> {
        Self::from_rng(epsilon, SmallRng::seed_from_u64(seed))
    }

    pub fn from_rng(epsilon: f64, rng: SmallRng) -> Result<Self> {
        check_unit_interval("epsilon", epsilon)?;
        Ok(Self {
            exploration_decider: Uniform::from(0.0..1.0),
            epsilon,
            rng,
        })
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn set_epsilon(&mut self, epsilon: f64) -> Result<()> {
        check_unit_interval("epsilon", epsilon)?;
        self.epsilon = epsilon;
        Ok(())
    }

    pub fn should_explore(&mut self) -> bool {
        self.epsilon != 0.0 && self.exploration_decider.sample(&mut self.rng) < self.epsilon
    }

    /// Uniform index in `0..n`.
    pub fn explore(&mut self, n: usize) -> Result<usize> {
        if n == 0 {
            return Err(Error::NoLegalActions);
        }
        Ok(self.rng.gen_range(0..n))
    }

    /// Index of the best value; ties are resolved uniformly at random.
    pub fn greedy(&mut self, values: &[f64]) -> Result<usize> {
        random_argmax(values, &mut self.rng).ok_or(Error::NoLegalActions)
    }

    /// Epsilon-greedy choice over `values`, one entry per legal option.
    pub fn select(&mut self, values: &[f64]) -> Result<usize> {
        if self.should_explore() {
            self.explore(values.len())
        } else {
            self.greedy(values)
        }
    }

    pub fn exploration_probs(&self, values: &[f64]) -> Vec<f64> {
        if values.is_empty() {
            return vec![];
        }
        let mut policy_probs: Vec<f64> = vec![self.epsilon / values.len() as f64; values.len()];
        policy_probs[argmax(values)] += 1.0 - self.epsilon;
        policy_probs
    }
}
