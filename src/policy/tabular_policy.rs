use fxhash::FxHashMap;
use std::fmt::Debug;
use std::hash::Hash;

use crate::error::{check_unit_interval, Result};

/// Tabular action values updated by one-step Q-learning.
#[derive(Debug, Clone)]
pub struct QTable<S: Hash + Eq + Clone, A: Hash + Eq + Copy> {
    learning_rate: f64,
    discount_factor: f64,
    values: FxHashMap<(S, A), f64>,
}

impl<S: Hash + Eq + Clone, A: Hash + Eq + Copy> QTable<S, A> {
    pub fn new(learning_rate: f64, discount_factor: f64) -> Result<Self> {
        check_unit_interval("learning_rate", learning_rate)?;
        check_unit_interval("discount_factor", discount_factor)?;
        Ok(Self {
            learning_rate,
            discount_factor,
            values: FxHashMap::default(),
        })
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn set_learning_rate(&mut self, learning_rate: f64) -> Result<()> {
        check_unit_interval("learning_rate", learning_rate)?;
        self.learning_rate = learning_rate;
        Ok(())
    }

    pub fn discount_factor(&self) -> f64 {
        self.discount_factor
    }

    /// Unseen pairs are worth zero.
    pub fn get(&self, state: &S, action: A) -> f64 {
        // the key owns its state, so lookups clone it
        *self
            .values
            .get(&(state.clone(), action))
            .unwrap_or(&0.0)
    }

    pub fn values_for(&self, state: &S, actions: &[A]) -> Vec<f64> {
        actions.iter().map(|a| self.get(state, *a)).collect()
    }

    /// Best value among `legal`, or zero when nothing is legal.
    pub fn max_q(&self, state: &S, legal: &[A]) -> f64 {
        legal
            .iter()
            .map(|a| self.get(state, *a))
            .reduce(f64::max)
            .unwrap_or(0.0)
    }

    /// `Q(s,a) <- Q(s,a) + alpha * (r + gamma * max_q - Q(s,a))`.
    /// Returns the temporal difference.
    pub fn update(&mut self, state: S, action: A, reward: f64, max_q: f64) -> f64 {
        let discount_factor: f64 = self.discount_factor;
        let learning_rate: f64 = self.learning_rate;
        let q: &mut f64 = self.values.entry((state, action)).or_insert(0.0);
        let temporal_difference: f64 = reward + discount_factor * max_q - *q;
        *q += learning_rate * temporal_difference;
        temporal_difference
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn reset(&mut self) {
        self.values = FxHashMap::default()
    }
}
