use ndarray::Array1;
use ndarray_rand::rand_distr::StandardNormal;
use rand::Rng;

use crate::error::{Error, Result};
use crate::utils::argmax;

/// The n-armed testbed: each arm has a true value drawn from N(0, 1) and
/// pays that value plus N(0, 1) noise.
#[derive(Debug, Clone)]
pub struct BanditEnvironment {
    q_star: Array1<f64>,
}

impl BanditEnvironment {
    pub fn new<R: Rng + ?Sized>(num_arms: usize, rng: &mut R) -> Result<Self> {
        if num_arms == 0 {
            return Err(Error::invalid("num_arms", "a bandit needs at least one arm"));
        }
        let q_star: Array1<f64> = (0..num_arms)
            .map(|_| rng.sample::<f64, _>(StandardNormal))
            .collect();
        Ok(Self { q_star })
    }

    pub fn from_values(q_star: Vec<f64>) -> Result<Self> {
        if q_star.is_empty() {
            return Err(Error::invalid("num_arms", "a bandit needs at least one arm"));
        }
        Ok(Self {
            q_star: Array1::from(q_star),
        })
    }

    pub fn num_arms(&self) -> usize {
        self.q_star.len()
    }

    pub fn q_star(&self) -> &[f64] {
        // Array1 built from a Vec or iterator is always contiguous
        self.q_star.as_slice().unwrap_or(&[])
    }

    pub fn payoff<R: Rng + ?Sized>(&self, arm: usize, rng: &mut R) -> Result<f64> {
        let mean: f64 = *self.q_star.get(arm).ok_or(Error::ArmOutOfRange {
            arm,
            num_arms: self.num_arms(),
        })?;
        let noise: f64 = rng.sample(StandardNormal);
        Ok(mean + noise)
    }

    pub fn optimal_action(&self) -> usize {
        argmax(self.q_star())
    }
}
