use indexmap::IndexMap;
use std::fmt::Debug;
use std::hash::Hash;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ArmEstimate {
    pub value: f64,
    pub count: u64,
}

/// Running sample average of the reward observed for each option.
///
/// Options keep the order in which they were registered, so iteration and
/// `values_for` are deterministic.
#[derive(Debug, Clone)]
pub struct IncrementalValueEstimator<K: Hash + Eq + Clone> {
    estimates: IndexMap<K, ArmEstimate>,
}

impl<K: Hash + Eq + Clone> Default for IncrementalValueEstimator<K> {
    fn default() -> Self {
        Self {
            estimates: IndexMap::new(),
        }
    }
}

impl<K: Hash + Eq + Clone> IncrementalValueEstimator<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keys(keys: impl IntoIterator<Item = K>) -> Self {
        Self {
            estimates: keys
                .into_iter()
                .map(|k| (k, ArmEstimate::default()))
                .collect(),
        }
    }

    pub fn value(&self, key: &K) -> f64 {
        self.estimates.get(key).map_or(0.0, |e| e.value)
    }

    pub fn count(&self, key: &K) -> u64 {
        self.estimates.get(key).map_or(0, |e| e.count)
    }

    /// `Q(a) <- Q(a) + (1/n)(r - Q(a))` where `n` counts this selection.
    pub fn update(&mut self, key: K, reward: f64) -> f64 {
        let estimate: &mut ArmEstimate = self.estimates.entry(key).or_default();
        estimate.count += 1;
        estimate.value += (reward - estimate.value) / estimate.count as f64;
        estimate.value
    }

    pub fn values_for(&self, keys: &[K]) -> Vec<f64> {
        keys.iter().map(|k| self.value(k)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &ArmEstimate)> {
        self.estimates.iter()
    }

    pub fn len(&self) -> usize {
        self.estimates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.estimates.is_empty()
    }

    /// Forgets everything learned but keeps the registered options.
    pub fn reset(&mut self) {
        for estimate in self.estimates.values_mut() {
            *estimate = ArmEstimate::default();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_tracks_the_sample_mean() {
        let mut estimator: IncrementalValueEstimator<usize> = IncrementalValueEstimator::with_keys(0..3);
        for r in [1.0, 2.0, 6.0] {
            estimator.update(1, r);
        }
        assert!((estimator.value(&1) - 3.0).abs() < 1e-12);
        assert_eq!(estimator.count(&1), 3);
        assert_eq!(estimator.value(&0), 0.0);
        assert_eq!(estimator.count(&2), 0);
    }

    #[test]
    fn first_update_replaces_the_initial_estimate() {
        let mut estimator: IncrementalValueEstimator<&str> = IncrementalValueEstimator::new();
        assert_eq!(estimator.update("north", -4.0), -4.0);
        assert_eq!(estimator.len(), 1);
    }

    #[test]
    fn keeps_registration_order() {
        let estimator = IncrementalValueEstimator::with_keys(["b", "a", "c"]);
        let keys: Vec<&&str> = estimator.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![&"b", &"a", &"c"]);
        assert_eq!(estimator.values_for(&["c", "z"]), vec![0.0, 0.0]);
    }

    #[test]
    fn reset_keeps_keys() {
        let mut estimator = IncrementalValueEstimator::with_keys([0usize, 1]);
        estimator.update(0, 5.0);
        estimator.reset();
        assert_eq!(estimator.len(), 2);
        assert_eq!(estimator.value(&0), 0.0);
        assert_eq!(estimator.count(&0), 0);
    }
}
