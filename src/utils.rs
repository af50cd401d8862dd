use rand::seq::SliceRandom;
use rand::Rng;

/// Index of the first maximum. Returns 0 for an empty slice.
pub fn argmax(values: &[f64]) -> usize {
    let mut result: usize = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[result] {
            result = i;
        }
    }
    result
}

pub fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// Index of a maximum, picked uniformly among ties.
pub fn random_argmax<R: Rng + ?Sized>(values: &[f64], rng: &mut R) -> Option<usize> {
    let best: f64 = max(values);
    let tied: Vec<usize> = values
        .iter()
        .enumerate()
        .filter(|(_, v)| **v == best)
        .map(|(i, _)| i)
        .collect();
    tied.choose(rng).copied()
}

pub fn moving_average(window: usize, vector: &[f64]) -> Vec<f64> {
    let window: usize = window.max(1);
    let mut aux: usize = 0;
    let mut result: Vec<f64> = vec![];
    while aux < vector.len() {
        let end: usize = if aux + window < vector.len() {
            aux + window
        } else {
            vector.len()
        };
        let slice: &[f64] = &vector[aux..end];
        let r: f64 = slice.iter().sum();
        result.push(r / slice.len() as f64);
        aux = end;
    }
    result
}

pub fn euclidean_distance(a: (i64, i64), b: (i64, i64)) -> f64 {
    let dx = (a.0 - b.0) as f64;
    let dy = (a.1 - b.1) as f64;
    (dx * dx + dy * dy).sqrt()
}
