mod sample_average;
mod tabular_policy;

pub use sample_average::{ArmEstimate, IncrementalValueEstimator};
pub use tabular_policy::QTable;
