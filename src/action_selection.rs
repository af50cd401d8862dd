mod epsilon_greedy;
mod epsilon_schedule;

pub use epsilon_greedy::EpsilonGreedySelector;
pub use epsilon_schedule::{Constant, EnumEpsilonSchedule, EpsilonSchedule, LinearDecay};
