pub mod action_selection;
pub mod agent;
pub mod env;
pub mod experiment;
pub mod plot;
pub mod policy;
pub mod trainer;
pub mod utils;

mod error;

pub use error::{Error, Result};
