use thiserror::Error;

use crate::env::Direction;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("no legal actions to choose from")]
    NoLegalActions,

    #[error("episode ended before any action was taken")]
    NoPreviousTransition,

    #[error("arm {arm} out of range for a bandit with {num_arms} arms")]
    ArmOutOfRange { arm: usize, num_arms: usize },

    #[error("action {action} is not legal in the current state")]
    IllegalAction { action: Direction },

    #[error("environment is not ready to receive actions")]
    EnvNotReady,

    #[error("invalid layout: {0}")]
    InvalidLayout(String),

    #[error("failed to draw plot: {0}")]
    Plot(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Checks that a probability-like parameter lies in `[0, 1]`.
pub(crate) fn check_unit_interval(name: &'static str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::invalid(name, format!("{value} is outside [0, 1]")))
    }
}
