mod bandit_agent;
mod qlearn_agent;

pub use bandit_agent::BanditAgent;
pub use qlearn_agent::{QLearnAgent, QLearnConfig};

use crate::env::{Direction, GameState};
use crate::error::Result;

/// The calls a host game makes on a learning agent.
pub trait Agent<S: GameState> {
    /// Called every time Pacman is expected to move.
    fn get_action(&mut self, state: &S) -> Result<Direction>;

    /// Called by the host after a win or a loss.
    fn final_update(&mut self, _state: &S) -> Result<()> {
        Ok(())
    }
}

/// Legal moves reported by the host, minus `Stop`.
pub(crate) fn moving_actions<S: GameState>(state: &S) -> Vec<Direction> {
    state
        .legal_actions()
        .into_iter()
        .filter(|d| *d != Direction::Stop)
        .collect()
}
