use crate::action_selection::EpsilonGreedySelector;
use crate::agent::{moving_actions, Agent};
use crate::env::{Direction, GameState};
use crate::error::{Error, Result};
use crate::policy::IncrementalValueEstimator;

/// Treats the four moves as arms of a bandit, ignoring the game state.
/// The change in score since the previous move is credited to that move.
#[derive(Debug, Clone)]
pub struct BanditAgent {
    values: IncrementalValueEstimator<Direction>,
    selector: EpsilonGreedySelector,
    score_tracker: f64,
    steps: u64,
    last_action: Option<Direction>,
}

impl BanditAgent {
    pub const DEFAULT_EPSILON: f64 = 0.5;
    pub const ARMS: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub fn new(epsilon: f64, seed: u64) -> Result<Self> {
        Ok(Self {
            values: IncrementalValueEstimator::with_keys(Self::ARMS),
            selector: EpsilonGreedySelector::new(epsilon, seed)?,
            score_tracker: 0.0,
            steps: 0,
            last_action: None,
        })
    }

    pub fn q_value(&self, direction: Direction) -> f64 {
        self.values.value(&direction)
    }

    pub fn values(&self) -> &IncrementalValueEstimator<Direction> {
        &self.values
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn epsilon(&self) -> f64 {
        self.selector.epsilon()
    }

    fn credit_last_action(&mut self, current_score: f64) {
        let change_in_score: f64 = current_score - self.score_tracker;
        self.score_tracker = current_score;
        if let Some(last) = self.last_action {
            self.values.update(last, change_in_score);
        }
    }
}

impl<S: GameState> Agent<S> for BanditAgent {
    fn get_action(&mut self, state: &S) -> Result<Direction> {
        self.steps += 1;
        self.credit_last_action(state.score());

        let legal: Vec<Direction> = moving_actions(state);
        if legal.is_empty() {
            return Err(Error::NoLegalActions);
        }
        let q_values: Vec<f64> = self.values.values_for(&legal);
        let pick: Direction = legal[self.selector.select(&q_values)?];
        self.last_action = Some(pick);
        Ok(pick)
    }

    fn final_update(&mut self, state: &S) -> Result<()> {
        self.credit_last_action(state.score());
        self.last_action = None;
        self.score_tracker = 0.0;
        Ok(())
    }
}
