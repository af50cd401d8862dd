use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::action_selection::{
    Constant, EnumEpsilonSchedule, EpsilonGreedySelector, EpsilonSchedule, LinearDecay,
};
use crate::agent::{moving_actions, Agent};
use crate::env::{Direction, GameState};
use crate::error::{check_unit_interval, Error, Result};
use crate::policy::QTable;
use crate::utils::euclidean_distance;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QLearnConfig {
    /// learning rate
    pub alpha: f64,
    /// exploration rate for the first game
    pub epsilon: f64,
    /// discount factor
    pub gamma: f64,
    pub num_training: u64,
    /// epsilon after game `k` is `epsilon_decay_scale * (1 - k / num_training)`
    pub epsilon_decay_scale: f64,
    /// keep `epsilon` fixed during training instead of decaying it
    pub constant_epsilon: bool,
    /// ghost distance above which the guided exploitation avoids turning back
    pub safe_ghost_distance: f64,
    pub seed: u64,
}

impl Default for QLearnConfig {
    fn default() -> Self {
        Self {
            alpha: 0.2,
            epsilon: 0.05,
            gamma: 0.8,
            num_training: 10,
            epsilon_decay_scale: 0.1,
            constant_epsilon: false,
            safe_ghost_distance: 2.0,
            seed: 42,
        }
    }
}

impl QLearnConfig {
    pub fn validate(&self) -> Result<()> {
        check_unit_interval("alpha", self.alpha)?;
        check_unit_interval("epsilon", self.epsilon)?;
        check_unit_interval("gamma", self.gamma)?;
        check_unit_interval("epsilon_decay_scale", self.epsilon_decay_scale)?;
        if self.num_training == 0 {
            return Err(Error::invalid("num_training", "must be at least 1"));
        }
        Ok(())
    }

    fn schedule(&self) -> EnumEpsilonSchedule {
        if self.constant_epsilon {
            Constant(self.epsilon).into()
        } else {
            LinearDecay::new(self.epsilon_decay_scale, self.num_training).into()
        }
    }
}

/// One-step tabular Q-learning over full game states.
///
/// Learning is switched off (alpha and epsilon set to zero) once
/// `num_training` games have been played.
#[derive(Debug, Clone)]
pub struct QLearnAgent<S: GameState> {
    q_table: QTable<S, Direction>,
    selector: EpsilonGreedySelector,
    schedule: EnumEpsilonSchedule,
    num_training: u64,
    safe_ghost_distance: f64,
    episodes_so_far: u64,
    score: f64,
    last: Option<(S, Direction)>,
}

impl<S: GameState> QLearnAgent<S> {
    pub fn new(config: QLearnConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            q_table: QTable::new(config.alpha, config.gamma)?,
            selector: EpsilonGreedySelector::new(config.epsilon, config.seed)?,
            schedule: config.schedule(),
            num_training: config.num_training,
            safe_ghost_distance: config.safe_ghost_distance,
            episodes_so_far: 0,
            score: 0.0,
            last: None,
        })
    }

    pub fn episodes_so_far(&self) -> u64 {
        self.episodes_so_far
    }

    pub fn num_training(&self) -> u64 {
        self.num_training
    }

    pub fn is_training(&self) -> bool {
        self.episodes_so_far < self.num_training
    }

    pub fn alpha(&self) -> f64 {
        self.q_table.learning_rate()
    }

    pub fn gamma(&self) -> f64 {
        self.q_table.discount_factor()
    }

    pub fn epsilon(&self) -> f64 {
        self.selector.epsilon()
    }

    pub fn q_table(&self) -> &QTable<S, Direction> {
        &self.q_table
    }

    fn training_progress(&self) -> f64 {
        self.episodes_so_far as f64 / self.num_training as f64
    }

    /// Greedy choice. In the first half of training the candidates skip
    /// `Stop`, and skip turning back while the ghost is far away.
    fn exploit(&mut self, state: &S, previous: Option<Direction>) -> Result<Direction> {
        let mut candidates: Vec<Direction> = state.legal_actions();
        if self.training_progress() < 0.5 {
            candidates.retain(|d| *d != Direction::Stop);
            if let Some(previous) = previous {
                let ghost_distance: f64 = state
                    .ghost_position(1)
                    .map_or(f64::INFINITY, |g| euclidean_distance(state.pacman_position(), g));
                let back: Direction = previous.reverse();
                if ghost_distance > self.safe_ghost_distance
                    && candidates.len() > 1
                    && candidates.contains(&back)
                {
                    candidates.retain(|d| *d != back);
                }
            }
        }
        let values: Vec<f64> = self.q_table.values_for(state, &candidates);
        Ok(candidates[self.selector.greedy(&values)?])
    }
}

impl<S: GameState> Agent<S> for QLearnAgent<S> {
    fn get_action(&mut self, state: &S) -> Result<Direction> {
        let legal: Vec<Direction> = moving_actions(state);
        if legal.is_empty() {
            return Err(Error::NoLegalActions);
        }

        let reward: f64 = state.score() - self.score;
        let previous: Option<Direction> = self.last.as_ref().map(|(_, a)| *a);
        if let Some((last_state, last_action)) = self.last.take() {
            let max_q: f64 = self.q_table.max_q(state, &state.legal_actions());
            self.q_table.update(last_state, last_action, reward, max_q);
        }

        let action: Direction = if self.selector.should_explore() {
            legal[self.selector.explore(legal.len())?]
        } else {
            self.exploit(state, previous)?
        };

        self.score = state.score();
        self.last = Some((state.clone(), action));
        Ok(action)
    }

    fn final_update(&mut self, state: &S) -> Result<()> {
        let (last_state, last_action) = self.last.take().ok_or(Error::NoPreviousTransition)?;
        let reward: f64 = state.score() - self.score;
        let td: f64 = self.q_table.update(last_state, last_action, reward, 0.0);
        debug!(episode = self.episodes_so_far, reward, td, "terminal update");
        self.score = 0.0;

        if self.is_training() {
            let epsilon: f64 = self.schedule.epsilon(self.episodes_so_far);
            self.selector.set_epsilon(epsilon)?;
        }

        self.episodes_so_far += 1;
        if self.episodes_so_far % 100 == 0 {
            info!("Completed {} runs of training", self.episodes_so_far);
        }
        if self.episodes_so_far == self.num_training {
            info!("Training Done (turning off epsilon and alpha)");
            self.q_table.set_learning_rate(0.0)?;
            self.selector.set_epsilon(0.0)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    struct TestState {
        id: u8,
        legal: Vec<Direction>,
        score: i64,
        ghost: Option<(i64, i64)>,
    }

    impl GameState for TestState {
        fn legal_actions(&self) -> Vec<Direction> {
            self.legal.clone()
        }
        fn score(&self) -> f64 {
            self.score as f64
        }
        fn pacman_position(&self) -> (i64, i64) {
            (0, 0)
        }
        fn ghost_position(&self, index: usize) -> Option<(i64, i64)> {
            if index == 1 {
                self.ghost
            } else {
                None
            }
        }
        fn is_terminal(&self) -> bool {
            self.legal.is_empty()
        }
        fn is_win(&self) -> bool {
            false
        }
    }

    fn state(id: u8, legal: &[Direction], score: i64) -> TestState {
        TestState {
            id,
            legal: legal.to_vec(),
            score,
            ghost: Some((10, 10)),
        }
    }

    fn greedy_config(num_training: u64) -> QLearnConfig {
        QLearnConfig {
            epsilon: 0.0,
            constant_epsilon: true,
            num_training,
            ..QLearnConfig::default()
        }
    }

    #[test]
    fn rejects_bad_config() {
        let bad = QLearnConfig {
            num_training: 0,
            ..QLearnConfig::default()
        };
        assert!(QLearnAgent::<TestState>::new(bad).is_err());
        let bad = QLearnConfig {
            gamma: 1.5,
            ..QLearnConfig::default()
        };
        assert!(QLearnAgent::<TestState>::new(bad).is_err());
    }

    #[test]
    fn defaults_match_the_classic_setup() {
        let agent: QLearnAgent<TestState> = QLearnAgent::new(QLearnConfig::default()).unwrap();
        assert_eq!(agent.alpha(), 0.2);
        assert_eq!(agent.epsilon(), 0.05);
        assert_eq!(agent.gamma(), 0.8);
        assert_eq!(agent.num_training(), 10);
    }

    #[test]
    fn step_and_terminal_updates_follow_the_td_rule() {
        let mut agent = QLearnAgent::new(greedy_config(10)).unwrap();
        let s0 = state(0, &[Direction::East, Direction::Stop], 0);
        let s1 = state(1, &[Direction::East, Direction::Stop], 9);
        let end = state(2, &[], 509);

        assert_eq!(agent.get_action(&s0).unwrap(), Direction::East);
        agent.get_action(&s1).unwrap();
        // 0 + 0.2 * (9 + 0.8 * 0 - 0)
        assert!((agent.q_table().get(&s0, Direction::East) - 1.8).abs() < 1e-12);

        agent.final_update(&end).unwrap();
        // 0 + 0.2 * (500 - 0)
        assert!((agent.q_table().get(&s1, Direction::East) - 100.0).abs() < 1e-12);
        assert_eq!(agent.episodes_so_far(), 1);
    }

    #[test]
    fn final_update_without_a_move_fails() {
        let mut agent: QLearnAgent<TestState> = QLearnAgent::new(greedy_config(3)).unwrap();
        assert!(matches!(
            agent.final_update(&state(0, &[], 0)),
            Err(Error::NoPreviousTransition)
        ));
    }

    #[test]
    fn epsilon_decays_then_learning_stops() {
        let config = QLearnConfig {
            num_training: 4,
            ..QLearnConfig::default()
        };
        let mut agent = QLearnAgent::new(config).unwrap();
        let s = state(0, &[Direction::North], 0);
        let expected = [0.1, 0.075, 0.05];
        for eps in expected {
            agent.get_action(&s).unwrap();
            agent.final_update(&s).unwrap();
            assert!((agent.epsilon() - eps).abs() < 1e-12);
            assert!(agent.is_training());
        }
        agent.get_action(&s).unwrap();
        agent.final_update(&s).unwrap();
        assert!(!agent.is_training());
        assert_eq!(agent.epsilon(), 0.0);
        assert_eq!(agent.alpha(), 0.0);
    }

    #[test]
    fn constant_epsilon_stays_off_after_training() {
        let config = QLearnConfig {
            num_training: 3,
            epsilon: 0.3,
            constant_epsilon: true,
            ..QLearnConfig::default()
        };
        let mut agent = QLearnAgent::new(config).unwrap();
        let s = state(0, &[Direction::North], 0);
        for game in 1..=5 {
            agent.get_action(&s).unwrap();
            agent.final_update(&s).unwrap();
            if game < 3 {
                assert_eq!(agent.epsilon(), 0.3);
            } else {
                assert_eq!(agent.epsilon(), 0.0);
                assert_eq!(agent.alpha(), 0.0);
            }
        }
    }

    #[test]
    fn late_training_may_choose_stop() {
        let legal = [Direction::East, Direction::Stop];
        let s = state(0, &legal, 0);
        let mut agent = QLearnAgent::new(greedy_config(4)).unwrap();
        agent.q_table.update(s.clone(), Direction::Stop, 10.0, 0.0);

        // first half: Stop is never a candidate
        assert_eq!(agent.get_action(&s).unwrap(), Direction::East);

        agent.last = None;
        agent.episodes_so_far = 2;
        assert_eq!(agent.get_action(&s).unwrap(), Direction::Stop);
    }

    #[test]
    fn early_training_avoids_turning_back_when_safe() {
        let mut agent = QLearnAgent::new(greedy_config(10)).unwrap();
        let corridor = [Direction::East, Direction::West];
        let first = agent.get_action(&state(0, &[Direction::East], 0)).unwrap();
        assert_eq!(first, Direction::East);
        for i in 1..20 {
            let a = agent.get_action(&state(i, &corridor, 0)).unwrap();
            assert_eq!(a, Direction::East);
        }
    }

    #[test]
    fn turning_back_is_allowed_near_the_ghost() {
        let mut agent = QLearnAgent::new(greedy_config(10)).unwrap();
        agent.get_action(&state(0, &[Direction::East], 0)).unwrap();
        let mut near = state(1, &[Direction::East, Direction::West], 0);
        near.ghost = Some((1, 1));
        let mut seen_west = false;
        for _ in 0..50 {
            // keep the previous move at East
            agent.last = Some((state(0, &[Direction::East], 0), Direction::East));
            seen_west |= agent.get_action(&near).unwrap() == Direction::West;
        }
        assert!(seen_west);
    }

    #[test]
    fn no_moves_is_an_error() {
        let mut agent: QLearnAgent<TestState> = QLearnAgent::new(greedy_config(10)).unwrap();
        assert!(matches!(
            agent.get_action(&state(0, &[Direction::Stop], 0)),
            Err(Error::NoLegalActions)
        ));
    }

    #[test]
    fn no_moves_keeps_the_pending_transition() {
        let mut agent = QLearnAgent::new(greedy_config(10)).unwrap();
        let s0 = state(0, &[Direction::East], 0);
        agent.get_action(&s0).unwrap();
        assert!(agent.get_action(&state(1, &[Direction::Stop], 5)).is_err());
        assert_eq!(agent.q_table().get(&s0, Direction::East), 0.0);

        agent.final_update(&state(2, &[], 10)).unwrap();
        // 0 + 0.2 * (10 - 0)
        assert!((agent.q_table().get(&s0, Direction::East) - 2.0).abs() < 1e-12);
    }
}
