use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use tracing::debug;

use crate::env::{Direction, Env, GameState, Layout};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Running,
    Win,
    Lose,
}

/// Snapshot of a grid game. Two snapshots are equal when positions,
/// remaining food, score and outcome agree.
#[derive(Debug, Clone)]
pub struct GridState {
    layout: Rc<Layout>,
    pacman: (i64, i64),
    ghosts: Vec<(i64, i64)>,
    ghost_directions: Vec<Direction>,
    food: u64,
    score: i64,
    outcome: Outcome,
}

impl GridState {
    fn initial(layout: Rc<Layout>) -> Self {
        let food: u64 = if layout.food().len() == 64 {
            u64::MAX
        } else {
            (1u64 << layout.food().len()) - 1
        };
        Self {
            pacman: layout.pacman_start(),
            ghosts: layout.ghost_starts().to_vec(),
            ghost_directions: vec![Direction::Stop; layout.ghost_starts().len()],
            food,
            score: 0,
            outcome: Outcome::Running,
            layout,
        }
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn food_left(&self) -> u32 {
        self.food.count_ones()
    }

    fn has_food(&self, pos: (i64, i64)) -> Option<usize> {
        self.layout
            .food()
            .iter()
            .position(|f| *f == pos)
            .filter(|i| self.food & (1u64 << i) != 0)
    }

    fn caught(&self) -> bool {
        self.ghosts.contains(&self.pacman)
    }

    fn key(&self) -> ((i64, i64), &[(i64, i64)], u64, i64, Outcome) {
        (self.pacman, &self.ghosts, self.food, self.score, self.outcome)
    }

    pub fn render(&self) -> String {
        let mut board: String = String::new();
        for y in 0..self.layout.height() {
            for x in 0..self.layout.width() {
                let pos: (i64, i64) = (x, y);
                let c: char = if self.layout.is_wall(pos) {
                    '%'
                } else if pos == self.pacman {
                    'P'
                } else if self.ghosts.contains(&pos) {
                    'G'
                } else if self.has_food(pos).is_some() {
                    '.'
                } else {
                    ' '
                };
                board.push(c);
            }
            board.push('\n');
        }
        board
    }
}

impl PartialEq for GridState {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for GridState {}

impl Hash for GridState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state)
    }
}

impl GameState for GridState {
    /// Open moves plus `Stop`; nothing once the game is over.
    fn legal_actions(&self) -> Vec<Direction> {
        if self.outcome != Outcome::Running {
            return vec![];
        }
        let mut legal: Vec<Direction> = self.layout.open_moves(self.pacman);
        legal.push(Direction::Stop);
        legal
    }

    fn score(&self) -> f64 {
        self.score as f64
    }

    fn pacman_position(&self) -> (i64, i64) {
        self.pacman
    }

    fn ghost_position(&self, index: usize) -> Option<(i64, i64)> {
        index
            .checked_sub(1)
            .and_then(|i| self.ghosts.get(i))
            .copied()
    }

    fn is_terminal(&self) -> bool {
        self.outcome != Outcome::Running
    }

    fn is_win(&self) -> bool {
        self.outcome == Outcome::Win
    }
}

/// A tiny Pacman-style host with Berkeley scoring: -1 per move, +10 per
/// pellet, +500 for clearing the board and -500 for being caught.
#[derive(Debug, Clone)]
pub struct GridGame {
    layout: Rc<Layout>,
    state: Option<GridState>,
    rng: SmallRng,
}

impl GridGame {
    pub const TIME_PENALTY: i64 = 1;
    pub const FOOD_REWARD: i64 = 10;
    pub const WIN_REWARD: i64 = 500;
    pub const LOSE_PENALTY: i64 = 500;

    pub fn new(layout: Layout, seed: u64) -> Self {
        Self {
            layout: Rc::new(layout),
            state: None,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn state(&self) -> Option<&GridState> {
        self.state.as_ref()
    }
}

impl Env<GridState> for GridGame {
    fn reset(&mut self) -> GridState {
        let state: GridState = GridState::initial(Rc::clone(&self.layout));
        self.state = Some(state.clone());
        state
    }

    fn step(&mut self, action: Direction) -> Result<GridState> {
        let state: &mut GridState = match self.state.as_mut() {
            Some(s) if s.outcome == Outcome::Running => s,
            _ => return Err(Error::EnvNotReady),
        };
        if !state.legal_actions().contains(&action) {
            return Err(Error::IllegalAction { action });
        }

        state.pacman = Layout::neighbour(state.pacman, action);
        state.score -= Self::TIME_PENALTY;
        if state.caught() {
            state.score -= Self::LOSE_PENALTY;
            state.outcome = Outcome::Lose;
        } else if let Some(i) = state.has_food(state.pacman) {
            state.food &= !(1u64 << i);
            state.score += Self::FOOD_REWARD;
            if state.food == 0 {
                state.score += Self::WIN_REWARD;
                state.outcome = Outcome::Win;
            }
        }

        if state.outcome == Outcome::Running {
            for g in 0..state.ghosts.len() {
                let mut options: Vec<Direction> = self.layout.open_moves(state.ghosts[g]);
                let back: Direction = state.ghost_directions[g].reverse();
                if options.len() > 1 {
                    options.retain(|d| *d != back);
                }
                if let Some(d) = options.choose(&mut self.rng).copied() {
                    state.ghosts[g] = Layout::neighbour(state.ghosts[g], d);
                    state.ghost_directions[g] = d;
                }
            }
            if state.caught() {
                state.score -= Self::LOSE_PENALTY;
                state.outcome = Outcome::Lose;
            }
        }

        if state.outcome != Outcome::Running {
            debug!(outcome = ?state.outcome, score = state.score, "game over");
        }
        Ok(state.clone())
    }

    fn render(&self) -> String {
        self.state
            .as_ref()
            .map_or_else(String::new, GridState::render)
    }
}
