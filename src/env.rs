mod bandit;
mod grid_game;
mod layout;

use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Display};
use std::hash::Hash;

use crate::error::Result;

pub use bandit::BanditEnvironment;
pub use grid_game::{GridGame, GridState, Outcome};
pub use layout::Layout;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
    Stop,
}

impl Direction {
    pub const ALL: [Direction; 5] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
        Direction::Stop,
    ];

    pub fn reverse(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::Stop => Direction::Stop,
        }
    }

    /// Column and row offsets; rows grow downwards.
    pub fn delta(self) -> (i64, i64) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
            Direction::Stop => (0, 0),
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label: &str = match self {
            Direction::North => "North",
            Direction::South => "South",
            Direction::East => "East",
            Direction::West => "West",
            Direction::Stop => "Stop",
        };
        f.write_str(label)
    }
}

/// A host game that can be driven move by move.
pub trait Env<S: GameState> {
    fn reset(&mut self) -> S;

    fn step(&mut self, action: Direction) -> Result<S>;

    fn render(&self) -> String;
}

/// What an agent may ask of the host game about the current position.
pub trait GameState: Clone + Eq + Hash + Debug {
    fn legal_actions(&self) -> Vec<Direction>;

    fn score(&self) -> f64;

    fn pacman_position(&self) -> (i64, i64);

    /// Ghosts are numbered from 1.
    fn ghost_position(&self, index: usize) -> Option<(i64, i64)>;

    fn is_terminal(&self) -> bool;

    /// Terminal because the board was cleared.
    fn is_win(&self) -> bool;
}
