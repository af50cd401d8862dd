use std::str::FromStr;

use crate::env::Direction;
use crate::error::{Error, Result};

/// Static part of a grid game: walls, initial food and start positions.
///
/// Text format, one row per line: `%` wall, `.` food, `P` Pacman start,
/// `G` ghost start, space for an empty cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    width: i64,
    height: i64,
    walls: Vec<bool>,
    food: Vec<(i64, i64)>,
    pacman_start: (i64, i64),
    ghost_starts: Vec<(i64, i64)>,
}

impl Layout {
    pub const MAX_FOOD: usize = 64;

    pub const SMALL_GRID: [&'static str; 5] = [
        "%%%%%%%",
        "% .  G%",
        "% %%% %",
        "%P  . %",
        "%%%%%%%",
    ];

    pub const MEDIUM_GRID: [&'static str; 7] = [
        "%%%%%%%%",
        "%P .   %",
        "% %%%% %",
        "%.    .%",
        "% %%%% %",
        "%   . G%",
        "%%%%%%%%",
    ];

    pub fn small_grid() -> Result<Self> {
        Self::from_rows(&Self::SMALL_GRID)
    }

    pub fn medium_grid() -> Result<Self> {
        Self::from_rows(&Self::MEDIUM_GRID)
    }

    pub fn from_rows(rows: &[&str]) -> Result<Self> {
        let height: usize = rows.len();
        if height == 0 {
            return Err(Error::InvalidLayout("layout has no rows".to_string()));
        }
        let width: usize = rows[0].chars().count();
        let mut walls: Vec<bool> = Vec::with_capacity(width * height);
        let mut food: Vec<(i64, i64)> = vec![];
        let mut pacman_start: Option<(i64, i64)> = None;
        let mut ghost_starts: Vec<(i64, i64)> = vec![];

        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() != width {
                return Err(Error::InvalidLayout(format!(
                    "row {y} has {} cells, expected {width}",
                    row.chars().count()
                )));
            }
            for (x, c) in row.chars().enumerate() {
                let pos: (i64, i64) = (x as i64, y as i64);
                walls.push(c == '%');
                match c {
                    '%' | ' ' => {}
                    '.' => food.push(pos),
                    'G' => ghost_starts.push(pos),
                    'P' => {
                        if pacman_start.replace(pos).is_some() {
                            return Err(Error::InvalidLayout(
                                "more than one Pacman start".to_string(),
                            ));
                        }
                    }
                    other => {
                        return Err(Error::InvalidLayout(format!(
                            "unknown cell '{other}' at ({x}, {y})"
                        )))
                    }
                }
            }
        }

        let pacman_start: (i64, i64) = pacman_start
            .ok_or_else(|| Error::InvalidLayout("missing Pacman start".to_string()))?;
        if food.is_empty() {
            return Err(Error::InvalidLayout("layout has no food".to_string()));
        }
        if food.len() > Self::MAX_FOOD {
            return Err(Error::InvalidLayout(format!(
                "{} food pellets, at most {} supported",
                food.len(),
                Self::MAX_FOOD
            )));
        }

        Ok(Self {
            width: width as i64,
            height: height as i64,
            walls,
            food,
            pacman_start,
            ghost_starts,
        })
    }

    pub fn width(&self) -> i64 {
        self.width
    }

    pub fn height(&self) -> i64 {
        self.height
    }

    pub fn food(&self) -> &[(i64, i64)] {
        &self.food
    }

    pub fn pacman_start(&self) -> (i64, i64) {
        self.pacman_start
    }

    pub fn ghost_starts(&self) -> &[(i64, i64)] {
        &self.ghost_starts
    }

    /// Cells outside the board count as walls.
    pub fn is_wall(&self, pos: (i64, i64)) -> bool {
        let (x, y) = pos;
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return true;
        }
        self.walls[(y * self.width + x) as usize]
    }

    pub fn neighbour(pos: (i64, i64), direction: Direction) -> (i64, i64) {
        let (dx, dy) = direction.delta();
        (pos.0 + dx, pos.1 + dy)
    }

    /// Moves that do not run into a wall, `Stop` excluded.
    pub fn open_moves(&self, pos: (i64, i64)) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|d| *d != Direction::Stop)
            .filter(|d| !self.is_wall(Self::neighbour(pos, *d)))
            .collect()
    }
}

impl FromStr for Layout {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let rows: Vec<&str> = s
            .lines()
            .map(|l| l.trim_end_matches('\r'))
            .filter(|l| !l.is_empty())
            .collect();
        Self::from_rows(&rows)
    }
}
