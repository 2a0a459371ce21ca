//! Grid geometry: positions, distances, adjacency, greedy steps.
//!
//! Coordinates are signed so that neighbour enumeration at the map edge
//! can produce out-of-bounds candidates; callers filter with
//! `World::is_valid`.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Euclidean distance.
    pub fn distance_to(&self, other: Position) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        (dx * dx + dy * dy).sqrt()
    }

    pub fn manhattan_distance(&self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    pub fn chebyshev_distance(&self, other: Position) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// 8-neighbourhood adjacency. A position is not adjacent to itself.
    pub fn is_adjacent(&self, other: Position) -> bool {
        *self != other && self.chebyshev_distance(other) <= 1
    }

    /// The 8 surrounding cells, dx outer and dy inner, both ascending.
    pub fn neighbors(&self) -> [Position; 8] {
        let mut out = [*self; 8];
        let mut i = 0;
        for dx in -1..=1 {
            for dy in -1..=1 {
                if dx != 0 || dy != 0 {
                    out[i] = self.offset(dx, dy);
                    i += 1;
                }
            }
        }
        out
    }

    /// One greedy step toward `target`. Each axis moves independently,
    /// so diagonal steps happen whenever both axes differ.
    pub fn step_toward(&self, target: Position) -> Position {
        Self::new(
            self.x + (target.x - self.x).signum(),
            self.y + (target.y - self.y).signum(),
        )
    }

    /// Cells at exactly Chebyshev distance `radius`, in scan order
    /// (dx outer, dy inner, both ascending). Radius 0 yields the centre.
    pub fn ring(&self, radius: i32) -> Vec<Position> {
        let mut cells = Vec::with_capacity((8 * radius.max(1)) as usize);
        for dx in -radius..=radius {
            for dy in -radius..=radius {
                if dx.abs() == radius || dy.abs() == radius {
                    cells.push(self.offset(dx, dy));
                }
            }
        }
        cells
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
