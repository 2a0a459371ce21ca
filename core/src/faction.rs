use serde::{Deserialize, Serialize};
use std::fmt;

/// The two contesting factions. Symmetric: each is the other's opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    North,
    South,
}

impl Faction {
    pub const ALL: [Faction; 2] = [Faction::North, Faction::South];

    pub fn opponent(&self) -> Faction {
        match self {
            Self::North => Self::South,
            Self::South => Self::North,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::North => "North",
            Self::South => "South",
        }
    }

    /// Stable index into per-faction arrays.
    pub fn index(&self) -> usize {
        match self {
            Self::North => 0,
            Self::South => 1,
        }
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
