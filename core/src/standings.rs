//! Faction standings, the end-of-run outcome, and combat statistics.

use crate::{faction::Faction, unit::UnitKind, world::World};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionStanding {
    pub faction:     Faction,
    pub wood:        u64,
    pub ore:         u64,
    pub lumberjacks: usize,
    pub miners:      usize,
    pub sowers:      usize,
    pub assassins:   usize,
}

impl FactionStanding {
    pub fn compute(world: &World, faction: Faction) -> Self {
        let city = world.city(faction);
        Self {
            faction,
            wood:        city.wood(),
            ore:         city.ore(),
            lumberjacks: world.living_count(faction, UnitKind::Lumberjack),
            miners:      world.living_count(faction, UnitKind::Miner),
            sowers:      world.living_count(faction, UnitKind::Sower),
            assassins:   world.living_count(faction, UnitKind::Assassin),
        }
    }

    pub fn living_units(&self) -> usize {
        self.lumberjacks + self.miners + self.sowers + self.assassins
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standings {
    pub north: FactionStanding,
    pub south: FactionStanding,
}

impl Standings {
    pub fn compute(world: &World) -> Self {
        Self {
            north: FactionStanding::compute(world, Faction::North),
            south: FactionStanding::compute(world, Faction::South),
        }
    }

    pub fn get(&self, faction: Faction) -> &FactionStanding {
        match faction {
            Faction::North => &self.north,
            Faction::South => &self.south,
        }
    }

    /// A faction wins only by strictly leading both stockpiles.
    pub fn outcome(&self) -> Outcome {
        for faction in Faction::ALL {
            let (us, them) = (self.get(faction), self.get(faction.opponent()));
            if us.wood > them.wood && us.ore > them.ore {
                return Outcome::Victory(faction);
            }
        }
        Outcome::Tie
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", content = "faction", rename_all = "snake_case")]
pub enum Outcome {
    Victory(Faction),
    Tie,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Victory(faction) => write!(f, "{faction} wins"),
            Self::Tie => f.write_str("Tie"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatStats {
    pub living_units: usize,
    pub assassins:    usize,
    /// Living units with at least one living enemy next to them.
    pub engaged:      usize,
}

impl CombatStats {
    pub fn compute(world: &World) -> Self {
        let living: Vec<_> = world.units().iter().filter(|u| u.alive).collect();
        let engaged = living
            .iter()
            .filter(|u| {
                living
                    .iter()
                    .any(|o| o.faction != u.faction && o.position.is_adjacent(u.position))
            })
            .count();
        Self {
            living_units: living.len(),
            assassins:    living.iter().filter(|u| u.is_assassin()).count(),
            engaged,
        }
    }
}

impl fmt::Display for CombatStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Units: {}, Assassins: {}, Adjacent enemies: {}",
            self.living_units, self.assassins, self.engaged
        )
    }
}
