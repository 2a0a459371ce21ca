use crate::{faction::Faction, geometry::Position, resource::ResourceKind};
use serde::{Deserialize, Serialize};

/// A faction's single-cell base. Stockpiles only grow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct City {
    pub faction:  Faction,
    pub position: Position,
    wood:             u64,
    ore:              u64,
    production_timer: u32,
}

impl City {
    pub fn new(faction: Faction, position: Position) -> Self {
        Self { faction, position, wood: 0, ore: 0, production_timer: 0 }
    }

    pub fn wood(&self) -> u64 { self.wood }
    pub fn ore(&self)  -> u64 { self.ore }

    pub fn stock(&self, kind: ResourceKind) -> u64 {
        match kind {
            ResourceKind::Wood => self.wood,
            ResourceKind::Ore  => self.ore,
        }
    }

    pub fn credit(&mut self, kind: ResourceKind, amount: u32) {
        let counter = match kind {
            ResourceKind::Wood => &mut self.wood,
            ResourceKind::Ore  => &mut self.ore,
        };
        *counter = counter.saturating_add(u64::from(amount));
    }

    pub fn production_timer(&self) -> u32 {
        self.production_timer
    }

    /// Count one tick. Returns true, and resets the timer, when
    /// `interval` ticks have accumulated.
    pub fn tick_production(&mut self, interval: u32) -> bool {
        self.production_timer += 1;
        if self.production_timer >= interval {
            self.production_timer = 0;
            true
        } else {
            false
        }
    }
}
