//! World snapshot: owned, serializable copy of everything a renderer
//! or controller reads after a tick.

use crate::{
    city::City,
    clock::SimClock,
    collectable::Collectable,
    resource::Resource,
    standings::{CombatStats, Outcome, Standings},
    types::{CollectableId, RunId, Tick},
    unit::Unit,
    world::World,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectableView {
    #[serde(flatten)]
    pub collectable: Collectable,
    /// Whole seconds left. None for permanent collectables.
    pub remaining_secs: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub run_id: RunId,
    pub tick:   Tick,
    pub clock:  SimClock,
    pub width:  i32,
    pub height: i32,
    pub movement_override: bool,
    pub units:        Vec<Unit>,
    pub resources:    Vec<Resource>,
    pub cities:       Vec<City>,
    pub collectables: Vec<CollectableView>,
    pub standings:    Standings,
    pub outcome:      Outcome,
    pub combat:       CombatStats,
}

impl WorldSnapshot {
    pub fn capture(world: &World, clock: &SimClock, now: DateTime<Utc>) -> Self {
        let standings = Standings::compute(world);
        Self {
            run_id: clock.run_id.clone(),
            tick:   clock.current_tick,
            clock:  clock.clone(),
            width:  world.width(),
            height: world.height(),
            movement_override: world.movement_override_active(),
            units:     world.living_units(),
            resources: world.resources().to_vec(),
            cities:    world.cities().to_vec(),
            collectables: world
                .collectables()
                .iter()
                .map(|c| CollectableView {
                    collectable:    c.clone(),
                    remaining_secs: c.remaining_lifetime(now),
                })
                .collect(),
            outcome: standings.outcome(),
            standings,
            combat: CombatStats::compute(world),
        }
    }

    pub fn remaining_lifetime(&self, id: CollectableId) -> Option<i64> {
        self.collectables
            .iter()
            .find(|c| c.collectable.id == id)
            .and_then(|c| c.remaining_secs)
    }
}
