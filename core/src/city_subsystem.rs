//! City subsystem: unit production.
//!
//! Each city counts ticks. When its timer reaches the production
//! interval the timer resets and the city tries to produce one unit:
//! the kind is drawn first, then a spawn cell is searched on the
//! perimeter rings around the city. No cell means the cycle is lost.

use crate::{
    config::CityConfig,
    error::SimResult,
    event::{SimEvent, SpawnSource},
    faction::Faction,
    resource::ResourceKind,
    rng::SubsystemRng,
    subsystem::SimSubsystem,
    types::Tick,
    unit::UnitKind,
    world::World,
};
use chrono::{DateTime, Utc};

/// Production weights in draw order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductionWeights {
    pub lumberjack: u64,
    pub miner:      u64,
    pub assassin:   u64,
    pub sower:      u64,
}

impl ProductionWeights {
    pub fn compute(world: &World, faction: Faction, config: &CityConfig) -> Self {
        let trees = world.resource_count(ResourceKind::Wood) as u64;
        let rocks = world.resource_count(ResourceKind::Ore) as u64;
        let enemy_assassins = world.living_count(faction.opponent(), UnitKind::Assassin) as u64;
        Self {
            lumberjack: (config.lumberjack_weight_per_tree * trees).max(1),
            miner:      (config.miner_weight_per_rock * rocks).max(1),
            assassin:   (config.assassin_weight_per_enemy_assassin * enemy_assassins).max(1),
            sower:      config.sower_weight.max(1),
        }
    }

    pub fn total(&self) -> u64 {
        self.lumberjack + self.miner + self.assassin + self.sower
    }

    /// Map a roll in [0, total) to a kind.
    pub fn select(&self, roll: u64) -> UnitKind {
        let ordered = [
            (UnitKind::Lumberjack, self.lumberjack),
            (UnitKind::Miner,      self.miner),
            (UnitKind::Assassin,   self.assassin),
        ];
        let mut ceiling = 0;
        for (kind, weight) in ordered {
            ceiling += weight;
            if roll < ceiling {
                return kind;
            }
        }
        UnitKind::Sower
    }

    pub fn draw(&self, rng: &mut SubsystemRng) -> UnitKind {
        self.select(rng.next_u64_below(self.total()))
    }
}

pub struct CitySubsystem {
    config: CityConfig,
}

impl CitySubsystem {
    pub fn new(config: CityConfig) -> Self {
        Self { config }
    }
}

impl SimSubsystem for CitySubsystem {
    fn name(&self) -> &'static str { "city" }

    fn update(
        &mut self,
        tick: Tick,
        _now: DateTime<Utc>,
        world: &mut World,
        rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>> {
        let mut events = Vec::new();

        for faction in Faction::ALL {
            if !world.city_mut(faction).tick_production(self.config.production_interval) {
                continue;
            }

            let kind = ProductionWeights::compute(world, faction, &self.config).draw(rng);
            let center = world.city_position(faction);
            match world.find_spawn_position(center, self.config.spawn_radius) {
                Some(position) => {
                    let unit_id = world.add_unit(faction, kind, position)?;
                    log::debug!("tick={tick} {faction} city produced {kind} {unit_id} at {position}");
                    events.push(SimEvent::UnitSpawned {
                        tick,
                        unit_id,
                        faction,
                        kind,
                        position,
                        source: SpawnSource::City,
                    });
                }
                None => {
                    log::debug!("tick={tick} {faction} city has no room for a {kind}");
                    events.push(SimEvent::ProductionSkipped { tick, faction, kind });
                }
            }
        }
        Ok(events)
    }

    fn as_any(&self) -> &dyn std::any::Any { self }
}
