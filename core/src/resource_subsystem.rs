//! Resource subsystem: collection bookkeeping and depletion.
//!
//! Runs after units have harvested. Refreshes each resource's
//! `being_collected` and `growing` flags, then removes every resource
//! that is empty and not being sown.

use crate::{
    error::SimResult,
    event::SimEvent,
    rng::SubsystemRng,
    subsystem::SimSubsystem,
    types::{ResourceId, Tick},
    unit::UnitState,
    world::World,
};
use chrono::{DateTime, Utc};
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct ResourceSubsystem;

impl ResourceSubsystem {
    pub fn new() -> Self {
        Self
    }
}

/// Remove every depleted resource, one event each.
pub fn purge_depleted(world: &mut World, tick: Tick) -> Vec<SimEvent> {
    world
        .purge_depleted_resources()
        .into_iter()
        .map(|r| {
            log::debug!("tick={tick} {} {} at {} depleted", r.kind.object_name(), r.id, r.anchor);
            SimEvent::ResourceDepleted {
                tick,
                resource_id: r.id,
                kind: r.kind,
                anchor: r.anchor,
            }
        })
        .collect()
}

impl SimSubsystem for ResourceSubsystem {
    fn name(&self) -> &'static str { "resource" }

    fn update(
        &mut self,
        tick: Tick,
        _now: DateTime<Utc>,
        world: &mut World,
        _rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>> {
        let harvested: HashSet<ResourceId> = world
            .units()
            .iter()
            .filter(|u| u.alive)
            .filter_map(|u| match &u.state {
                UnitState::Collector(c) if c.collecting => c.target,
                _ => None,
            })
            .collect();

        for resource in world.resources_mut() {
            resource.being_collected = harvested.contains(&resource.id);
        }
        world.refresh_growing();

        Ok(purge_depleted(world, tick))
    }

    fn as_any(&self) -> &dyn std::any::Any { self }
}
