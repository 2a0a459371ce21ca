//! Collectable subsystem: flag expiry.
//!
//! A flag whose wall-clock age reaches its lifetime is deactivated and
//! removed in the same tick, and the random-movement override is
//! released once no active flag remains. Philosopher stones are never
//! removed here.

use crate::{
    error::SimResult,
    event::SimEvent,
    flag_subsystem::sync_movement_override,
    rng::SubsystemRng,
    subsystem::SimSubsystem,
    types::Tick,
    world::World,
};
use chrono::{DateTime, Utc};

#[derive(Debug, Default)]
pub struct CollectableSubsystem;

impl CollectableSubsystem {
    pub fn new() -> Self {
        Self
    }
}

impl SimSubsystem for CollectableSubsystem {
    fn name(&self) -> &'static str { "collectable" }

    fn update(
        &mut self,
        tick: Tick,
        now: DateTime<Utc>,
        world: &mut World,
        _rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>> {
        let mut events = Vec::new();

        for collectable in world.collectables_mut() {
            if collectable.expire(now) {
                log::info!("tick={tick} flag {} at {} expired", collectable.id, collectable.position);
                events.push(SimEvent::FlagExpired { tick, collectable_id: collectable.id });
            }
        }

        if !world.remove_inactive_flags().is_empty() {
            events.extend(sync_movement_override(world, tick));
        }
        Ok(events)
    }

    fn as_any(&self) -> &dyn std::any::Any { self }
}
