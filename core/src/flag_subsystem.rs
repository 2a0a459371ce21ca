//! Flag subsystem: periodic flag trigger and the movement override.
//!
//! Runs first each tick. Timing is wall-clock only: the interval and the
//! flag lifetime are unaffected by simulation speed.
//!
//! Expiry is handled later in the tick by the collectable subsystem.

use crate::{
    config::EventConfig,
    error::SimResult,
    event::SimEvent,
    rng::SubsystemRng,
    subsystem::SimSubsystem,
    types::Tick,
    world::World,
};
use chrono::{DateTime, Duration, Utc};

pub struct FlagSubsystem {
    interval:         Duration,
    lifetime:         Duration,
    pub last_flag_at: DateTime<Utc>,
}

impl FlagSubsystem {
    /// The first scheduled flag appears one interval after `started_at`.
    pub fn new(config: &EventConfig, started_at: DateTime<Utc>) -> Self {
        Self {
            interval:     config.flag_interval(),
            lifetime:     config.flag_lifetime(),
            last_flag_at: started_at,
        }
    }
}

/// Place a flag at a random free cell. Returns None, with a warning,
/// when a flag is already up or the grid is full.
pub fn raise_flag(
    world:    &mut World,
    tick:     Tick,
    now:      DateTime<Utc>,
    lifetime: Duration,
    rng:      &mut SubsystemRng,
    forced:   bool,
) -> SimResult<Option<SimEvent>> {
    if world.has_active_flag() {
        log::warn!("tick={tick} flag refused: one is already active");
        return Ok(None);
    }
    let Some(position) = world.find_random_free_position(rng) else {
        log::warn!("tick={tick} flag refused: no free cell");
        return Ok(None);
    };
    let collectable_id = world.add_flag(position, now, lifetime)?;
    log::info!(
        "tick={tick} flag raised at {position} for {}s{}",
        lifetime.num_seconds(),
        if forced { " (forced)" } else { "" }
    );
    Ok(Some(SimEvent::FlagRaised { tick, collectable_id, position, forced }))
}

/// Push or pop the override to match whether a flag is active.
/// Idempotent; reports only transitions.
pub fn sync_movement_override(world: &mut World, tick: Tick) -> Option<SimEvent> {
    let active = world.has_active_flag();
    let changed = if active {
        world.push_movement_override()
    } else {
        world.pop_movement_override()
    };
    if !changed {
        return None;
    }
    log::info!(
        "tick={tick} random movement {}",
        if active { "engaged" } else { "released" }
    );
    Some(SimEvent::MovementOverrideChanged { tick, active })
}

impl SimSubsystem for FlagSubsystem {
    fn name(&self) -> &'static str { "flag" }

    fn update(
        &mut self,
        tick: Tick,
        now: DateTime<Utc>,
        world: &mut World,
        rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>> {
        let mut events = Vec::new();

        if now - self.last_flag_at >= self.interval && !world.has_active_flag() {
            events.extend(raise_flag(world, tick, now, self.lifetime, rng, false)?);
            // The schedule restarts even when no cell was free.
            self.last_flag_at = now;
        }

        events.extend(sync_movement_override(world, tick));
        Ok(events)
    }

    fn as_any(&self) -> &dyn std::any::Any { self }
}
