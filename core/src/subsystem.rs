//! Subsystem trait.
//!
//! RULE: Every subsystem implements SimSubsystem.
//! The engine calls update() on each registered subsystem
//! in registration order, every tick.
//! Execution order is fixed and documented in engine.rs.

use crate::{
    error::SimResult,
    event::SimEvent,
    rng::SubsystemRng,
    types::Tick,
    world::World,
};
use chrono::{DateTime, Utc};
use std::any::Any;

/// The contract every subsystem must fulfill.
pub trait SimSubsystem: Send {
    /// Unique stable name for this subsystem.
    fn name(&self) -> &'static str;

    /// Called once per tick by the engine.
    ///
    /// - `tick`:  the current tick number
    /// - `now`:   the wall-clock instant sampled once at tick start
    /// - `world`: the shared world, mutated in place
    /// - `rng`:   this subsystem's deterministic RNG for this tick
    ///
    /// Returns the events to add to the tick's event log.
    fn update(
        &mut self,
        tick: Tick,
        now: DateTime<Utc>,
        world: &mut World,
        rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>>;

    /// For downcasting in tests and tooling only.
    /// Production sim code never uses this.
    fn as_any(&self) -> &dyn Any;
}
