//! The simulation engine: owns the world and drives the tick.
//!
//! EXECUTION ORDER (fixed):
//!   0. Engine samples the wall clock once
//!   1. Flag subsystem         periodic flag, movement override
//!   2. Unit subsystem         per-unit state, movement, contacts
//!   3. Resource subsystem     collection bookkeeping, depletion
//!   4. Collectable subsystem  flag expiry, override release
//!   5. City subsystem         production
//!   6. Combat subsystem       elimination lottery on moved units
//!   7. Engine purges dead units, then any resource their death left
//!      empty and unsown
//!
//! RULES:
//!   - Subsystems execute in registration order, every tick.
//!   - All randomness flows through the RngBank.
//!   - Every event a subsystem returns is recorded in the event log.
//!   - Commands apply immediately, between ticks.

use crate::{
    city_subsystem::CitySubsystem,
    clock::{ManualClock, SimClock, WallClock},
    collectable_subsystem::CollectableSubsystem,
    combat_subsystem::CombatSubsystem,
    command::SimCommand,
    config::SimConfig,
    error::{SimError, SimResult},
    event::{EventLog, EventLogEntry, SimEvent, SpawnSource},
    faction::Faction,
    flag_subsystem::{raise_flag, sync_movement_override, FlagSubsystem},
    geometry::Position,
    resource::ResourceKind,
    resource_subsystem::{purge_depleted, ResourceSubsystem},
    rng::{RngBank, SubsystemRng, SubsystemSlot},
    snapshot::WorldSnapshot,
    standings::{CombatStats, Outcome, Standings},
    subsystem::SimSubsystem,
    types::{RunId, Tick, UnitId},
    unit::{Unit, UnitKind},
    unit_subsystem::UnitSubsystem,
    world::World,
};
use chrono::{DateTime, Utc};

pub struct SimEngine {
    pub run_id:   RunId,
    pub clock:    SimClock,
    pub rng_bank: RngBank,
    pub world:    World,
    seed:         u64,
    subsystems:   Vec<(SubsystemSlot, Box<dyn SimSubsystem>)>,
    wall_clock:   Box<dyn WallClock>,
    config:       SimConfig,
    event_log:    EventLog,
    /// Distinguishes the RNG streams of commands issued within one tick.
    command_seq:  u64,
}

impl SimEngine {
    /// An engine with an empty world and no subsystems.
    pub fn new(
        run_id:     RunId,
        seed:       u64,
        config:     SimConfig,
        wall_clock: Box<dyn WallClock>,
    ) -> SimResult<Self> {
        let world = World::new(config.world.width, config.world.height)?;
        Ok(Self {
            clock:       SimClock::new(run_id.clone()),
            rng_bank:    RngBank::new(seed),
            world,
            seed,
            subsystems:  Vec::new(),
            wall_clock,
            event_log:   EventLog::new(config.events.event_log_capacity),
            config,
            command_seq: 0,
            run_id,
        })
    }

    /// Build a fully wired engine with all subsystems registered and the
    /// initial world populated. Call this instead of new() + register().
    /// The clock comes back running; `new` leaves it paused.
    pub fn build(
        run_id:     RunId,
        seed:       u64,
        config:     SimConfig,
        wall_clock: Box<dyn WallClock>,
    ) -> SimResult<Self> {
        let started_at = wall_clock.now();
        let mut engine = SimEngine::new(run_id, seed, config, wall_clock)?;

        // EXECUTION ORDER is fixed. Never reorder.
        engine.register(
            SubsystemSlot::Flag,
            Box::new(FlagSubsystem::new(&engine.config.events, started_at)),
        );
        engine.register(
            SubsystemSlot::Unit,
            Box::new(UnitSubsystem::new(
                engine.config.units.clone(),
                engine.config.resources.clone(),
            )),
        );
        engine.register(SubsystemSlot::Resource, Box::new(ResourceSubsystem::new()));
        engine.register(SubsystemSlot::Collectable, Box::new(CollectableSubsystem::new()));
        engine.register(
            SubsystemSlot::City,
            Box::new(CitySubsystem::new(engine.config.city.clone())),
        );
        engine.register(SubsystemSlot::Combat, Box::new(CombatSubsystem::new()));

        engine.populate()?;
        engine.clock.resume();
        Ok(engine)
    }

    /// Test engine: empty world, default rules, virtual wall clock.
    pub fn build_test(run_id: RunId, seed: u64, clock: ManualClock) -> SimResult<Self> {
        Self::build(run_id, seed, SimConfig::default_test(), Box::new(clock))
    }

    /// Register a subsystem. Call in the documented execution order.
    pub fn register(&mut self, slot: SubsystemSlot, subsystem: Box<dyn SimSubsystem>) {
        self.subsystems.push((slot, subsystem));
    }

    /// Seed the world and record tick-0 events.
    fn populate(&mut self) -> SimResult<()> {
        let mut rng = self.rng_bank.for_subsystem_at_tick(SubsystemSlot::Setup, 0);
        let mut events = vec![SimEvent::RunInitialized {
            run_id: self.run_id.clone(),
            seed:   self.seed,
        }];

        let resources = self.config.resources.clone();
        for _ in 0..self.config.world.initial_trees {
            let Some(anchor) = self.world.find_random_free_position(&mut rng) else {
                break;
            };
            let quantity = resources.initial_quantity(ResourceKind::Wood);
            let resource_id = self.world.add_resource(
                ResourceKind::Wood, anchor, quantity, resources.max_quantity(ResourceKind::Wood),
            )?;
            events.push(SimEvent::ResourceSpawned { tick: 0, resource_id, kind: ResourceKind::Wood, anchor, quantity });
        }

        for _ in 0..self.config.world.initial_rocks {
            let Some(anchor) = self.world.find_random_free_position(&mut rng) else {
                break;
            };
            if !self.world.can_place_2x2(anchor) {
                continue;
            }
            let quantity = resources.initial_quantity(ResourceKind::Ore);
            let resource_id = self.world.add_resource(
                ResourceKind::Ore, anchor, quantity, resources.max_quantity(ResourceKind::Ore),
            )?;
            events.push(SimEvent::ResourceSpawned { tick: 0, resource_id, kind: ResourceKind::Ore, anchor, quantity });
        }

        if self.config.world.starting_units {
            let (w, h) = (self.world.width(), self.world.height());
            let starters = [
                (Faction::North, UnitKind::Lumberjack, Position::new(1, 1)),
                (Faction::South, UnitKind::Assassin,   Position::new(w - 2, h - 2)),
            ];
            for (faction, kind, position) in starters {
                if !self.world.is_free(position) {
                    log::warn!("tick=0 starting {faction} {kind} skipped: {position} is taken");
                    continue;
                }
                let unit_id = self.world.add_unit(faction, kind, position)?;
                events.push(SimEvent::UnitSpawned {
                    tick: 0, unit_id, faction, kind, position, source: SpawnSource::Setup,
                });
            }
        }

        log::info!(
            "tick=0 run {} initialized: seed={} resources={} units={}",
            self.run_id, self.seed, self.world.resources().len(), self.world.units().len()
        );
        for event in &events {
            record(&mut self.event_log, 0, "setup", event)?;
        }
        Ok(())
    }

    /// Advance one tick. This is the core simulation step.
    pub fn tick(&mut self) -> SimResult<Vec<SimEvent>> {
        let current_tick = self.clock.advance().ok_or(SimError::EnginePaused)?;
        let now = self.wall_clock.now();

        let mut tick_events: Vec<SimEvent> = vec![
            SimEvent::TickStarted { tick: current_tick }
        ];

        // Execute each subsystem in registration order.
        for (slot, subsystem) in &mut self.subsystems {
            let mut rng = self.rng_bank.for_subsystem_at_tick(*slot, current_tick);
            let new_events = subsystem.update(current_tick, now, &mut self.world, &mut rng)?;

            for event in &new_events {
                record(&mut self.event_log, current_tick, subsystem.name(), event)?;
            }
            tick_events.extend(new_events);
        }

        let purged = self.world.purge_dead_units();
        if !purged.is_empty() {
            log::debug!("tick={current_tick} purged {} dead units", purged.len());
            let event = SimEvent::UnitsPurged { tick: current_tick, unit_ids: purged };
            record(&mut self.event_log, current_tick, "engine", &event)?;
            tick_events.push(event);

            self.world.refresh_growing();
            for event in purge_depleted(&mut self.world, current_tick) {
                record(&mut self.event_log, current_tick, "engine", &event)?;
                tick_events.push(event);
            }
        }

        tick_events.push(SimEvent::TickCompleted { tick: current_tick });
        Ok(tick_events)
    }

    /// One tick, discarding the events. Fails with `EnginePaused` while
    /// the clock is paused.
    pub fn advance(&mut self) -> SimResult<()> {
        self.tick().map(|_| ())
    }

    /// Run n ticks in a loop. Used for testing and fast-forward.
    /// Leaves the pause state as the caller set it.
    pub fn run_ticks(&mut self, n: u64) -> SimResult<()> {
        for _ in 0..n {
            self.tick()?;
        }
        Ok(())
    }

    // ── Commands ────────────────────────────────────────────────────

    /// Apply a command now. Gameplay no-ops (no free cell, flag already
    /// up) return no events; structural violations return an error.
    pub fn apply_command(&mut self, command: SimCommand) -> SimResult<Vec<SimEvent>> {
        let tick = self.clock.current_tick;
        let now = self.wall_clock.now();
        let mut rng = self.rng_bank.for_stream(SubsystemSlot::Command, tick, self.command_seq);
        self.command_seq += 1;
        log::debug!("tick={tick} command {}", command.type_name());

        let events = match command {
            SimCommand::Pause      => self.change_clock(tick, SimClock::pause),
            SimCommand::Resume     => self.change_clock(tick, SimClock::resume),
            SimCommand::SpeedUp    => self.change_clock(tick, SimClock::speed_up),
            SimCommand::SlowDown   => self.change_clock(tick, SimClock::slow_down),
            SimCommand::ResetSpeed => self.change_clock(tick, SimClock::reset_speed),
            SimCommand::SetSpeed { multiplier } => {
                self.change_clock(tick, |clock| clock.set_speed(multiplier))
            }

            SimCommand::SpawnUnit { kind, faction } => self.spawn_near_city(tick, faction, kind)?,
            SimCommand::SpawnRandomUnit { faction } => {
                let index = rng.pick_index(UnitKind::ALL.len()).unwrap_or(0);
                self.spawn_near_city(tick, faction, UnitKind::ALL[index])?
            }
            SimCommand::RemoveUnits { filter } => {
                let unit_ids = self.world.remove_units_where(|u| filter.matches(u));
                log::info!("tick={tick} removed {} units ({filter:?})", unit_ids.len());
                vec![SimEvent::UnitsRemoved { tick, unit_ids }]
            }

            SimCommand::ClearResources => {
                let count = self.world.clear_resources();
                log::info!("tick={tick} cleared {count} resources");
                vec![SimEvent::ResourcesCleared { tick, count }]
            }
            SimCommand::SpawnFlag => {
                let lifetime = self.config.events.flag_lifetime();
                let mut events: Vec<SimEvent> =
                    raise_flag(&mut self.world, tick, now, lifetime, &mut rng, true)?.into_iter().collect();
                events.extend(sync_movement_override(&mut self.world, tick));
                events
            }
            SimCommand::SpawnPhilosopherStone => self.spawn_stone(tick, &mut rng)?,
            SimCommand::SpawnTree { position } => self.spawn_resource(tick, ResourceKind::Wood, position)?,
            SimCommand::SpawnRock { position } => self.spawn_resource(tick, ResourceKind::Ore, position)?,
        };

        for event in &events {
            record(&mut self.event_log, tick, "command", event)?;
        }
        Ok(events)
    }

    fn change_clock<F>(&mut self, tick: Tick, change: F) -> Vec<SimEvent>
    where
        F: FnOnce(&mut SimClock),
    {
        change(&mut self.clock);
        log::info!(
            "tick={tick} clock {} at {}",
            if self.clock.paused { "paused" } else { "running" },
            self.clock.speed_label()
        );
        vec![SimEvent::ClockChanged { tick, paused: self.clock.paused, speed: self.clock.speed }]
    }

    fn spawn_near_city(&mut self, tick: Tick, faction: Faction, kind: UnitKind) -> SimResult<Vec<SimEvent>> {
        let center = self.world.city_position(faction);
        let Some(position) = self.world.find_spawn_position(center, self.config.city.spawn_radius) else {
            log::warn!("tick={tick} no room near the {faction} city for a {kind}");
            return Ok(Vec::new());
        };
        let unit_id = self.world.add_unit(faction, kind, position)?;
        log::info!("tick={tick} spawned {faction} {kind} {unit_id} at {position}");
        Ok(vec![SimEvent::UnitSpawned { tick, unit_id, faction, kind, position, source: SpawnSource::Command }])
    }

    fn spawn_stone(&mut self, tick: Tick, rng: &mut SubsystemRng) -> SimResult<Vec<SimEvent>> {
        let Some(position) = self.world.find_random_free_position(rng) else {
            log::warn!("tick={tick} no free cell for a philosopher stone");
            return Ok(Vec::new());
        };
        let collectable_id = self.world.add_philosopher_stone(position)?;
        log::info!("tick={tick} philosopher stone {collectable_id} at {position}");
        Ok(vec![SimEvent::StoneSpawned { tick, collectable_id, position }])
    }

    fn spawn_resource(&mut self, tick: Tick, kind: ResourceKind, anchor: Position) -> SimResult<Vec<SimEvent>> {
        let quantity = self.config.resources.initial_quantity(kind);
        let max = self.config.resources.max_quantity(kind);
        let resource_id = self.world.add_resource(kind, anchor, quantity, max)?;
        log::info!("tick={tick} spawned {} {resource_id} at {anchor}", kind.object_name());
        Ok(vec![SimEvent::ResourceSpawned { tick, resource_id, kind, anchor, quantity }])
    }

    pub fn spawn_unit(&mut self, kind: UnitKind, faction: Faction) -> SimResult<Vec<SimEvent>> {
        self.apply_command(SimCommand::SpawnUnit { kind, faction })
    }

    pub fn spawn_random_unit(&mut self, faction: Faction) -> SimResult<Vec<SimEvent>> {
        self.apply_command(SimCommand::SpawnRandomUnit { faction })
    }

    pub fn spawn_flag(&mut self) -> SimResult<Vec<SimEvent>> {
        self.apply_command(SimCommand::SpawnFlag)
    }

    pub fn spawn_philosopher_stone(&mut self) -> SimResult<Vec<SimEvent>> {
        self.apply_command(SimCommand::SpawnPhilosopherStone)
    }

    pub fn clear_resources(&mut self) -> SimResult<Vec<SimEvent>> {
        self.apply_command(SimCommand::ClearResources)
    }

    /// Remove every unit matching an arbitrary predicate.
    pub fn remove_units_where<P>(&mut self, predicate: P) -> SimResult<Vec<UnitId>>
    where
        P: Fn(&Unit) -> bool,
    {
        let tick = self.clock.current_tick;
        let unit_ids = self.world.remove_units_where(predicate);
        let event = SimEvent::UnitsRemoved { tick, unit_ids: unit_ids.clone() };
        record(&mut self.event_log, tick, "command", &event)?;
        Ok(unit_ids)
    }

    // ── Queries ─────────────────────────────────────────────────────

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.wall_clock.now()
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot::capture(&self.world, &self.clock, self.now())
    }

    pub fn standings(&self) -> Standings {
        Standings::compute(&self.world)
    }

    pub fn outcome(&self) -> Outcome {
        self.standings().outcome()
    }

    pub fn combat_stats(&self) -> CombatStats {
        CombatStats::compute(&self.world)
    }

    pub fn flag_active(&self) -> bool {
        self.world.has_active_flag()
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    /// Used by the determinism test and tooling.
    pub fn events_for_tick(&self, tick: Tick) -> Vec<&EventLogEntry> {
        self.event_log.for_tick(tick)
    }

    /// Query the FlagSubsystem's schedule.
    pub fn flag_subsystem(&self) -> Option<&FlagSubsystem> {
        self.subsystems
            .iter()
            .find_map(|(_, sub)| sub.as_any().downcast_ref::<FlagSubsystem>())
    }
}

fn record(log: &mut EventLog, tick: Tick, subsystem: &str, event: &SimEvent) -> SimResult<()> {
    log.push(EventLogEntry {
        tick,
        subsystem:  subsystem.to_string(),
        event_type: event_type_name(event).to_string(),
        payload:    serde_json::to_string(event)?,
    });
    Ok(())
}

/// Extract a stable string name from a SimEvent variant.
/// Used for the event_type field of the event log.
pub fn event_type_name(event: &SimEvent) -> &'static str {
    match event {
        SimEvent::TickStarted { .. }             => "tick_started",
        SimEvent::TickCompleted { .. }           => "tick_completed",
        SimEvent::RunInitialized { .. }          => "run_initialized",
        SimEvent::UnitsPurged { .. }             => "units_purged",
        SimEvent::ResourceCollected { .. }       => "resource_collected",
        SimEvent::ResourceSown { .. }            => "resource_sown",
        SimEvent::SowingCompleted { .. }         => "sowing_completed",
        SimEvent::SowingAbandoned { .. }         => "sowing_abandoned",
        SimEvent::UnitTeleported { .. }          => "unit_teleported",
        SimEvent::ResourceDepleted { .. }        => "resource_depleted",
        SimEvent::ResourceSpawned { .. }         => "resource_spawned",
        SimEvent::ResourcesCleared { .. }        => "resources_cleared",
        SimEvent::UnitSpawned { .. }             => "unit_spawned",
        SimEvent::ProductionSkipped { .. }       => "production_skipped",
        SimEvent::UnitEliminated { .. }          => "unit_eliminated",
        SimEvent::CombatResolved { .. }          => "combat_resolved",
        SimEvent::FlagRaised { .. }              => "flag_raised",
        SimEvent::FlagExpired { .. }             => "flag_expired",
        SimEvent::MovementOverrideChanged { .. } => "movement_override_changed",
        SimEvent::StoneSpawned { .. }            => "stone_spawned",
        SimEvent::UnitsRemoved { .. }            => "units_removed",
        SimEvent::ClockChanged { .. }            => "clock_changed",
    }
}
