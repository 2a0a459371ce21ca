//! Unit subsystem: the per-unit update template.
//!
//! For each living unit, in registry order:
//!   1. kind-specific state update (targeting, harvesting, sowing)
//!   2. movement: the effective policy proposes a cell; the move happens
//!      only if the cell differs, is in bounds and is free
//!   3. contact with every collectable on the unit's cell
//!
//! Later units see the moves of earlier ones. Nothing retries.

use crate::{
    collectable::CollectableKind,
    config::{ResourceConfig, UnitConfig},
    error::SimResult,
    event::SimEvent,
    faction::Faction,
    geometry::Position,
    resource::ResourceKind,
    rng::SubsystemRng,
    sowing::{decide_plan, is_adjacent_to_plan, plan_is_placeable},
    subsystem::SimSubsystem,
    types::{ResourceId, Tick, UnitId},
    unit::{SowerState, Unit, UnitKind, UnitState},
    world::World,
};
use chrono::{DateTime, Utc};

pub struct UnitSubsystem {
    units:     UnitConfig,
    resources: ResourceConfig,
}

impl UnitSubsystem {
    pub fn new(units: UnitConfig, resources: ResourceConfig) -> Self {
        Self { units, resources }
    }

    fn harvest_rate(&self, kind: UnitKind) -> u32 {
        match kind {
            UnitKind::Lumberjack => self.units.lumberjack_rate,
            UnitKind::Miner      => self.units.miner_rate,
            _ => 0,
        }
    }

    fn update_state(
        &self,
        unit:   &mut Unit,
        tick:   Tick,
        world:  &mut World,
        rng:    &mut SubsystemRng,
        events: &mut Vec<SimEvent>,
    ) -> SimResult<()> {
        match unit.kind {
            UnitKind::Lumberjack | UnitKind::Miner => self.update_collector(unit, tick, world, events),
            UnitKind::Assassin => update_assassin(unit, world),
            UnitKind::Sower    => return self.update_sower(unit, tick, world, rng, events),
        }
        Ok(())
    }

    fn update_collector(&self, unit: &mut Unit, tick: Tick, world: &mut World, events: &mut Vec<SimEvent>) {
        let rate = self.harvest_rate(unit.kind);
        let UnitState::Collector(state) = &mut unit.state else {
            return;
        };
        state.collecting = false;

        if let Some(id) = state.target {
            let target = world.resource(id).map(|r| (r.is_empty(), r.is_adjacent_to(unit.position), r.kind));
            match target {
                None | Some((true, _, _)) => state.target = None,
                Some((false, true, kind)) => {
                    let (taken, exhausted) = world
                        .resource_mut(id)
                        .map(|r| (r.take(rate), r.is_empty()))
                        .unwrap_or((0, true));
                    if taken > 0 {
                        world.city_mut(unit.faction).credit(kind, taken);
                        state.collecting = true;
                        log::debug!("tick={tick} {} {} harvested {taken} from {id}", unit.faction, unit.id);
                        events.push(SimEvent::ResourceCollected {
                            tick,
                            unit_id: unit.id,
                            faction: unit.faction,
                            resource_id: id,
                            kind,
                            amount: taken,
                        });
                    }
                    if exhausted {
                        state.target = None;
                        state.collecting = false;
                    }
                }
                // Not adjacent yet: movement closes the gap.
                Some((false, false, _)) => {}
            }
        }

        if state.target.is_none() {
            state.target = acquire_resource(world, unit.position, state.preferred);
        }
    }

    fn update_sower(
        &self,
        unit:   &mut Unit,
        tick:   Tick,
        world:  &mut World,
        rng:    &mut SubsystemRng,
        events: &mut Vec<SimEvent>,
    ) -> SimResult<()> {
        let UnitState::Sower(state) = &mut unit.state else {
            return Ok(());
        };

        match state.clone() {
            SowerState::Sowing { resource: resource_id } => {
                let next = match world.resource_mut(resource_id) {
                    None => {
                        log::debug!("tick={tick} sower {} lost {resource_id}", unit.id);
                        SowerState::Seeking { plan: None }
                    }
                    Some(r) if r.is_adjacent_to(unit.position) => {
                        r.add(self.units.sow_rate);
                        if r.is_full() {
                            r.growing = false;
                            events.push(SimEvent::SowingCompleted {
                                tick,
                                unit_id: unit.id,
                                resource_id,
                                quantity: r.quantity(),
                            });
                            log::debug!("tick={tick} sower {} finished {resource_id}", unit.id);
                            SowerState::Seeking { plan: None }
                        } else {
                            SowerState::Sowing { resource: resource_id }
                        }
                    }
                    Some(r) => {
                        r.growing = false;
                        events.push(SimEvent::SowingAbandoned {
                            tick,
                            unit_id: unit.id,
                            resource_id,
                            quantity: r.quantity(),
                        });
                        log::debug!("tick={tick} sower {} abandoned {resource_id} at {}", unit.id, r.quantity());
                        SowerState::Seeking { plan: None }
                    }
                };
                *state = next;
            }
            // The resource is created only once the sower stands next to
            // the planned site; until then the plan is only a target.
            SowerState::Seeking { plan } => {
                let mut current = plan.filter(|p| plan_is_placeable(world, p));
                if current.is_none() {
                    current = decide_plan(world, rng, self.units.rock_site_attempts);
                }
                match current {
                    Some(p) if is_adjacent_to_plan(unit.position, &p) => {
                        let max = self.resources.max_quantity(p.kind);
                        let resource_id = world.add_growing_resource(p.kind, p.site, max)?;
                        log::debug!(
                            "tick={tick} sower {} planted {} {resource_id} at {}",
                            unit.id, p.kind.object_name(), p.site
                        );
                        events.push(SimEvent::ResourceSown {
                            tick,
                            unit_id: unit.id,
                            resource_id,
                            kind: p.kind,
                            anchor: p.site,
                        });
                        *state = SowerState::Sowing { resource: resource_id };
                    }
                    other => *state = SowerState::Seeking { plan: other },
                }
            }
        }
        Ok(())
    }
}

/// Nearest preferred-kind resource with quantity left; failing that, the
/// nearest resource of any kind that still has a free collection cell.
pub fn acquire_resource(world: &World, from: Position, preferred: ResourceKind) -> Option<ResourceId> {
    world
        .find_nearest_resource(from, |r| r.kind == preferred && r.can_be_collected())
        .or_else(|| {
            world.find_nearest_resource(from, |r| {
                r.can_be_collected() && world.has_free_collection_position(r)
            })
        })
        .map(|r| r.id)
}

/// Nearest enemy assassin, else nearest enemy collector, else nearest
/// enemy sower.
pub fn acquire_enemy(world: &World, from: Position, faction: Faction) -> Option<UnitId> {
    let enemy = faction.opponent();
    world
        .find_nearest_unit(from, |u| u.faction == enemy && u.kind == UnitKind::Assassin)
        .or_else(|| world.find_nearest_unit(from, |u| u.faction == enemy && u.is_collector()))
        .or_else(|| world.find_nearest_unit(from, |u| u.faction == enemy && u.kind == UnitKind::Sower))
        .map(|u| u.id)
}

fn update_assassin(unit: &mut Unit, world: &World) {
    let UnitState::Assassin { target } = &mut unit.state else {
        return;
    };
    let still_alive = target
        .and_then(|id| world.unit(id))
        .is_some_and(|t| t.alive);
    if !still_alive {
        *target = acquire_enemy(world, unit.position, unit.faction);
    }
}

fn handle_contacts(
    index:  usize,
    tick:   Tick,
    world:  &mut World,
    rng:    &mut SubsystemRng,
    events: &mut Vec<SimEvent>,
) {
    let stones: Vec<_> = world
        .collectables()
        .iter()
        .map(|c| (c.position, matches!(c.kind, CollectableKind::PhilosopherStone)))
        .collect();

    for (position, is_stone) in stones {
        let unit = world.unit_at_index(index);
        if position != unit.position || !is_stone {
            // Flags have no contact effect of their own.
            continue;
        }
        let (unit_id, from) = (unit.id, unit.position);
        match world.find_random_free_position(rng) {
            Some(to) => {
                world.unit_at_index_mut(index).position = to;
                log::info!("tick={tick} {unit_id} teleported from {from} to {to}");
                events.push(SimEvent::UnitTeleported { tick, unit_id, from, to });
            }
            None => log::warn!("tick={tick} no free cell to teleport {unit_id} to"),
        }
    }
}

impl SimSubsystem for UnitSubsystem {
    fn name(&self) -> &'static str { "unit" }

    fn update(
        &mut self,
        tick: Tick,
        _now: DateTime<Utc>,
        world: &mut World,
        rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>> {
        let mut events = Vec::new();

        for index in 0..world.unit_count() {
            if !world.unit_at_index(index).alive {
                continue;
            }
            let mut unit = world.unit_at_index(index).clone();

            self.update_state(&mut unit, tick, world, rng, &mut events)?;

            let policy = world.policy_for(&unit);
            let candidate = policy.next_position(&unit, world, rng);
            if candidate != unit.position && world.is_free(candidate) {
                unit.position = candidate;
            }
            world.replace_unit_at_index(index, unit);

            handle_contacts(index, tick, world, rng, &mut events);
        }
        Ok(events)
    }

    fn as_any(&self) -> &dyn std::any::Any { self }
}
