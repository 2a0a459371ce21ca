//! Combat subsystem: adjacency-triggered elimination lottery.
//!
//! Runs after all movement. Two living units are combative when they
//! are enemies, adjacent, and at least one is an assassin.
//!
//! Grouping is a single-hop star: a seed unit plus every unit directly
//! combative with it. Members of a multi-member group do not seed
//! further groups this tick, but may still join a later seed's group.
//!
//! Resolution: while more than one faction remains in the group, one
//! member is drawn uniformly and eliminated. Kind has no bearing on the
//! draw.

use crate::{
    error::SimResult,
    event::SimEvent,
    faction::Faction,
    rng::SubsystemRng,
    subsystem::SimSubsystem,
    types::{Tick, UnitId},
    unit::Unit,
    world::World,
};
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Combat groups in seed order. Every returned group has at least two
/// members, the seed first.
pub fn find_combat_groups(world: &World) -> Vec<Vec<UnitId>> {
    let living: Vec<&Unit> = world.units().iter().filter(|u| u.alive).collect();
    let mut processed: HashSet<UnitId> = HashSet::new();
    let mut groups = Vec::new();

    for seed in &living {
        if processed.contains(&seed.id) {
            continue;
        }
        let mut group = vec![seed.id];
        group.extend(
            living
                .iter()
                .filter(|other| other.id != seed.id && seed.is_combative_with(other))
                .map(|other| other.id),
        );
        if group.len() > 1 {
            processed.extend(group.iter().copied());
            groups.push(group);
        }
    }
    groups
}

fn distinct_factions(world: &World, members: &[UnitId]) -> usize {
    let factions: HashSet<Faction> = members
        .iter()
        .filter_map(|id| world.unit(*id))
        .map(|u| u.faction)
        .collect();
    factions.len()
}

fn drop_dead(world: &World, members: &mut Vec<UnitId>) {
    members.retain(|id| world.unit(*id).is_some_and(|u| u.alive));
}

/// Run the lottery on one group until at most one faction is left.
pub fn resolve_group(
    world: &mut World,
    group: &[UnitId],
    tick:  Tick,
    rng:   &mut SubsystemRng,
) -> SimResult<Vec<SimEvent>> {
    let mut events = Vec::new();
    let mut members = group.to_vec();
    drop_dead(world, &mut members);

    while distinct_factions(world, &members) > 1 {
        let Some(index) = rng.pick_index(members.len()) else {
            break;
        };
        let victim_id = members.remove(index);
        world.kill_unit(victim_id)?;
        if let Some(victim) = world.unit(victim_id) {
            log::debug!("tick={tick} {} {} {victim_id} eliminated", victim.faction, victim.kind);
            events.push(SimEvent::UnitEliminated {
                tick,
                unit_id:  victim_id,
                faction:  victim.faction,
                kind:     victim.kind,
                position: victim.position,
            });
        }
        drop_dead(world, &mut members);
    }

    let winner = members.first().and_then(|id| world.unit(*id)).map(|u| u.faction);
    events.push(SimEvent::CombatResolved {
        tick,
        members:   group.to_vec(),
        survivors: members,
        winner,
    });
    Ok(events)
}

#[derive(Debug, Default)]
pub struct CombatSubsystem;

impl CombatSubsystem {
    pub fn new() -> Self {
        Self
    }
}

impl SimSubsystem for CombatSubsystem {
    fn name(&self) -> &'static str { "combat" }

    fn update(
        &mut self,
        tick: Tick,
        _now: DateTime<Utc>,
        world: &mut World,
        rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>> {
        let mut events = Vec::new();
        for group in find_combat_groups(world) {
            events.extend(resolve_group(world, &group, tick, rng)?);
        }
        Ok(events)
    }

    fn as_any(&self) -> &dyn std::any::Any { self }
}
