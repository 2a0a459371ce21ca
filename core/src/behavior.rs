//! Movement policies.
//!
//! A policy is a pure function of (unit, world, rng) to the cell the
//! unit would like to occupy next. The unit subsystem decides whether
//! the move is applied, so a policy may return a blocked cell.

use crate::{
    geometry::Position,
    rng::SubsystemRng,
    unit::{SowerState, Unit, UnitState},
    world::World,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementPolicy {
    /// Greedy step toward the collection target, stay if blocked.
    Collector,
    /// Greedy step toward the enemy target, wander without one.
    Assassin,
    /// Stay while sowing, else head for the planned site.
    Sower,
    /// A random free neighbour. Installed globally while a flag is up.
    Random,
}

impl MovementPolicy {
    pub fn next_position(&self, unit: &Unit, world: &World, rng: &mut SubsystemRng) -> Position {
        match self {
            Self::Collector => collector_move(unit, world),
            Self::Assassin  => assassin_move(unit, world, rng),
            Self::Sower     => sower_move(unit, world, rng),
            Self::Random    => random_neighbor(unit.position, world, rng),
        }
    }
}

fn collector_move(unit: &Unit, world: &World) -> Position {
    match unit.target_resource().and_then(|id| world.resource(id)) {
        Some(target) => step_or_stay(unit.position, target.anchor, world),
        None => unit.position,
    }
}

fn assassin_move(unit: &Unit, world: &World, rng: &mut SubsystemRng) -> Position {
    let target = unit
        .target_unit()
        .and_then(|id| world.unit(id))
        .filter(|t| t.alive);
    match target {
        Some(t) => step_or_stay(unit.position, t.position, world),
        None => random_neighbor(unit.position, world, rng),
    }
}

fn sower_move(unit: &Unit, world: &World, rng: &mut SubsystemRng) -> Position {
    match &unit.state {
        UnitState::Sower(SowerState::Sowing { .. }) => unit.position,
        UnitState::Sower(SowerState::Seeking { plan: Some(plan) }) => {
            let step = unit.position.step_toward(plan.site);
            if step != unit.position && world.is_free(step) {
                step
            } else {
                random_neighbor(unit.position, world, rng)
            }
        }
        _ => random_neighbor(unit.position, world, rng),
    }
}

/// One greedy step toward `to`, or `from` when that cell is taken.
pub fn step_or_stay(from: Position, to: Position, world: &World) -> Position {
    if from == to {
        return from;
    }
    let next = from.step_toward(to);
    if world.is_free(next) {
        next
    } else {
        from
    }
}

/// Shuffle the 8 neighbours and take the first free one, else stay.
pub fn random_neighbor(from: Position, world: &World, rng: &mut SubsystemRng) -> Position {
    let mut candidates = from.neighbors();
    rng.shuffle(&mut candidates);
    candidates
        .into_iter()
        .find(|p| world.is_free(*p))
        .unwrap_or(from)
}
