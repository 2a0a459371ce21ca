//! Sowing site selection.
//!
//! A seeking sower makes one decision: a resource kind (50/50) and a
//! site for it. The decision is kept in the sower's state and followed
//! by its movement policy until the resource is planted or the site
//! becomes unplaceable.

use crate::{
    geometry::Position,
    resource::{touches_footprint, Resource, ResourceKind},
    rng::SubsystemRng,
    unit::SowingPlan,
    world::World,
};

pub fn decide_plan(world: &World, rng: &mut SubsystemRng, rock_attempts: u32) -> Option<SowingPlan> {
    let kind = if rng.chance(0.5) { ResourceKind::Wood } else { ResourceKind::Ore };
    let site = match kind {
        ResourceKind::Wood => find_tree_site(world, rng),
        ResourceKind::Ore  => find_rock_site(world, rng, rock_attempts),
    }?;
    Some(SowingPlan { kind, site })
}

/// First free neighbour of an existing tree, in registry order; else any
/// random free cell.
pub fn find_tree_site(world: &World, rng: &mut SubsystemRng) -> Option<Position> {
    let beside_tree = world
        .resources()
        .iter()
        .filter(|r| r.kind == ResourceKind::Wood)
        .flat_map(|r| r.anchor.neighbors())
        .find(|p| world.is_free(*p));
    beside_tree.or_else(|| world.find_random_free_position(rng))
}

/// Among `attempts` random free cells that can host a 2×2 rock, the one
/// farthest from its nearest existing rock.
pub fn find_rock_site(world: &World, rng: &mut SubsystemRng, attempts: u32) -> Option<Position> {
    let rocks: Vec<&Resource> = world
        .resources()
        .iter()
        .filter(|r| r.kind == ResourceKind::Ore)
        .collect();

    let mut best: Option<Position> = None;
    let mut best_min_distance = 0.0_f64;
    for _ in 0..attempts {
        let Some(candidate) = world.find_random_free_position(rng) else {
            break;
        };
        if !world.can_place_2x2(candidate) {
            continue;
        }
        let min_distance = rocks
            .iter()
            .map(|r| candidate.distance_to(r.anchor))
            .fold(f64::MAX, f64::min);
        if min_distance > best_min_distance {
            best_min_distance = min_distance;
            best = Some(candidate);
        }
    }
    best
}

pub fn plan_is_placeable(world: &World, plan: &SowingPlan) -> bool {
    world.can_place_resource(plan.kind, plan.site)
}

/// True if `pos` touches the footprint `plan` would occupy.
pub fn is_adjacent_to_plan(pos: Position, plan: &SowingPlan) -> bool {
    touches_footprint(plan.kind, plan.site, pos)
}
