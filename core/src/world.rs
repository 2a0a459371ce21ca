//! The world model: grid bounds, occupancy, and the four registries.
//!
//! RULE: The World exclusively owns every entity. Other code holds ids
//! and re-resolves them each tick; a missing id is a normal condition.
//!
//! Blocking kinds are living units, resource footprint cells and cities.
//! Collectables never block.

use crate::{
    behavior::MovementPolicy,
    city::City,
    collectable::Collectable,
    error::{SimError, SimResult},
    faction::Faction,
    geometry::Position,
    resource::{footprint_cells, Resource, ResourceKind},
    rng::SubsystemRng,
    types::{CollectableId, ResourceId, UnitId},
    unit::{SowerState, Unit, UnitKind, UnitState},
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The top-most element on a cell.
/// Priority: unit > resource > city > collectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "element", content = "id", rename_all = "snake_case")]
pub enum ElementRef {
    Unit(UnitId),
    Resource(ResourceId),
    City(Faction),
    Collectable(CollectableId),
}

#[derive(Debug, Clone)]
pub struct World {
    width:  i32,
    height: i32,
    units:        Vec<Unit>,
    resources:    Vec<Resource>,
    cities:       Vec<City>,
    collectables: Vec<Collectable>,
    /// Indexed by `Faction::index()`. Cities never move.
    city_positions: [Position; 2],
    /// Global random-movement override, set while a flag is active.
    movement_override: bool,
    next_unit_id:        u64,
    next_resource_id:    u64,
    next_collectable_id: u64,
}

impl World {
    /// An empty grid with North's city at (0, 0) and South's at the
    /// opposite corner.
    pub fn new(width: i32, height: i32) -> SimResult<Self> {
        if width < 1 || height < 1 || (width == 1 && height == 1) {
            return Err(SimError::InvalidDimensions { width, height });
        }
        let north = Position::new(0, 0);
        let south = Position::new(width - 1, height - 1);
        Ok(Self {
            width,
            height,
            units:        Vec::new(),
            resources:    Vec::new(),
            cities:       vec![City::new(Faction::North, north), City::new(Faction::South, south)],
            collectables: Vec::new(),
            city_positions: [north, south],
            movement_override: false,
            next_unit_id:        1,
            next_resource_id:    1,
            next_collectable_id: 1,
        })
    }

    pub fn width(&self)  -> i32 { self.width }
    pub fn height(&self) -> i32 { self.height }

    // ── Occupancy ───────────────────────────────────────────────────

    pub fn is_valid(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    /// Valid, and not covered by a living unit, a resource or a city.
    pub fn is_free(&self, pos: Position) -> bool {
        self.is_valid(pos) && !self.is_blocked(pos)
    }

    fn is_blocked(&self, pos: Position) -> bool {
        self.units.iter().any(|u| u.alive && u.position == pos)
            || self.resources.iter().any(|r| r.occupies(pos))
            || self.city_positions.contains(&pos)
    }

    pub fn can_place_2x2(&self, top_left: Position) -> bool {
        self.can_place_resource(ResourceKind::Ore, top_left)
    }

    pub fn can_place_resource(&self, kind: ResourceKind, anchor: Position) -> bool {
        footprint_cells(kind, anchor).into_iter().all(|p| self.is_free(p))
    }

    /// Every free cell, x outer and y inner.
    pub fn free_positions(&self) -> Vec<Position> {
        let mut cells = Vec::new();
        for x in 0..self.width {
            for y in 0..self.height {
                let pos = Position::new(x, y);
                if self.is_free(pos) {
                    cells.push(pos);
                }
            }
        }
        cells
    }

    /// Uniform over all free cells. None when the grid is full.
    pub fn find_random_free_position(&self, rng: &mut SubsystemRng) -> Option<Position> {
        let cells = self.free_positions();
        rng.pick_index(cells.len()).map(|i| cells[i])
    }

    /// First free cell on the perimeter rings around `center`, radius 1
    /// outward to `max_radius`.
    pub fn find_spawn_position(&self, center: Position, max_radius: i32) -> Option<Position> {
        (1..=max_radius)
            .flat_map(|r| center.ring(r))
            .find(|p| self.is_free(*p))
    }

    // ── Point queries ───────────────────────────────────────────────

    pub fn units_at(&self, pos: Position) -> Vec<&Unit> {
        self.units.iter().filter(|u| u.alive && u.position == pos).collect()
    }

    pub fn element_at(&self, pos: Position) -> Option<ElementRef> {
        if !self.is_valid(pos) {
            return None;
        }
        if let Some(unit) = self.units.iter().find(|u| u.alive && u.position == pos) {
            return Some(ElementRef::Unit(unit.id));
        }
        if let Some(resource) = self.resources.iter().find(|r| r.occupies(pos)) {
            return Some(ElementRef::Resource(resource.id));
        }
        if let Some(city) = self.cities.iter().find(|c| c.position == pos) {
            return Some(ElementRef::City(city.faction));
        }
        self.collectables
            .iter()
            .find(|c| c.position == pos)
            .map(|c| ElementRef::Collectable(c.id))
    }

    pub fn collectables_at(&self, pos: Position) -> Vec<CollectableId> {
        self.collectables
            .iter()
            .filter(|c| c.position == pos)
            .map(|c| c.id)
            .collect()
    }

    // ── Nearest searches ────────────────────────────────────────────
    // Euclidean distance to the resource anchor / unit position. Strict
    // comparison, so the earliest registry entry wins ties.

    pub fn find_nearest_resource<P>(&self, from: Position, predicate: P) -> Option<&Resource>
    where
        P: Fn(&Resource) -> bool,
    {
        let mut best: Option<(&Resource, f64)> = None;
        for resource in self.resources.iter().filter(|r| predicate(r)) {
            let d = from.distance_to(resource.anchor);
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((resource, d));
            }
        }
        best.map(|(r, _)| r)
    }

    /// Living units only.
    pub fn find_nearest_unit<P>(&self, from: Position, predicate: P) -> Option<&Unit>
    where
        P: Fn(&Unit) -> bool,
    {
        let mut best: Option<(&Unit, f64)> = None;
        for unit in self.units.iter().filter(|u| u.alive && predicate(u)) {
            let d = from.distance_to(unit.position);
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((unit, d));
            }
        }
        best.map(|(u, _)| u)
    }

    /// At least one collection position of the resource is free.
    pub fn has_free_collection_position(&self, resource: &Resource) -> bool {
        resource.collection_positions().into_iter().any(|p| self.is_free(p))
    }

    // ── Registry access ─────────────────────────────────────────────

    pub fn units(&self)        -> &[Unit]        { &self.units }
    pub fn resources(&self)    -> &[Resource]    { &self.resources }
    pub fn cities(&self)       -> &[City]        { &self.cities }
    pub fn collectables(&self) -> &[Collectable] { &self.collectables }

    /// Owned copies of the living units.
    pub fn living_units(&self) -> Vec<Unit> {
        self.units.iter().filter(|u| u.alive).cloned().collect()
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == id)
    }

    /// Direct access for scenario setup. Moving a unit through this
    /// handle bypasses placement validation.
    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.iter_mut().find(|u| u.id == id)
    }

    pub fn resource(&self, id: ResourceId) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id == id)
    }

    pub fn resource_mut(&mut self, id: ResourceId) -> Option<&mut Resource> {
        self.resources.iter_mut().find(|r| r.id == id)
    }

    pub fn collectable(&self, id: CollectableId) -> Option<&Collectable> {
        self.collectables.iter().find(|c| c.id == id)
    }

    pub fn city(&self, faction: Faction) -> &City {
        &self.cities[faction.index()]
    }

    pub(crate) fn city_mut(&mut self, faction: Faction) -> &mut City {
        &mut self.cities[faction.index()]
    }

    pub fn city_position(&self, faction: Faction) -> Position {
        self.city_positions[faction.index()]
    }

    pub(crate) fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub(crate) fn unit_at_index(&self, index: usize) -> &Unit {
        &self.units[index]
    }

    pub(crate) fn unit_at_index_mut(&mut self, index: usize) -> &mut Unit {
        &mut self.units[index]
    }

    pub(crate) fn replace_unit_at_index(&mut self, index: usize, unit: Unit) {
        self.units[index] = unit;
    }

    pub(crate) fn resources_mut(&mut self) -> &mut [Resource] {
        &mut self.resources
    }

    pub(crate) fn collectables_mut(&mut self) -> &mut [Collectable] {
        &mut self.collectables
    }

    // ── Counts ──────────────────────────────────────────────────────

    pub fn resource_count(&self, kind: ResourceKind) -> usize {
        self.resources.iter().filter(|r| r.kind == kind).count()
    }

    pub fn living_count(&self, faction: Faction, kind: UnitKind) -> usize {
        self.units
            .iter()
            .filter(|u| u.alive && u.faction == faction && u.kind == kind)
            .count()
    }

    pub fn living_total(&self) -> usize {
        self.units.iter().filter(|u| u.alive).count()
    }

    pub fn has_active_flag(&self) -> bool {
        self.collectables.iter().any(|c| c.is_active_flag())
    }

    // ── Movement override ───────────────────────────────────────────

    pub fn movement_override_active(&self) -> bool {
        self.movement_override
    }

    /// Returns true if the override was not already set.
    pub fn push_movement_override(&mut self) -> bool {
        !std::mem::replace(&mut self.movement_override, true)
    }

    /// Returns true if the override was set.
    pub fn pop_movement_override(&mut self) -> bool {
        std::mem::replace(&mut self.movement_override, false)
    }

    /// The policy a unit actually follows this tick.
    pub fn policy_for(&self, unit: &Unit) -> MovementPolicy {
        if self.movement_override {
            MovementPolicy::Random
        } else {
            unit.kind.default_policy()
        }
    }

    // ── Mutation ────────────────────────────────────────────────────

    fn check_placement(&self, what: &'static str, anchor: Position, cells: &[Position]) -> SimResult<()> {
        for cell in cells {
            if !self.is_valid(*cell) {
                return Err(SimError::OutOfBounds {
                    position: *cell,
                    width:    self.width,
                    height:   self.height,
                });
            }
            if self.is_blocked(*cell) {
                return Err(SimError::PlacementBlocked {
                    what,
                    position:   anchor,
                    blocked_at: *cell,
                });
            }
        }
        Ok(())
    }

    pub fn add_unit(&mut self, faction: Faction, kind: UnitKind, position: Position) -> SimResult<UnitId> {
        self.check_placement("unit", position, &[position])?;
        let id = UnitId(self.next_unit_id);
        self.next_unit_id += 1;
        self.units.push(Unit::new(id, faction, kind, position));
        Ok(id)
    }

    pub fn add_resource(
        &mut self,
        kind:         ResourceKind,
        anchor:       Position,
        quantity:     u32,
        max_quantity: u32,
    ) -> SimResult<ResourceId> {
        self.insert_resource(kind, anchor, quantity, max_quantity, false)
    }

    /// A freshly sown resource: empty, flagged as growing.
    pub fn add_growing_resource(
        &mut self,
        kind:         ResourceKind,
        anchor:       Position,
        max_quantity: u32,
    ) -> SimResult<ResourceId> {
        self.insert_resource(kind, anchor, 0, max_quantity, true)
    }

    fn insert_resource(
        &mut self,
        kind:         ResourceKind,
        anchor:       Position,
        quantity:     u32,
        max_quantity: u32,
        growing:      bool,
    ) -> SimResult<ResourceId> {
        self.check_placement(kind.object_name(), anchor, &footprint_cells(kind, anchor))?;
        let id = ResourceId(self.next_resource_id);
        let mut resource = Resource::new(id, kind, anchor, quantity, max_quantity)?;
        resource.growing = growing;
        self.next_resource_id += 1;
        self.resources.push(resource);
        Ok(id)
    }

    pub fn add_flag(
        &mut self,
        position:   Position,
        created_at: chrono::DateTime<chrono::Utc>,
        lifetime:   chrono::Duration,
    ) -> SimResult<CollectableId> {
        let id = self.reserve_collectable_id(position)?;
        self.collectables.push(Collectable::flag(id, position, created_at, lifetime));
        Ok(id)
    }

    pub fn add_philosopher_stone(&mut self, position: Position) -> SimResult<CollectableId> {
        let id = self.reserve_collectable_id(position)?;
        self.collectables.push(Collectable::philosopher_stone(id, position));
        Ok(id)
    }

    fn reserve_collectable_id(&mut self, position: Position) -> SimResult<CollectableId> {
        if !self.is_valid(position) {
            return Err(SimError::OutOfBounds { position, width: self.width, height: self.height });
        }
        let id = CollectableId(self.next_collectable_id);
        self.next_collectable_id += 1;
        Ok(id)
    }

    pub fn kill_unit(&mut self, id: UnitId) -> SimResult<()> {
        let unit = self.unit_mut(id).ok_or(SimError::UnitNotFound { id })?;
        unit.kill();
        Ok(())
    }

    /// Remove every unit matching `predicate`, dead or alive.
    pub fn remove_units_where<P>(&mut self, predicate: P) -> Vec<UnitId>
    where
        P: Fn(&Unit) -> bool,
    {
        let removed: Vec<UnitId> = self.units.iter().filter(|u| predicate(u)).map(|u| u.id).collect();
        self.units.retain(|u| !predicate(u));
        removed
    }

    pub fn purge_dead_units(&mut self) -> Vec<UnitId> {
        self.remove_units_where(|u| !u.alive)
    }

    /// Re-derive `growing` from the living sowers currently sowing.
    /// A resource whose sower died or was removed stops growing here.
    pub fn refresh_growing(&mut self) {
        let sown: HashSet<ResourceId> = self
            .units
            .iter()
            .filter(|u| u.alive)
            .filter_map(|u| match &u.state {
                UnitState::Sower(SowerState::Sowing { resource }) => Some(*resource),
                _ => None,
            })
            .collect();
        for resource in &mut self.resources {
            resource.growing = sown.contains(&resource.id);
        }
    }

    /// Drop resources that are empty and not being sown.
    pub fn purge_depleted_resources(&mut self) -> Vec<Resource> {
        let (depleted, kept): (Vec<Resource>, Vec<Resource>) =
            std::mem::take(&mut self.resources).into_iter().partition(|r| r.is_depleted());
        self.resources = kept;
        depleted
    }

    pub fn clear_resources(&mut self) -> usize {
        let n = self.resources.len();
        self.resources.clear();
        n
    }

    pub fn remove_collectable(&mut self, id: CollectableId) -> Option<Collectable> {
        let index = self.collectables.iter().position(|c| c.id == id)?;
        Some(self.collectables.remove(index))
    }

    /// Remove flags that have been deactivated.
    pub fn remove_inactive_flags(&mut self) -> Vec<Collectable> {
        let (gone, kept): (Vec<Collectable>, Vec<Collectable>) = std::mem::take(&mut self.collectables)
            .into_iter()
            .partition(|c| c.is_flag() && !c.is_active_flag());
        self.collectables = kept;
        gone
    }
}
