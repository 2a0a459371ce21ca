//! Harvestable resources: single-cell trees (wood) and 2×2 rocks (ore).

use crate::{
    error::{SimError, SimResult},
    geometry::Position,
    types::ResourceId,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Wood,
    Ore,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 2] = [ResourceKind::Wood, ResourceKind::Ore];

    /// Side length of the square footprint.
    pub fn footprint_size(&self) -> i32 {
        match self {
            Self::Wood => 1,
            Self::Ore  => 2,
        }
    }

    /// Name of the map object carrying this resource.
    pub fn object_name(&self) -> &'static str {
        match self {
            Self::Wood => "tree",
            Self::Ore  => "rock",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub id:     ResourceId,
    pub kind:   ResourceKind,
    /// Top-left cell of the footprint.
    pub anchor: Position,
    quantity:       u32,
    max_quantity:   u32,
    /// A living sower is still growing this resource; it survives at
    /// quantity 0. Re-derived every tick by the resource subsystem.
    pub growing:         bool,
    /// Refreshed every tick by the resource subsystem.
    pub being_collected: bool,
}

impl Resource {
    pub fn new(
        id:           ResourceId,
        kind:         ResourceKind,
        anchor:       Position,
        quantity:     u32,
        max_quantity: u32,
    ) -> SimResult<Self> {
        if quantity > max_quantity {
            return Err(SimError::QuantityOutOfRange { quantity, max: max_quantity });
        }
        Ok(Self {
            id,
            kind,
            anchor,
            quantity,
            max_quantity,
            growing: false,
            being_collected: false,
        })
    }

    pub fn quantity(&self)     -> u32 { self.quantity }
    pub fn max_quantity(&self) -> u32 { self.max_quantity }

    pub fn can_be_collected(&self) -> bool { self.quantity > 0 }
    pub fn is_empty(&self)         -> bool { self.quantity == 0 }
    pub fn is_full(&self)          -> bool { self.quantity >= self.max_quantity }

    /// Empty and nobody is growing it: due for removal at end of tick.
    pub fn is_depleted(&self) -> bool {
        self.is_empty() && !self.growing
    }

    /// Remove up to `amount`. Returns what was actually taken.
    pub fn take(&mut self, amount: u32) -> u32 {
        let taken = amount.min(self.quantity);
        self.quantity -= taken;
        taken
    }

    /// Add up to `amount` without exceeding the maximum. Returns what was added.
    pub fn add(&mut self, amount: u32) -> u32 {
        let added = amount.min(self.max_quantity - self.quantity);
        self.quantity += added;
        added
    }

    /// Every cell covered by this resource, row-major from the anchor.
    pub fn footprint(&self) -> Vec<Position> {
        footprint_cells(self.kind, self.anchor)
    }

    pub fn occupies(&self, pos: Position) -> bool {
        let size = self.kind.footprint_size();
        pos.x >= self.anchor.x
            && pos.x < self.anchor.x + size
            && pos.y >= self.anchor.y
            && pos.y < self.anchor.y + size
    }

    /// True if `pos` is a collection position: outside the footprint but
    /// touching it (8-neighbourhood).
    pub fn is_adjacent_to(&self, pos: Position) -> bool {
        touches_footprint(self.kind, self.anchor, pos)
    }

    /// Cells from which this resource can be harvested, ignoring bounds
    /// and occupancy. Scan order: x outer, y inner.
    pub fn collection_positions(&self) -> Vec<Position> {
        let size = self.kind.footprint_size();
        let mut cells = Vec::with_capacity((4 * size + 4) as usize);
        for x in self.anchor.x - 1..=self.anchor.x + size {
            for y in self.anchor.y - 1..=self.anchor.y + size {
                let pos = Position::new(x, y);
                if !self.occupies(pos) {
                    cells.push(pos);
                }
            }
        }
        cells
    }
}

/// Cells a resource of `kind` anchored at `anchor` would cover.
pub fn footprint_cells(kind: ResourceKind, anchor: Position) -> Vec<Position> {
    let size = kind.footprint_size();
    let mut cells = Vec::with_capacity((size * size) as usize);
    for dy in 0..size {
        for dx in 0..size {
            cells.push(anchor.offset(dx, dy));
        }
    }
    cells
}

/// `pos` lies outside the footprint of `kind` at `anchor` and touches it.
pub fn touches_footprint(kind: ResourceKind, anchor: Position, pos: Position) -> bool {
    let last = kind.footprint_size() - 1;
    let gap = |p: i32, lo: i32| {
        if p < lo {
            lo - p
        } else if p > lo + last {
            p - (lo + last)
        } else {
            0
        }
    };
    gap(pos.x, anchor.x).max(gap(pos.y, anchor.y)) == 1
}
