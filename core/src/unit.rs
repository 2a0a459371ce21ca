use crate::{
    behavior::MovementPolicy,
    faction::Faction,
    geometry::Position,
    resource::ResourceKind,
    types::{ResourceId, UnitId},
};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Lumberjack,
    Miner,
    Sower,
    Assassin,
}

impl UnitKind {
    /// Every kind, in declaration order.
    pub const ALL: [UnitKind; 4] = [
        UnitKind::Lumberjack,
        UnitKind::Miner,
        UnitKind::Sower,
        UnitKind::Assassin,
    ];

    pub fn is_collector(&self) -> bool {
        matches!(self, Self::Lumberjack | Self::Miner)
    }

    /// Resource a collector goes for first. None for non-collectors.
    pub fn preferred_resource(&self) -> Option<ResourceKind> {
        match self {
            Self::Lumberjack => Some(ResourceKind::Wood),
            Self::Miner      => Some(ResourceKind::Ore),
            _                => None,
        }
    }

    pub fn default_policy(&self) -> MovementPolicy {
        match self {
            Self::Lumberjack | Self::Miner => MovementPolicy::Collector,
            Self::Sower                    => MovementPolicy::Sower,
            Self::Assassin                 => MovementPolicy::Assassin,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Lumberjack => "Lumberjack",
            Self::Miner      => "Miner",
            Self::Sower      => "Sower",
            Self::Assassin   => "Assassin",
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectorState {
    pub preferred:  ResourceKind,
    pub target:     Option<ResourceId>,
    /// Harvested during the current tick.
    pub collecting: bool,
}

/// Where and what a seeking sower intends to plant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SowingPlan {
    pub kind: ResourceKind,
    /// Anchor of the future footprint.
    pub site: Position,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum SowerState {
    Seeking { plan: Option<SowingPlan> },
    Sowing  { resource: ResourceId },
}

/// Kind-specific mutable state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum UnitState {
    Collector(CollectorState),
    Sower(SowerState),
    Assassin { target: Option<UnitId> },
}

impl UnitState {
    pub fn initial(kind: UnitKind) -> Self {
        match kind {
            UnitKind::Lumberjack | UnitKind::Miner => Self::Collector(CollectorState {
                preferred:  kind.preferred_resource().unwrap_or(ResourceKind::Wood),
                target:     None,
                collecting: false,
            }),
            UnitKind::Sower    => Self::Sower(SowerState::Seeking { plan: None }),
            UnitKind::Assassin => Self::Assassin { target: None },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id:       UnitId,
    pub faction:  Faction,
    pub kind:     UnitKind,
    pub position: Position,
    pub alive:    bool,
    pub state:    UnitState,
}

impl Unit {
    pub fn new(id: UnitId, faction: Faction, kind: UnitKind, position: Position) -> Self {
        Self {
            id,
            faction,
            kind,
            position,
            alive: true,
            state: UnitState::initial(kind),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }

    /// Bring a dead unit back. Only meaningful before the end-of-tick purge.
    pub fn revive(&mut self) {
        self.alive = true;
    }

    pub fn is_assassin(&self) -> bool {
        self.kind == UnitKind::Assassin
    }

    pub fn is_collector(&self) -> bool {
        self.kind.is_collector()
    }

    pub fn is_sowing(&self) -> bool {
        matches!(self.state, UnitState::Sower(SowerState::Sowing { .. }))
    }

    pub fn target_resource(&self) -> Option<ResourceId> {
        match &self.state {
            UnitState::Collector(c) => c.target,
            _ => None,
        }
    }

    pub fn target_unit(&self) -> Option<UnitId> {
        match &self.state {
            UnitState::Assassin { target } => *target,
            _ => None,
        }
    }

    /// A is combative with B when they are enemies, adjacent, and at
    /// least one of them is an assassin.
    pub fn is_combative_with(&self, other: &Unit) -> bool {
        self.faction != other.faction
            && self.position.is_adjacent(other.position)
            && (self.is_assassin() || other.is_assassin())
    }
}
