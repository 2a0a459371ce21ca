use crate::{faction::Faction, geometry::Position, unit::{Unit, UnitKind}};
use serde::{Deserialize, Serialize};

/// Which units a removal request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitFilter {
    Collectors,
    Sowers,
    Assassins,
    All,
}

impl UnitFilter {
    pub fn matches(&self, unit: &Unit) -> bool {
        match self {
            Self::Collectors => unit.is_collector(),
            Self::Sowers     => unit.kind == UnitKind::Sower,
            Self::Assassins  => unit.kind == UnitKind::Assassin,
            Self::All        => true,
        }
    }
}

/// External mutation requests, applied immediately by the engine.
/// Variants are appended, never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum SimCommand {
    // ── Clock control ─────────────────────────────
    Pause,
    Resume,
    SetSpeed { multiplier: f64 },
    SpeedUp,
    SlowDown,
    ResetSpeed,

    // ── Units ─────────────────────────────────────
    SpawnUnit { kind: UnitKind, faction: Faction },
    SpawnRandomUnit { faction: Faction },
    RemoveUnits { filter: UnitFilter },

    // ── Map objects ───────────────────────────────
    ClearResources,
    SpawnFlag,
    SpawnPhilosopherStone,
    SpawnTree { position: Position },
    SpawnRock { position: Position },
}

impl SimCommand {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Pause                 => "pause",
            Self::Resume                => "resume",
            Self::SetSpeed { .. }       => "set_speed",
            Self::SpeedUp               => "speed_up",
            Self::SlowDown              => "slow_down",
            Self::ResetSpeed            => "reset_speed",
            Self::SpawnUnit { .. }      => "spawn_unit",
            Self::SpawnRandomUnit { .. }=> "spawn_random_unit",
            Self::RemoveUnits { .. }    => "remove_units",
            Self::ClearResources        => "clear_resources",
            Self::SpawnFlag             => "spawn_flag",
            Self::SpawnPhilosopherStone => "spawn_philosopher_stone",
            Self::SpawnTree { .. }      => "spawn_tree",
            Self::SpawnRock { .. }      => "spawn_rock",
        }
    }
}
