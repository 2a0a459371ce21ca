//! Simulation events and the in-memory event log.
//!
//! RULE: Every state change a subsystem makes is reported as an event.
//! The engine records each event, serialized, in the EventLog.

use crate::{
    faction::Faction,
    geometry::Position,
    resource::ResourceKind,
    types::{CollectableId, ResourceId, RunId, Tick, UnitId},
    unit::UnitKind,
};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Who put a unit on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnSource {
    Setup,
    City,
    Command,
}

/// Variants are appended, never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    // ── Engine events ──────────────────────────────
    TickStarted {
        tick: Tick,
    },
    TickCompleted {
        tick: Tick,
    },
    RunInitialized {
        run_id: RunId,
        seed: u64,
    },
    UnitsPurged {
        tick: Tick,
        unit_ids: Vec<UnitId>,
    },

    // ── Units ──────────────────────────────────────
    ResourceCollected {
        tick: Tick,
        unit_id: UnitId,
        faction: Faction,
        resource_id: ResourceId,
        kind: ResourceKind,
        amount: u32,
    },
    ResourceSown {
        tick: Tick,
        unit_id: UnitId,
        resource_id: ResourceId,
        kind: ResourceKind,
        anchor: Position,
    },
    SowingCompleted {
        tick: Tick,
        unit_id: UnitId,
        resource_id: ResourceId,
        quantity: u32,
    },
    SowingAbandoned {
        tick: Tick,
        unit_id: UnitId,
        resource_id: ResourceId,
        quantity: u32,
    },
    UnitTeleported {
        tick: Tick,
        unit_id: UnitId,
        from: Position,
        to: Position,
    },

    // ── Resources ──────────────────────────────────
    ResourceDepleted {
        tick: Tick,
        resource_id: ResourceId,
        kind: ResourceKind,
        anchor: Position,
    },
    ResourceSpawned {
        tick: Tick,
        resource_id: ResourceId,
        kind: ResourceKind,
        anchor: Position,
        quantity: u32,
    },
    ResourcesCleared {
        tick: Tick,
        count: usize,
    },

    // ── Cities ─────────────────────────────────────
    UnitSpawned {
        tick: Tick,
        unit_id: UnitId,
        faction: Faction,
        kind: UnitKind,
        position: Position,
        source: SpawnSource,
    },
    ProductionSkipped {
        tick: Tick,
        faction: Faction,
        kind: UnitKind,
    },

    // ── Combat ─────────────────────────────────────
    UnitEliminated {
        tick: Tick,
        unit_id: UnitId,
        faction: Faction,
        kind: UnitKind,
        position: Position,
    },
    CombatResolved {
        tick: Tick,
        members: Vec<UnitId>,
        survivors: Vec<UnitId>,
        winner: Option<Faction>,
    },

    // ── Timed events ───────────────────────────────
    FlagRaised {
        tick: Tick,
        collectable_id: CollectableId,
        position: Position,
        forced: bool,
    },
    FlagExpired {
        tick: Tick,
        collectable_id: CollectableId,
    },
    MovementOverrideChanged {
        tick: Tick,
        active: bool,
    },
    StoneSpawned {
        tick: Tick,
        collectable_id: CollectableId,
        position: Position,
    },

    // ── Commands ───────────────────────────────────
    UnitsRemoved {
        tick: Tick,
        unit_ids: Vec<UnitId>,
    },
    ClockChanged {
        tick: Tick,
        paused: bool,
        speed: f64,
    },
}

/// One recorded event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub tick: Tick,
    pub subsystem: String,
    pub event_type: String,
    pub payload: String, // JSON-serialized SimEvent
}

/// Bounded, oldest entries dropped first.
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: VecDeque<EventLogEntry>,
    capacity: usize,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub fn push(&mut self, entry: EventLogEntry) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EventLogEntry> {
        self.entries.iter()
    }

    pub fn for_tick(&self, tick: Tick) -> Vec<&EventLogEntry> {
        self.entries.iter().filter(|e| e.tick == tick).collect()
    }

    pub fn payloads(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.payload.clone()).collect()
    }
}
