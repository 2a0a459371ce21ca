//! Non-blocking map objects with a contact effect.

use crate::{geometry::Position, types::CollectableId};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CollectableKind {
    /// Lives for `lifetime_secs` of wall-clock time from `created_at`.
    Flag {
        created_at:    DateTime<Utc>,
        lifetime_secs: i64,
        active:        bool,
    },
    /// Permanent. Teleports whoever steps on it.
    PhilosopherStone,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collectable {
    pub id:       CollectableId,
    pub position: Position,
    pub kind:     CollectableKind,
}

impl Collectable {
    pub fn flag(id: CollectableId, position: Position, created_at: DateTime<Utc>, lifetime: Duration) -> Self {
        Self {
            id,
            position,
            kind: CollectableKind::Flag {
                created_at,
                lifetime_secs: lifetime.num_seconds(),
                active: true,
            },
        }
    }

    pub fn philosopher_stone(id: CollectableId, position: Position) -> Self {
        Self { id, position, kind: CollectableKind::PhilosopherStone }
    }

    pub fn is_flag(&self) -> bool {
        matches!(self.kind, CollectableKind::Flag { .. })
    }

    pub fn is_active_flag(&self) -> bool {
        matches!(self.kind, CollectableKind::Flag { active: true, .. })
    }

    /// Whole seconds left before a flag expires, never negative.
    /// None for permanent collectables.
    pub fn remaining_lifetime(&self, now: DateTime<Utc>) -> Option<i64> {
        match &self.kind {
            CollectableKind::Flag { created_at, lifetime_secs, .. } => {
                let elapsed = (now - *created_at).num_seconds();
                Some((lifetime_secs - elapsed).max(0))
            }
            CollectableKind::PhilosopherStone => None,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match &self.kind {
            CollectableKind::Flag { created_at, lifetime_secs, .. } => {
                (now - *created_at).num_seconds() >= *lifetime_secs
            }
            CollectableKind::PhilosopherStone => false,
        }
    }

    /// Deactivate an expired flag. Returns true on the transition.
    pub fn expire(&mut self, now: DateTime<Utc>) -> bool {
        if !self.is_expired(now) {
            return false;
        }
        match &mut self.kind {
            CollectableKind::Flag { active, .. } if *active => {
                *active = false;
                true
            }
            _ => false,
        }
    }
}
