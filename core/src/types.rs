//! Shared primitive types used across the entire simulation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A simulation tick. One tick = one movement/collection/combat step.
pub type Tick = u64;

/// The canonical run identifier.
pub type RunId = String;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

entity_id!(
    /// Stable handle for a unit. Never reused within a run.
    UnitId, "unit"
);
entity_id!(
    /// Stable handle for a resource. Never reused within a run.
    ResourceId, "resource"
);
entity_id!(
    /// Stable handle for a collectable. Never reused within a run.
    CollectableId, "collectable"
);
