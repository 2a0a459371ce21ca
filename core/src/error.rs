use thiserror::Error;

use crate::{geometry::Position, types::UnitId};

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid world dimensions {width}x{height}: the two cities would overlap or the grid is empty")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("Position {position} is outside the {width}x{height} world")]
    OutOfBounds { position: Position, width: i32, height: i32 },

    #[error("Cannot place {what} at {position}: cell {blocked_at} is already occupied")]
    PlacementBlocked {
        what:       &'static str,
        position:   Position,
        blocked_at: Position,
    },

    #[error("Quantity {quantity} out of range [0, {max}]")]
    QuantityOutOfRange { quantity: u32, max: u32 },

    #[error("Unit {id} not found")]
    UnitNotFound { id: UnitId },

    #[error("tick() called on paused engine")]
    EnginePaused,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;
