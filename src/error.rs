//! Simulation error taxonomy
//!
//! Per-frame systems never propagate these out of a frame: they log at `warn`
//! and skip the offending entity. Only configuration loading hands an error
//! back to the caller.

use thiserror::Error;

use crate::sim::EntityId;

#[derive(Debug, Error)]
pub enum SimError {
    /// Handle does not name an entity owned by the store
    #[error("entity {0} is not in the store")]
    UnknownEntity(EntityId),

    /// An expected component slot is empty
    #[error("entity {id} has no {component} component")]
    MissingComponent {
        id: EntityId,
        component: &'static str,
    },

    /// A spawn or collision call needed the player and none was supplied
    #[error("no live player entity")]
    MissingPlayer,

    /// Frame input the simulation cannot act on
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}
