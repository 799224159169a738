//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One seeded RNG stream, threaded through `SimContext`
//! - Stable iteration order (by entity ID, fixed by the store's commit)
//! - Additions and removals deferred to `EntityStore::commit`
//! - No rendering or platform dependencies

pub mod collision;
pub mod components;
pub mod context;
pub mod effects;
pub mod entity;
pub mod spawn;
pub mod store;
pub mod tick;

pub use collision::{
    Bounds, Interaction, RelativePosition, add_effect, calculate_collision, calculate_overlap,
    detect_out_of_bounds, handle_entity_bounds, handle_entity_entity_collision, interaction,
    position_relative_to,
};
pub use components::{BounceTracker, Color, Component, Input, Lifespan, Shape, Transform};
pub use context::{Scoreboard, Session, SimContext};
pub use effects::{Effect, EffectKind, Effects, expire_effects, movement_multiplier};
pub use entity::{Entity, EntityId, Tag};
pub use spawn::{
    create_random_position, create_valid_velocity, spawn_archetype, validate_spawn_position,
};
pub use store::EntityStore;
pub use tick::{FrameInput, Simulation, move_entities, sweep_lifespans};
