//! Bounce Arena - simulation core for a top-down arcade arena
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entity store, collisions, effects, spawning)
//! - `config`: Data-driven archetype and session tuning
//! - `audio`: Fire-and-forget audio cue boundary
//! - `error`: Error taxonomy for log-and-skip systems

pub mod audio;
pub mod config;
pub mod error;
pub mod sim;

pub use audio::{AudioCue, AudioSink, CueQueue, NullAudio};
pub use config::GameConfig;
pub use error::SimError;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Default window dimensions
    pub const WINDOW_WIDTH: f32 = 800.0;
    pub const WINDOW_HEIGHT: f32 = 600.0;

    /// Placement attempts before a spawn is abandoned
    pub const MAX_SPAWN_ATTEMPTS: u32 = 10;

    /// Radius around the player used by pickup/hit area clears
    pub const INTERACTION_RADIUS: f32 = 150.0;

    /// Effect durations rolled on pickup (ms, inclusive)
    pub const SLOWNESS_DURATION_MS: (u64, u64) = (5_000, 10_000);
    pub const SPEED_DURATION_MS: (u64, u64) = (9_000, 15_000);

    /// Movement multipliers while an effect is active
    pub const SPEED_BOOST_MULTIPLIER: f32 = 2.0;
    pub const SLOWNESS_MULTIPLIER: f32 = 0.5;

    /// Remaining speed boosts shrink to this fraction of their lifespan
    pub const BOOST_LIFESPAN_FACTOR: f64 = 0.1;

    /// Scoring
    pub const BULLET_HIT_BASE: i32 = 5;
    pub const PICKUP_SHOT_DELTA: i32 = 15;
    pub const PLAYER_HIT_PENALTY: i32 = 10;
    pub const ITEM_REWARD: i32 = 90;

    /// Session defaults
    pub const STARTING_LIVES: u32 = 3;
    pub const SESSION_DURATION_MS: u64 = 120_000;
}

/// An axis-aligned box described by its top-left corner and extents
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Top-left corner
    pub min: Vec2,
    /// Width (x) and height (y)
    pub size: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    /// Half extents on each axis
    #[inline]
    pub fn half(&self) -> Vec2 {
        self.size * 0.5
    }

    /// Center point derived from the corner and half extents
    #[inline]
    pub fn center(&self) -> Vec2 {
        self.min + self.half()
    }

    /// Bottom-right corner
    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }
}

/// Top-left corner that centers a box of `size` inside `window`
#[inline]
pub fn centered_in(window: Vec2, size: Vec2) -> Vec2 {
    (window - size) * 0.5
}
