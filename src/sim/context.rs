//! Simulation context and session bookkeeping
//!
//! `SimContext` is threaded through every system call in place of globals:
//! it carries the single seeded RNG stream, the frame clock and the
//! immutable config. Reordering draws from `rng` changes outcomes.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;

/// Shared per-run state consumed by systems
#[derive(Debug, Clone)]
pub struct SimContext {
    /// Run seed for reproducibility
    pub seed: u64,
    /// The one RNG stream (movement, collision, spawning)
    pub rng: Pcg32,
    /// Monotonic clock for the current frame (ms)
    pub now_ms: u64,
    /// Cached window size
    pub window: Vec2,
    pub config: GameConfig,
}

impl SimContext {
    pub fn new(config: GameConfig) -> Self {
        Self {
            seed: config.seed,
            rng: Pcg32::seed_from_u64(config.seed),
            now_ms: 0,
            window: config.window.size(),
            config,
        }
    }
}

/// Score and lives callbacks invoked from collision dispatch
pub trait Scoreboard {
    fn score(&self) -> i32;
    fn set_score(&mut self, score: i32);
    fn decrement_lives(&mut self);
}

/// Score, lives and the session timer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    score: i32,
    lives: u32,
    time_remaining_ms: u64,
}

impl Session {
    pub fn new(lives: u32, duration_ms: u64) -> Self {
        Self {
            score: 0,
            lives,
            time_remaining_ms: duration_ms,
        }
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn time_remaining_ms(&self) -> u64 {
        self.time_remaining_ms
    }

    /// Count the timer down, saturating at zero
    pub fn count_down(&mut self, elapsed_ms: u64) {
        self.time_remaining_ms = self.time_remaining_ms.saturating_sub(elapsed_ms);
    }

    pub fn is_over(&self) -> bool {
        self.lives == 0 || self.time_remaining_ms == 0
    }
}

impl Scoreboard for Session {
    fn score(&self) -> i32 {
        self.score
    }

    fn set_score(&mut self, score: i32) {
        self.score = score.max(0);
    }

    fn decrement_lives(&mut self) {
        self.lives = self.lives.saturating_sub(1);
    }
}
