//! Game tuning loaded from JSON
//!
//! Read-only per frame: the simulation never mutates its config.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SimError;
use crate::sim::{Color, Shape, Tag};

/// Window (arena) dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: WINDOW_WIDTH,
            height: WINDOW_HEIGHT,
        }
    }
}

impl WindowConfig {
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

/// Rectangle extents plus fill color
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeConfig {
    pub width: f32,
    pub height: f32,
    /// RGBA
    pub color: [u8; 4],
}

impl ShapeConfig {
    pub fn new(width: f32, height: f32, color: [u8; 4]) -> Self {
        Self {
            width,
            height,
            color,
        }
    }

    pub fn to_shape(&self) -> Shape {
        let [r, g, b, a] = self.color;
        Shape {
            width: self.width,
            height: self.height,
            color: Color { r, g, b, a },
        }
    }
}

/// Tuning for one spawnable archetype
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeConfig {
    /// Chance (0-100) of a spawn attempt each frame
    pub spawn_percentage: u8,
    /// Lifespan in ms (0 = lives until destroyed)
    pub lifespan_ms: u64,
    /// Pixels per frame at multiplier 1.0
    pub speed: f32,
    pub shape: ShapeConfig,
}

/// Player tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub speed: f32,
    pub shape: ShapeConfig,
    pub lives: u32,
    pub speed_boost_multiplier: f32,
    pub slowness_multiplier: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: 4.0,
            shape: ShapeConfig::new(30.0, 30.0, [80, 160, 255, 255]),
            lives: STARTING_LIVES,
            speed_boost_multiplier: SPEED_BOOST_MULTIPLIER,
            slowness_multiplier: SLOWNESS_MULTIPLIER,
        }
    }
}

/// A static wall rectangle, placed at session start
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallConfig {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Complete game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub window: WindowConfig,
    /// Run seed for reproducibility
    pub seed: u64,
    /// Session timer in ms
    pub session_duration_ms: u64,
    /// Radius for the area clears triggered by player collisions
    pub interaction_radius: f32,
    pub player: PlayerConfig,
    pub enemy: ArchetypeConfig,
    pub speed_boost: ArchetypeConfig,
    pub slowness_debuff: ArchetypeConfig,
    pub item: ArchetypeConfig,
    /// `spawn_percentage` is unused: bullets come from player input
    pub bullet: ArchetypeConfig,
    pub wall_color: [u8; 4],
    pub walls: Vec<WallConfig>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            seed: 0x5EED,
            session_duration_ms: SESSION_DURATION_MS,
            interaction_radius: INTERACTION_RADIUS,
            player: PlayerConfig::default(),
            enemy: ArchetypeConfig {
                spawn_percentage: 3,
                lifespan_ms: 20_000,
                speed: 2.0,
                shape: ShapeConfig::new(24.0, 24.0, [230, 60, 60, 255]),
            },
            speed_boost: ArchetypeConfig {
                spawn_percentage: 1,
                lifespan_ms: 8_000,
                speed: 1.0,
                shape: ShapeConfig::new(16.0, 16.0, [60, 230, 120, 255]),
            },
            slowness_debuff: ArchetypeConfig {
                spawn_percentage: 1,
                lifespan_ms: 8_000,
                speed: 1.0,
                shape: ShapeConfig::new(16.0, 16.0, [160, 80, 220, 255]),
            },
            item: ArchetypeConfig {
                spawn_percentage: 1,
                lifespan_ms: 6_000,
                speed: 0.5,
                shape: ShapeConfig::new(12.0, 12.0, [250, 210, 40, 255]),
            },
            bullet: ArchetypeConfig {
                spawn_percentage: 0,
                lifespan_ms: 3_000,
                speed: 8.0,
                shape: ShapeConfig::new(6.0, 6.0, [255, 255, 255, 255]),
            },
            wall_color: [120, 120, 120, 255],
            walls: vec![
                WallConfig {
                    x: 150.0,
                    y: 140.0,
                    width: 120.0,
                    height: 20.0,
                },
                WallConfig {
                    x: 530.0,
                    y: 440.0,
                    width: 120.0,
                    height: 20.0,
                },
            ],
        }
    }
}

impl GameConfig {
    /// Parse and validate a JSON config; missing fields take defaults
    pub fn from_json_str(json: &str) -> Result<Self, SimError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        log::info!("Loaded config (seed {})", config.seed);
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), SimError> {
        if self.window.width <= 0.0 || self.window.height <= 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "window must be positive, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        check_shape("player", &self.player.shape)?;
        for (name, archetype) in [
            ("enemy", &self.enemy),
            ("speed_boost", &self.speed_boost),
            ("slowness_debuff", &self.slowness_debuff),
            ("item", &self.item),
            ("bullet", &self.bullet),
        ] {
            if archetype.spawn_percentage > 100 {
                return Err(SimError::InvalidConfig(format!(
                    "{name}.spawn_percentage must be 0-100, got {}",
                    archetype.spawn_percentage
                )));
            }
            check_shape(name, &archetype.shape)?;
        }
        for wall in &self.walls {
            if wall.width <= 0.0 || wall.height <= 0.0 {
                return Err(SimError::InvalidConfig(format!(
                    "wall at ({}, {}) has non-positive extents",
                    wall.x, wall.y
                )));
            }
        }
        Ok(())
    }

    /// Archetype tuning for a tag (None for player, walls and untyped entities)
    pub fn archetype(&self, tag: Tag) -> Option<&ArchetypeConfig> {
        match tag {
            Tag::Enemy => Some(&self.enemy),
            Tag::SpeedBoost => Some(&self.speed_boost),
            Tag::SlownessDebuff => Some(&self.slowness_debuff),
            Tag::Item => Some(&self.item),
            Tag::Bullet => Some(&self.bullet),
            Tag::Player | Tag::Wall | Tag::Default => None,
        }
    }

    /// Base movement speed for a tag
    pub fn speed_for(&self, tag: Tag) -> f32 {
        match tag {
            Tag::Player => self.player.speed,
            _ => self.archetype(tag).map(|a| a.speed).unwrap_or(0.0),
        }
    }
}

fn check_shape(name: &str, shape: &ShapeConfig) -> Result<(), SimError> {
    if shape.width <= 0.0 || shape.height <= 0.0 {
        return Err(SimError::InvalidConfig(format!(
            "{name}.shape must be positive, got {}x{}",
            shape.width, shape.height
        )));
    }
    Ok(())
}
