//! Component data
//!
//! Every component is optional per entity. The store owns all slots; systems
//! reach them through the typed `Component` capability and must tolerate
//! absence.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::effects::Effects;
use crate::Aabb;

/// Position (top-left corner) and velocity
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Transform {
    pub pos: Vec2,
    pub vel: Vec2,
}

impl Transform {
    pub fn new(pos: Vec2, vel: Vec2) -> Self {
        Self { pos, vel }
    }
}

/// RGBA fill color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Axis-aligned rectangle; together with `Transform` it defines the collision box
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Shape {
    pub width: f32,
    pub height: f32,
    pub color: Color,
}

impl Shape {
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn aabb_at(&self, pos: Vec2) -> Aabb {
        Aabb::new(pos, self.size())
    }
}

/// Directional intent flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Input {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl Input {
    /// Unit-per-axis direction (forward is up the screen)
    pub fn direction(&self) -> Vec2 {
        let mut dir = Vec2::ZERO;
        if self.forward {
            dir.y -= 1.0;
        }
        if self.backward {
            dir.y += 1.0;
        }
        if self.left {
            dir.x -= 1.0;
        }
        if self.right {
            dir.x += 1.0;
        }
        dir
    }
}

/// Birth timestamp and total duration on the monotonic ms clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lifespan {
    pub birth_ms: u64,
    pub duration_ms: u64,
}

impl Lifespan {
    pub fn new(birth_ms: u64, duration_ms: u64) -> Self {
        Self {
            birth_ms,
            duration_ms,
        }
    }

    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.birth_ms) > self.duration_ms
    }

    pub fn remaining(&self, now_ms: u64) -> u64 {
        (self.birth_ms + self.duration_ms).saturating_sub(now_ms)
    }

    /// Shrink the total duration, keeping the birth time
    pub fn scale(&mut self, factor: f64) {
        self.duration_ms = (self.duration_ms as f64 * factor) as u64;
    }
}

/// Wall collisions so far; scales bullet rewards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BounceTracker {
    pub bounces: u32,
}

/// All optional slots for one entity
#[derive(Debug, Clone, Default)]
pub struct ComponentSlots {
    transform: Option<Transform>,
    shape: Option<Shape>,
    input: Option<Input>,
    lifespan: Option<Lifespan>,
    effects: Option<Effects>,
    bounce: Option<BounceTracker>,
}

/// Typed access to one slot of `ComponentSlots`
pub trait Component: Sized + 'static {
    const NAME: &'static str;

    fn slot(slots: &ComponentSlots) -> &Option<Self>;
    fn slot_mut(slots: &mut ComponentSlots) -> &mut Option<Self>;
}

macro_rules! impl_component {
    ($ty:ty, $field:ident) => {
        impl Component for $ty {
            const NAME: &'static str = stringify!($ty);

            fn slot(slots: &ComponentSlots) -> &Option<Self> {
                &slots.$field
            }

            fn slot_mut(slots: &mut ComponentSlots) -> &mut Option<Self> {
                &mut slots.$field
            }
        }
    };
}

impl_component!(Transform, transform);
impl_component!(Shape, shape);
impl_component!(Input, input);
impl_component!(Lifespan, lifespan);
impl_component!(Effects, effects);
impl_component!(BounceTracker, bounce);
