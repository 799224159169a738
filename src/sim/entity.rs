//! Entity identity and archetype tags

use std::fmt;

use serde::{Deserialize, Serialize};

/// Monotonically increasing entity handle; never reused within a store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Immutable archetype classification
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Tag {
    Player,
    Enemy,
    Wall,
    SpeedBoost,
    SlownessDebuff,
    Bullet,
    Item,
    #[default]
    Default,
}

impl Tag {
    pub const ALL: [Tag; 8] = [
        Tag::Player,
        Tag::Enemy,
        Tag::Wall,
        Tag::SpeedBoost,
        Tag::SlownessDebuff,
        Tag::Bullet,
        Tag::Item,
        Tag::Default,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Player => "player",
            Tag::Enemy => "enemy",
            Tag::Wall => "wall",
            Tag::SpeedBoost => "speed_boost",
            Tag::SlownessDebuff => "slowness_debuff",
            Tag::Bullet => "bullet",
            Tag::Item => "item",
            Tag::Default => "default",
        }
    }
}

/// Identity record owned by the store; components live beside it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    id: EntityId,
    tag: Tag,
    active: bool,
}

impl Entity {
    pub(super) fn new(id: EntityId, tag: Tag) -> Self {
        Self {
            id,
            tag,
            active: true,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// False once destroyed; the record lingers until the next commit
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub(super) fn destroy(&mut self) {
        self.active = false;
    }
}
