//! Timed buffs and debuffs
//!
//! At most one effect per kind is present at a time. Different kinds may
//! coexist; movement resolution gives Slowness precedence over Speed.
//! Expiry is a polling sweep run once per frame.

use serde::{Deserialize, Serialize};

use super::store::EntityStore;
use crate::config::PlayerConfig;

/// Effect kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    Speed,
    Slowness,
}

/// A single timed effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Effect {
    pub kind: EffectKind,
    pub start_ms: u64,
    pub duration_ms: u64,
}

impl Effect {
    pub fn new(kind: EffectKind, start_ms: u64, duration_ms: u64) -> Self {
        Self {
            kind,
            start_ms,
            duration_ms,
        }
    }

    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.start_ms) > self.duration_ms
    }
}

/// Ordered effect list for one entity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Effects {
    list: Vec<Effect>,
}

impl Effects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append unless an effect of the same kind is already present.
    /// Returns true if the effect was added.
    pub fn add(&mut self, effect: Effect) -> bool {
        if self.has(effect.kind) {
            return false;
        }
        self.list.push(effect);
        true
    }

    /// Remove every effect of `kind`
    pub fn remove(&mut self, kind: EffectKind) {
        self.list.retain(|e| e.kind != kind);
    }

    pub fn has(&self, kind: EffectKind) -> bool {
        self.list.iter().any(|e| e.kind == kind)
    }

    pub fn clear(&mut self) {
        self.list.clear();
    }

    /// Drop expired effects, returning how many were removed
    pub fn expire(&mut self, now_ms: u64) -> usize {
        let before = self.list.len();
        self.list.retain(|e| !e.is_expired(now_ms));
        before - self.list.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Effect> {
        self.list.iter()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

/// Movement multiplier for an entity's effects.
///
/// Speed is checked first and Slowness last, so Slowness wins when both
/// are active.
pub fn movement_multiplier(effects: Option<&Effects>, player: &PlayerConfig) -> f32 {
    let Some(effects) = effects else {
        return 1.0;
    };
    let mut multiplier = 1.0;
    if effects.has(EffectKind::Speed) {
        multiplier = player.speed_boost_multiplier;
    }
    if effects.has(EffectKind::Slowness) {
        multiplier = player.slowness_multiplier;
    }
    multiplier
}

/// Expiry sweep over every committed entity carrying effects
pub fn expire_effects(store: &mut EntityStore, now_ms: u64) {
    let ids = store.entities().to_vec();
    for id in ids {
        if let Some(effects) = store.get_mut::<Effects>(id) {
            let removed = effects.expire(now_ms);
            if removed > 0 {
                log::debug!("{id}: {removed} effect(s) expired");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Tag;

    #[test]
    fn test_duplicate_kind_is_noop() {
        let mut effects = Effects::new();
        assert!(effects.add(Effect::new(EffectKind::Speed, 0, 1_000)));
        assert!(!effects.add(Effect::new(EffectKind::Speed, 50, 9_000)));
        assert_eq!(effects.len(), 1);
        // First one stays
        assert_eq!(effects.iter().next().unwrap().duration_ms, 1_000);
    }

    #[test]
    fn test_speed_and_slowness_coexist_slowness_wins() {
        let player = PlayerConfig::default();
        let mut effects = Effects::new();
        effects.add(Effect::new(EffectKind::Speed, 0, 1_000));
        assert_eq!(
            movement_multiplier(Some(&effects), &player),
            player.speed_boost_multiplier
        );

        effects.add(Effect::new(EffectKind::Slowness, 0, 1_000));
        assert_eq!(effects.len(), 2);
        assert_eq!(
            movement_multiplier(Some(&effects), &player),
            player.slowness_multiplier
        );
    }

    #[test]
    fn test_no_effects_multiplier_is_one() {
        let player = PlayerConfig::default();
        assert_eq!(movement_multiplier(None, &player), 1.0);
        assert_eq!(movement_multiplier(Some(&Effects::new()), &player), 1.0);
    }

    #[test]
    fn test_remove_and_has() {
        let mut effects = Effects::new();
        effects.add(Effect::new(EffectKind::Speed, 0, 1_000));
        effects.add(Effect::new(EffectKind::Slowness, 0, 1_000));
        effects.remove(EffectKind::Speed);
        assert!(!effects.has(EffectKind::Speed));
        assert!(effects.has(EffectKind::Slowness));
    }

    #[test]
    fn test_expire_uses_strict_comparison() {
        let mut effects = Effects::new();
        effects.add(Effect::new(EffectKind::Speed, 100, 1_000));
        effects.add(Effect::new(EffectKind::Slowness, 100, 5_000));

        assert_eq!(effects.expire(1_100), 0);
        assert_eq!(effects.expire(1_101), 1);
        assert!(effects.has(EffectKind::Slowness));
    }

    #[test]
    fn test_expire_sweep_over_store() {
        let mut store = EntityStore::new();
        let player = store.add_entity(Tag::Player);
        let mut effects = Effects::new();
        effects.add(Effect::new(EffectKind::Speed, 0, 10));
        store.insert(player, effects).unwrap();
        store.commit();

        expire_effects(&mut store, 11);
        assert!(store.get::<Effects>(player).unwrap().is_empty());
    }
}
