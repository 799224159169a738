//! Collision detection and response for axis-aligned boxes
//!
//! Detection primitives are pure functions of two boxes. Resolution pushes
//! entities out along the axis of least penetration and flips the matching
//! velocity component. The per-frame dispatch is brute force over every
//! ordered pair of live entities and looks up what each tag pair does.

use bitflags::bitflags;
use glam::Vec2;
use rand::Rng;

use super::components::{BounceTracker, Lifespan, Transform};
use super::context::{Scoreboard, SimContext};
use super::effects::{Effect, EffectKind, Effects};
use super::entity::{EntityId, Tag};
use super::store::EntityStore;
use crate::audio::{AudioCue, AudioSink};
use crate::consts::*;
use crate::error::SimError;
use crate::{Aabb, centered_in};

bitflags! {
    /// Window edges a box touches or crosses
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Bounds: u8 {
        const TOP = 1 << 0;
        const BOTTOM = 1 << 1;
        const LEFT = 1 << 2;
        const RIGHT = 1 << 3;
    }
}

bitflags! {
    /// Where one box's center lies relative to another's (screen y grows down)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct RelativePosition: u8 {
        const ABOVE = 1 << 0;
        const BELOW = 1 << 1;
        const LEFT_OF = 1 << 2;
        const RIGHT_OF = 1 << 3;
    }
}

/// Boundary violations; touching an edge counts
pub fn detect_out_of_bounds(aabb: &Aabb, window: Vec2) -> Bounds {
    let mut bounds = Bounds::empty();
    if aabb.min.y <= 0.0 {
        bounds |= Bounds::TOP;
    }
    if aabb.min.y + aabb.size.y >= window.y {
        bounds |= Bounds::BOTTOM;
    }
    if aabb.min.x <= 0.0 {
        bounds |= Bounds::LEFT;
    }
    if aabb.min.x + aabb.size.x >= window.x {
        bounds |= Bounds::RIGHT;
    }
    bounds
}

/// Penetration depth per axis; negative means separated on that axis
pub fn calculate_overlap(a: &Aabb, b: &Aabb) -> Vec2 {
    let delta = (a.center() - b.center()).abs();
    a.half() + b.half() - delta
}

/// True iff the boxes overlap on both axes
pub fn calculate_collision(a: &Aabb, b: &Aabb) -> bool {
    let overlap = calculate_overlap(a, b);
    overlap.x > 0.0 && overlap.y > 0.0
}

/// Flags describing `a` relative to `b`.
///
/// Equal centers on an axis set neither flag for that axis.
pub fn position_relative_to(a: &Aabb, b: &Aabb) -> RelativePosition {
    let ca = a.center();
    let cb = b.center();
    let mut flags = RelativePosition::empty();
    if ca.y < cb.y {
        flags |= RelativePosition::ABOVE;
    }
    if ca.y > cb.y {
        flags |= RelativePosition::BELOW;
    }
    if ca.x < cb.x {
        flags |= RelativePosition::LEFT_OF;
    }
    if ca.x > cb.x {
        flags |= RelativePosition::RIGHT_OF;
    }
    flags
}

/// Entity-level wrapper around `detect_out_of_bounds`
pub fn entity_out_of_bounds(
    store: &EntityStore,
    id: EntityId,
    window: Vec2,
) -> Result<Bounds, SimError> {
    Ok(detect_out_of_bounds(&store.aabb(id)?, window))
}

/// Entity-level wrapper around `calculate_overlap`
pub fn entity_overlap(store: &EntityStore, a: EntityId, b: EntityId) -> Result<Vec2, SimError> {
    Ok(calculate_overlap(&store.aabb(a)?, &store.aabb(b)?))
}

/// Entity-level wrapper around `calculate_collision`
pub fn entities_collide(store: &EntityStore, a: EntityId, b: EntityId) -> Result<bool, SimError> {
    Ok(calculate_collision(&store.aabb(a)?, &store.aabb(b)?))
}

/// Push `transform` out along the least-penetrated axis.
///
/// `overlap.x > overlap.y` resolves vertically, `overlap.x < overlap.y`
/// horizontally. Ties resolve neither axis.
fn push_out(transform: &mut Transform, overlap: Vec2, relative: RelativePosition) {
    if overlap.x > overlap.y {
        if relative.contains(RelativePosition::ABOVE) {
            transform.pos.y -= overlap.y;
            transform.vel.y = -transform.vel.y;
        } else if relative.contains(RelativePosition::BELOW) {
            transform.pos.y += overlap.y;
            transform.vel.y = -transform.vel.y;
        }
    } else if overlap.x < overlap.y {
        if relative.contains(RelativePosition::LEFT_OF) {
            transform.pos.x -= overlap.x;
            transform.vel.x = -transform.vel.x;
        } else if relative.contains(RelativePosition::RIGHT_OF) {
            transform.pos.x += overlap.x;
            transform.vel.x = -transform.vel.x;
        }
    }
}

/// Clamp the player's corner so the box stays inside the window.
/// Velocity is left alone.
pub fn enforce_player_bounds(
    store: &mut EntityStore,
    id: EntityId,
    window: Vec2,
) -> Result<(), SimError> {
    let aabb = store.aabb(id)?;
    let bounds = detect_out_of_bounds(&aabb, window);
    if bounds.is_empty() {
        return Ok(());
    }
    let transform = store.component_mut::<Transform>(id)?;
    if bounds.contains(Bounds::TOP) {
        transform.pos.y = 0.0;
    }
    if bounds.contains(Bounds::BOTTOM) {
        transform.pos.y = window.y - aabb.size.y;
    }
    if bounds.contains(Bounds::LEFT) {
        transform.pos.x = 0.0;
    }
    if bounds.contains(Bounds::RIGHT) {
        transform.pos.x = window.x - aabb.size.x;
    }
    Ok(())
}

/// Destroy a non-player entity touching any window edge
pub fn enforce_non_player_bounds(
    store: &mut EntityStore,
    id: EntityId,
    window: Vec2,
) -> Result<(), SimError> {
    if entity_out_of_bounds(store, id, window)?.is_empty() {
        return Ok(());
    }
    log::trace!("{id} left the arena");
    store.destroy(id);
    Ok(())
}

/// Bounce `id` off a static wall and count the bounce
pub fn enforce_collision_with_wall(
    store: &mut EntityStore,
    id: EntityId,
    wall: EntityId,
) -> Result<(), SimError> {
    let aabb = store.aabb(id)?;
    let wall_aabb = store.aabb(wall)?;
    let overlap = calculate_overlap(&aabb, &wall_aabb);
    let relative = position_relative_to(&aabb, &wall_aabb);

    push_out(store.component_mut::<Transform>(id)?, overlap, relative);
    if let Some(tracker) = store.get_mut::<BounceTracker>(id) {
        tracker.bounces += 1;
    }
    Ok(())
}

/// Separate two moving entities; each is pushed by its own relative position
pub fn enforce_entity_entity_collision(
    store: &mut EntityStore,
    a: EntityId,
    b: EntityId,
) -> Result<(), SimError> {
    let aabb_a = store.aabb(a)?;
    let aabb_b = store.aabb(b)?;
    let overlap = calculate_overlap(&aabb_a, &aabb_b);
    let rel_a = position_relative_to(&aabb_a, &aabb_b);
    let rel_b = position_relative_to(&aabb_b, &aabb_a);

    push_out(store.component_mut::<Transform>(a)?, overlap, rel_a);
    push_out(store.component_mut::<Transform>(b)?, overlap, rel_b);
    Ok(())
}

/// Bounds pass: clamp the player, destroy anything else that touches an edge.
/// Walls are never checked.
pub fn handle_entity_bounds(store: &mut EntityStore, window: Vec2) {
    let ids = store.entities().to_vec();
    for id in ids {
        let Some(tag) = store.tag(id) else { continue };
        if !store.is_active(id) || tag == Tag::Wall {
            continue;
        }
        let result = if tag == Tag::Player {
            enforce_player_bounds(store, id, window)
        } else {
            enforce_non_player_bounds(store, id, window)
        };
        if let Err(err) = result {
            log::warn!("bounds check skipped: {err}");
        }
    }
}

/// What happens when `entity` overlaps `other`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    None,
    /// Any moving entity against a wall
    WallBounce,
    /// Bounce off the wall and play the hit cue
    BulletWall,
    /// Two moving entities separate
    BounceApart,
    BulletEnemy,
    /// Bullet shoots down a boost, debuff or item. A debuff always pays
    /// +15; a boost or item costs 15 only while the score is above 15.
    BulletPickup,
    PlayerEnemy,
    PlayerSlowness,
    PlayerSpeedBoost,
    PlayerItem,
}

/// Interaction table keyed by the ordered tag pair
pub fn interaction(entity: Tag, other: Tag) -> Interaction {
    use Tag::*;
    match (entity, other) {
        (Wall, _) => Interaction::None,
        (Bullet, Wall) => Interaction::BulletWall,
        (_, Wall) => Interaction::WallBounce,
        (Enemy, Enemy | SpeedBoost | SlownessDebuff) => Interaction::BounceApart,
        (Bullet, Enemy) => Interaction::BulletEnemy,
        (Bullet, SlownessDebuff | SpeedBoost | Item) => Interaction::BulletPickup,
        (Player, Enemy) => Interaction::PlayerEnemy,
        (Player, SlownessDebuff) => Interaction::PlayerSlowness,
        (Player, SpeedBoost) => Interaction::PlayerSpeedBoost,
        (Player, Item) => Interaction::PlayerItem,
        (Item, Enemy | SpeedBoost | SlownessDebuff) => Interaction::BounceApart,
        _ => Interaction::None,
    }
}

/// Active entities of `tag` whose center lies within `radius` of `center`
pub fn entities_within(
    store: &EntityStore,
    tag: Tag,
    center: Vec2,
    radius: f32,
) -> Vec<EntityId> {
    store
        .active_with_tag(tag)
        .into_iter()
        .filter(|&id| {
            store
                .center(id)
                .is_ok_and(|c| c.distance(center) <= radius)
        })
        .collect()
}

/// Pairwise pass over every ordered pair of active live entities
pub fn handle_entity_entity_collision(
    store: &mut EntityStore,
    ctx: &mut SimContext,
    scoreboard: &mut dyn Scoreboard,
    audio: &mut dyn AudioSink,
) {
    let ids = store.entities().to_vec();
    for &entity in &ids {
        for &other in &ids {
            if entity == other {
                continue;
            }
            // Destroyed earlier this pass
            if !store.is_active(entity) || !store.is_active(other) {
                continue;
            }
            let (Some(entity_tag), Some(other_tag)) = (store.tag(entity), store.tag(other))
            else {
                continue;
            };
            let action = interaction(entity_tag, other_tag);
            if action == Interaction::None {
                continue;
            }
            match entities_collide(store, entity, other) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(err) => {
                    log::warn!("collision check skipped: {err}");
                    continue;
                }
            }
            if let Err(err) =
                resolve_interaction(store, ctx, scoreboard, audio, action, entity, other)
            {
                log::warn!("{action:?} between {entity} and {other} skipped: {err}");
            }
        }
    }
}

fn resolve_interaction(
    store: &mut EntityStore,
    ctx: &mut SimContext,
    scoreboard: &mut dyn Scoreboard,
    audio: &mut dyn AudioSink,
    action: Interaction,
    entity: EntityId,
    other: EntityId,
) -> Result<(), SimError> {
    match action {
        Interaction::None => {}
        Interaction::WallBounce => enforce_collision_with_wall(store, entity, other)?,
        Interaction::BulletWall => {
            enforce_collision_with_wall(store, entity, other)?;
            queue(audio, AudioCue::BulletHit);
        }
        Interaction::BounceApart => enforce_entity_entity_collision(store, entity, other)?,
        Interaction::BulletEnemy => {
            let bounces = store
                .get::<BounceTracker>(entity)
                .map(|t| t.bounces as i32)
                .unwrap_or(0);
            store.destroy(entity);
            store.destroy(other);
            scoreboard.set_score(scoreboard.score() + BULLET_HIT_BASE * (bounces + 1));
            queue(audio, AudioCue::BulletHit);
        }
        Interaction::BulletPickup => {
            store.destroy(entity);
            store.destroy(other);
            let score = scoreboard.score();
            // Debuff: unconditional reward. Boost or item: penalty above the threshold only.
            match store.tag(other) {
                Some(Tag::SlownessDebuff) => scoreboard.set_score(score + PICKUP_SHOT_DELTA),
                _ if score > PICKUP_SHOT_DELTA => scoreboard.set_score(score - PICKUP_SHOT_DELTA),
                _ => {}
            }
            queue(audio, AudioCue::PickupShot);
        }
        Interaction::PlayerEnemy => player_hits_enemy(store, ctx, scoreboard, entity, other)?,
        Interaction::PlayerSlowness => player_takes_slowness(store, ctx, entity, other)?,
        Interaction::PlayerSpeedBoost => player_takes_speed_boost(store, ctx, entity, other)?,
        Interaction::PlayerItem => {
            scoreboard.set_score(scoreboard.score() + ITEM_REWARD);
            store.destroy(other);
            queue(audio, AudioCue::ItemCollect);
        }
    }

    // Player cues live here so the handlers stay audio-free
    match action {
        Interaction::PlayerEnemy => queue(audio, AudioCue::PlayerHurt),
        Interaction::PlayerSlowness => queue(audio, AudioCue::SlowDown),
        Interaction::PlayerSpeedBoost => queue(audio, AudioCue::SpeedUp),
        _ => {}
    }
    Ok(())
}

fn queue(audio: &mut dyn AudioSink, cue: AudioCue) {
    audio.queue_sample(cue, cue.priority());
}

/// Lose a life, re-center the player and clear the area around it
fn player_hits_enemy(
    store: &mut EntityStore,
    ctx: &mut SimContext,
    scoreboard: &mut dyn Scoreboard,
    player: EntityId,
    enemy: EntityId,
) -> Result<(), SimError> {
    scoreboard.set_score((scoreboard.score() - PLAYER_HIT_PENALTY).max(0));
    store.destroy(enemy);
    scoreboard.decrement_lives();

    let size = store.aabb(player)?.size;
    store.component_mut::<Transform>(player)?.pos = centered_in(ctx.window, size);

    let center = store.center(player)?;
    for id in entities_within(store, Tag::Enemy, center, ctx.config.interaction_radius) {
        store.destroy(id);
    }
    if let Some(effects) = store.get_mut::<Effects>(player) {
        effects.clear();
    }
    log::info!("player hit by {enemy}");
    Ok(())
}

fn player_takes_slowness(
    store: &mut EntityStore,
    ctx: &mut SimContext,
    player: EntityId,
    debuff: EntityId,
) -> Result<(), SimError> {
    let (min, max) = SLOWNESS_DURATION_MS;
    let duration = ctx.rng.random_range(min..=max);
    add_effect(store, player, Effect::new(EffectKind::Slowness, ctx.now_ms, duration))?;
    store.destroy(debuff);

    let center = store.center(player)?;
    let radius = ctx.config.interaction_radius;
    for tag in [Tag::SlownessDebuff, Tag::SpeedBoost] {
        for id in entities_within(store, tag, center, radius) {
            store.destroy(id);
        }
    }
    for id in store.active_with_tag(Tag::SpeedBoost) {
        store.destroy(id);
    }
    Ok(())
}

fn player_takes_speed_boost(
    store: &mut EntityStore,
    ctx: &mut SimContext,
    player: EntityId,
    boost: EntityId,
) -> Result<(), SimError> {
    let (min, max) = SPEED_DURATION_MS;
    let duration = ctx.rng.random_range(min..=max);
    add_effect(store, player, Effect::new(EffectKind::Speed, ctx.now_ms, duration))?;
    store.destroy(boost);

    let center = store.center(player)?;
    for id in entities_within(store, Tag::SpeedBoost, center, ctx.config.interaction_radius) {
        store.destroy(id);
    }
    for id in store.active_with_tag(Tag::SpeedBoost) {
        if let Some(lifespan) = store.get_mut::<Lifespan>(id) {
            lifespan.scale(BOOST_LIFESPAN_FACTOR);
        }
    }
    for id in store.active_with_tag(Tag::SlownessDebuff) {
        store.destroy(id);
    }
    Ok(())
}

/// Add an effect, creating the `Effects` slot if needed.
/// Returns false when an effect of that kind was already present.
pub fn add_effect(store: &mut EntityStore, id: EntityId, effect: Effect) -> Result<bool, SimError> {
    if let Some(effects) = store.get_mut::<Effects>(id) {
        return Ok(effects.add(effect));
    }
    let mut effects = Effects::new();
    effects.add(effect);
    store.insert(id, effects)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::CueQueue;
    use crate::config::GameConfig;
    use crate::sim::{Session, Shape};
    use proptest::prelude::*;

    fn boxed(x: f32, y: f32, w: f32, h: f32) -> Aabb {
        Aabb::new(Vec2::new(x, y), Vec2::new(w, h))
    }

    fn spawn_box(store: &mut EntityStore, tag: Tag, pos: Vec2, size: Vec2, vel: Vec2) -> EntityId {
        let id = store.add_entity(tag);
        store.insert(id, Transform::new(pos, vel)).unwrap();
        store
            .insert(
                id,
                Shape {
                    width: size.x,
                    height: size.y,
                    ..Default::default()
                },
            )
            .unwrap();
        id
    }

    fn context() -> SimContext {
        let mut config = GameConfig::default();
        config.window.width = 1000.0;
        config.window.height = 1000.0;
        config.walls.clear();
        SimContext::new(config)
    }

    #[test]
    fn test_overlap_of_offset_squares() {
        let a = boxed(0.0, 0.0, 20.0, 20.0);
        let b = boxed(10.0, 0.0, 20.0, 20.0);
        assert_eq!(calculate_overlap(&a, &b), Vec2::new(10.0, 20.0));
        assert!(calculate_collision(&a, &b));
    }

    #[test]
    fn test_touching_edges_do_not_collide() {
        let a = boxed(0.0, 0.0, 20.0, 20.0);
        let b = boxed(20.0, 0.0, 20.0, 20.0);
        assert_eq!(calculate_overlap(&a, &b).x, 0.0);
        assert!(!calculate_collision(&a, &b));
    }

    #[test]
    fn test_out_of_bounds_left_only() {
        let aabb = boxed(0.0, 5.0, 10.0, 10.0);
        let bounds = detect_out_of_bounds(&aabb, Vec2::new(100.0, 100.0));
        assert_eq!(bounds, Bounds::LEFT);
    }

    #[test]
    fn test_out_of_bounds_far_edges_inclusive() {
        let aabb = boxed(90.0, 90.0, 10.0, 10.0);
        let bounds = detect_out_of_bounds(&aabb, Vec2::new(100.0, 100.0));
        assert_eq!(bounds, Bounds::BOTTOM | Bounds::RIGHT);
        assert!(detect_out_of_bounds(&boxed(1.0, 1.0, 10.0, 10.0), Vec2::splat(100.0)).is_empty());
    }

    #[test]
    fn test_relative_position_equal_centers_set_nothing() {
        let a = boxed(0.0, 0.0, 10.0, 10.0);
        let b = boxed(0.0, 20.0, 10.0, 10.0);
        assert_eq!(position_relative_to(&a, &b), RelativePosition::ABOVE);
        assert_eq!(position_relative_to(&b, &a), RelativePosition::BELOW);
        assert!(position_relative_to(&a, &a).is_empty());
    }

    #[test]
    fn test_player_bounds_clamp_without_velocity_change() {
        let mut store = EntityStore::new();
        let window = Vec2::new(100.0, 100.0);
        let player = spawn_box(
            &mut store,
            Tag::Player,
            Vec2::new(-5.0, 95.0),
            Vec2::splat(10.0),
            Vec2::new(-1.0, 1.0),
        );
        store.commit();

        enforce_player_bounds(&mut store, player, window).unwrap();
        let transform = store.get::<Transform>(player).unwrap();
        assert_eq!(transform.pos, Vec2::new(0.0, 90.0));
        assert_eq!(transform.vel, Vec2::new(-1.0, 1.0));
    }

    #[test]
    fn test_non_player_touching_edge_destroyed_walls_exempt() {
        let mut store = EntityStore::new();
        let enemy = spawn_box(
            &mut store,
            Tag::Enemy,
            Vec2::new(0.0, 50.0),
            Vec2::splat(10.0),
            Vec2::ZERO,
        );
        let wall = spawn_box(
            &mut store,
            Tag::Wall,
            Vec2::new(0.0, 0.0),
            Vec2::splat(10.0),
            Vec2::ZERO,
        );
        let inside = spawn_box(
            &mut store,
            Tag::Item,
            Vec2::new(40.0, 40.0),
            Vec2::splat(10.0),
            Vec2::ZERO,
        );
        store.commit();

        handle_entity_bounds(&mut store, Vec2::new(100.0, 100.0));
        assert!(!store.is_active(enemy));
        assert!(store.is_active(wall));
        assert!(store.is_active(inside));
    }

    #[test]
    fn test_wall_collision_vertical_push_and_bounce_count() {
        let mut store = EntityStore::new();
        // Entity sitting 4px into the top of a wide wall
        let enemy = spawn_box(
            &mut store,
            Tag::Enemy,
            Vec2::new(50.0, 84.0),
            Vec2::splat(20.0),
            Vec2::new(1.0, 1.0),
        );
        let wall = spawn_box(
            &mut store,
            Tag::Wall,
            Vec2::new(0.0, 100.0),
            Vec2::new(200.0, 20.0),
            Vec2::ZERO,
        );
        store.insert(enemy, BounceTracker::default()).unwrap();
        store.commit();

        enforce_collision_with_wall(&mut store, enemy, wall).unwrap();
        let transform = store.get::<Transform>(enemy).unwrap();
        assert_eq!(transform.pos, Vec2::new(50.0, 80.0));
        assert_eq!(transform.vel, Vec2::new(1.0, -1.0));
        assert_eq!(store.get::<BounceTracker>(enemy).unwrap().bounces, 1);
    }

    #[test]
    fn test_wall_collision_horizontal_push() {
        let mut store = EntityStore::new();
        // Entity 3px into the right side of a tall wall
        let enemy = spawn_box(
            &mut store,
            Tag::Enemy,
            Vec2::new(117.0, 50.0),
            Vec2::splat(20.0),
            Vec2::new(-2.0, 0.5),
        );
        let wall = spawn_box(
            &mut store,
            Tag::Wall,
            Vec2::new(100.0, 0.0),
            Vec2::new(20.0, 200.0),
            Vec2::ZERO,
        );
        store.commit();

        enforce_collision_with_wall(&mut store, enemy, wall).unwrap();
        let transform = store.get::<Transform>(enemy).unwrap();
        assert_eq!(transform.pos, Vec2::new(120.0, 50.0));
        assert_eq!(transform.vel, Vec2::new(2.0, 0.5));
    }

    #[test]
    fn test_equal_overlap_leaves_entities_interpenetrating() {
        let mut store = EntityStore::new();
        let enemy = spawn_box(
            &mut store,
            Tag::Enemy,
            Vec2::new(5.0, 5.0),
            Vec2::splat(10.0),
            Vec2::ONE,
        );
        let wall = spawn_box(
            &mut store,
            Tag::Wall,
            Vec2::new(10.0, 10.0),
            Vec2::splat(10.0),
            Vec2::ZERO,
        );
        store.insert(enemy, BounceTracker::default()).unwrap();
        store.commit();

        enforce_collision_with_wall(&mut store, enemy, wall).unwrap();
        let transform = store.get::<Transform>(enemy).unwrap();
        assert_eq!(transform.pos, Vec2::new(5.0, 5.0));
        assert_eq!(transform.vel, Vec2::ONE);
        // Still counted
        assert_eq!(store.get::<BounceTracker>(enemy).unwrap().bounces, 1);
    }

    #[test]
    fn test_entity_entity_pushes_both_apart() {
        let mut store = EntityStore::new();
        let a = spawn_box(
            &mut store,
            Tag::Enemy,
            Vec2::new(0.0, 0.0),
            Vec2::splat(20.0),
            Vec2::new(1.0, 0.0),
        );
        let b = spawn_box(
            &mut store,
            Tag::Enemy,
            Vec2::new(15.0, 2.0),
            Vec2::splat(20.0),
            Vec2::new(-1.0, 0.0),
        );
        store.commit();
        assert_eq!(entity_overlap(&store, a, b).unwrap(), Vec2::new(5.0, 18.0));
        assert_eq!(entity_overlap(&store, b, a).unwrap(), Vec2::new(5.0, 18.0));
        assert!(entity_overlap(&store, a, EntityId(99)).is_err());

        enforce_entity_entity_collision(&mut store, a, b).unwrap();
        let ta = *store.get::<Transform>(a).unwrap();
        let tb = *store.get::<Transform>(b).unwrap();
        assert_eq!(ta.pos.x, -5.0);
        assert_eq!(tb.pos.x, 20.0);
        assert_eq!(ta.vel.x, -1.0);
        assert_eq!(tb.vel.x, 1.0);
    }

    #[test]
    fn test_interaction_table() {
        assert_eq!(interaction(Tag::Enemy, Tag::Wall), Interaction::WallBounce);
        assert_eq!(interaction(Tag::Player, Tag::Wall), Interaction::WallBounce);
        assert_eq!(interaction(Tag::Bullet, Tag::Wall), Interaction::BulletWall);
        assert_eq!(interaction(Tag::Wall, Tag::Wall), Interaction::None);
        assert_eq!(interaction(Tag::Enemy, Tag::SpeedBoost), Interaction::BounceApart);
        assert_eq!(interaction(Tag::Bullet, Tag::Enemy), Interaction::BulletEnemy);
        assert_eq!(interaction(Tag::Enemy, Tag::Bullet), Interaction::None);
        assert_eq!(interaction(Tag::Bullet, Tag::Item), Interaction::BulletPickup);
        assert_eq!(interaction(Tag::Player, Tag::Enemy), Interaction::PlayerEnemy);
        assert_eq!(interaction(Tag::Enemy, Tag::Player), Interaction::None);
        assert_eq!(interaction(Tag::Item, Tag::SlownessDebuff), Interaction::BounceApart);
        assert_eq!(interaction(Tag::Player, Tag::Bullet), Interaction::None);
    }

    #[test]
    fn test_bullet_hits_enemy_scales_with_bounces() {
        let mut store = EntityStore::new();
        let mut ctx = context();
        let mut session = Session::new(3, 60_000);
        session.set_score(10);
        let mut audio = CueQueue::new();

        let bullet = spawn_box(
            &mut store,
            Tag::Bullet,
            Vec2::new(100.0, 100.0),
            Vec2::splat(6.0),
            Vec2::X,
        );
        store.insert(bullet, BounceTracker { bounces: 2 }).unwrap();
        let enemy = spawn_box(
            &mut store,
            Tag::Enemy,
            Vec2::new(98.0, 98.0),
            Vec2::splat(20.0),
            Vec2::ZERO,
        );
        store.commit();

        handle_entity_entity_collision(&mut store, &mut ctx, &mut session, &mut audio);
        assert_eq!(session.score(), 25);
        assert!(!store.is_active(bullet));
        assert!(!store.is_active(enemy));
        assert_eq!(audio.count(AudioCue::BulletHit), 1);
    }

    #[test]
    fn test_player_collects_item() {
        let mut store = EntityStore::new();
        let mut ctx = context();
        let mut session = Session::new(3, 60_000);
        session.set_score(5);
        let mut audio = CueQueue::new();

        let player = spawn_box(
            &mut store,
            Tag::Player,
            Vec2::new(200.0, 200.0),
            Vec2::splat(30.0),
            Vec2::ZERO,
        );
        let item = spawn_box(
            &mut store,
            Tag::Item,
            Vec2::new(210.0, 210.0),
            Vec2::splat(12.0),
            Vec2::ZERO,
        );
        store.commit();

        handle_entity_entity_collision(&mut store, &mut ctx, &mut session, &mut audio);
        assert_eq!(session.score(), 95);
        assert!(!store.is_active(item));
        assert!(store.is_active(player));
        assert_eq!(session.lives(), 3);
        assert_eq!(store.get::<Transform>(player).unwrap().pos, Vec2::new(200.0, 200.0));
    }

    #[test]
    fn test_player_hits_enemy() {
        let mut store = EntityStore::new();
        let mut ctx = context();
        let mut session = Session::new(3, 60_000);
        session.set_score(4);
        let mut audio = CueQueue::new();

        let player = spawn_box(
            &mut store,
            Tag::Player,
            Vec2::new(50.0, 50.0),
            Vec2::splat(30.0),
            Vec2::ZERO,
        );
        add_effect(&mut store, player, Effect::new(EffectKind::Speed, 0, 10_000)).unwrap();
        let enemy = spawn_box(
            &mut store,
            Tag::Enemy,
            Vec2::new(60.0, 60.0),
            Vec2::splat(20.0),
            Vec2::ZERO,
        );
        // Near the arena center, so within the clear radius after re-centering
        let near_center = spawn_box(
            &mut store,
            Tag::Enemy,
            Vec2::new(540.0, 500.0),
            Vec2::splat(20.0),
            Vec2::ZERO,
        );
        let far = spawn_box(
            &mut store,
            Tag::Enemy,
            Vec2::new(900.0, 900.0),
            Vec2::splat(20.0),
            Vec2::ZERO,
        );
        store.commit();

        handle_entity_entity_collision(&mut store, &mut ctx, &mut session, &mut audio);
        assert_eq!(session.score(), 0);
        assert_eq!(session.lives(), 2);
        assert!(!store.is_active(enemy));
        assert!(!store.is_active(near_center));
        assert!(store.is_active(far));
        assert_eq!(store.get::<Transform>(player).unwrap().pos, Vec2::new(485.0, 485.0));
        assert!(store.get::<Effects>(player).unwrap().is_empty());
        assert_eq!(audio.count(AudioCue::PlayerHurt), 1);
    }

    #[test]
    fn test_player_takes_slowness() {
        let mut store = EntityStore::new();
        let mut ctx = context();
        ctx.now_ms = 1_000;
        let mut session = Session::new(3, 60_000);
        let mut audio = CueQueue::new();

        let player = spawn_box(
            &mut store,
            Tag::Player,
            Vec2::new(100.0, 100.0),
            Vec2::splat(30.0),
            Vec2::ZERO,
        );
        let debuff = spawn_box(
            &mut store,
            Tag::SlownessDebuff,
            Vec2::new(110.0, 110.0),
            Vec2::splat(16.0),
            Vec2::ZERO,
        );
        let near_debuff = spawn_box(
            &mut store,
            Tag::SlownessDebuff,
            Vec2::new(180.0, 100.0),
            Vec2::splat(16.0),
            Vec2::ZERO,
        );
        let far_debuff = spawn_box(
            &mut store,
            Tag::SlownessDebuff,
            Vec2::new(800.0, 800.0),
            Vec2::splat(16.0),
            Vec2::ZERO,
        );
        let far_boost = spawn_box(
            &mut store,
            Tag::SpeedBoost,
            Vec2::new(700.0, 800.0),
            Vec2::splat(16.0),
            Vec2::ZERO,
        );
        store.commit();

        handle_entity_entity_collision(&mut store, &mut ctx, &mut session, &mut audio);
        let effects = store.get::<Effects>(player).unwrap();
        assert!(effects.has(EffectKind::Slowness));
        let effect = effects.iter().next().unwrap();
        assert_eq!(effect.start_ms, 1_000);
        assert!((5_000..=10_000).contains(&effect.duration_ms));

        assert!(!store.is_active(debuff));
        assert!(!store.is_active(near_debuff));
        assert!(store.is_active(far_debuff));
        assert!(!store.is_active(far_boost));
    }

    #[test]
    fn test_player_takes_speed_boost() {
        let mut store = EntityStore::new();
        let mut ctx = context();
        let mut session = Session::new(3, 60_000);
        let mut audio = CueQueue::new();

        let player = spawn_box(
            &mut store,
            Tag::Player,
            Vec2::new(100.0, 100.0),
            Vec2::splat(30.0),
            Vec2::ZERO,
        );
        let boost = spawn_box(
            &mut store,
            Tag::SpeedBoost,
            Vec2::new(110.0, 110.0),
            Vec2::splat(16.0),
            Vec2::ZERO,
        );
        let far_boost = spawn_box(
            &mut store,
            Tag::SpeedBoost,
            Vec2::new(800.0, 800.0),
            Vec2::splat(16.0),
            Vec2::ZERO,
        );
        store.insert(far_boost, Lifespan::new(0, 8_000)).unwrap();
        let far_debuff = spawn_box(
            &mut store,
            Tag::SlownessDebuff,
            Vec2::new(700.0, 800.0),
            Vec2::splat(16.0),
            Vec2::ZERO,
        );
        store.commit();

        handle_entity_entity_collision(&mut store, &mut ctx, &mut session, &mut audio);
        let effects = store.get::<Effects>(player).unwrap();
        assert!(effects.has(EffectKind::Speed));
        assert!((9_000..=15_000).contains(&effects.iter().next().unwrap().duration_ms));
        assert!(!store.is_active(boost));
        assert!(store.is_active(far_boost));
        assert_eq!(store.get::<Lifespan>(far_boost).unwrap().duration_ms, 800);
        assert!(!store.is_active(far_debuff));
    }

    #[test]
    fn test_bullet_shoots_pickups() {
        let mut store = EntityStore::new();
        let mut ctx = context();
        let mut session = Session::new(3, 60_000);
        session.set_score(20);
        let mut audio = CueQueue::new();

        let bullet = spawn_box(
            &mut store,
            Tag::Bullet,
            Vec2::new(100.0, 100.0),
            Vec2::splat(6.0),
            Vec2::X,
        );
        let item = spawn_box(
            &mut store,
            Tag::Item,
            Vec2::new(98.0, 98.0),
            Vec2::splat(12.0),
            Vec2::ZERO,
        );
        store.commit();
        handle_entity_entity_collision(&mut store, &mut ctx, &mut session, &mut audio);
        assert_eq!(session.score(), 5);
        assert!(!store.is_active(bullet) && !store.is_active(item));

        // Below the threshold nothing is subtracted
        let bullet = spawn_box(
            &mut store,
            Tag::Bullet,
            Vec2::new(300.0, 300.0),
            Vec2::splat(6.0),
            Vec2::X,
        );
        let boost = spawn_box(
            &mut store,
            Tag::SpeedBoost,
            Vec2::new(298.0, 298.0),
            Vec2::splat(16.0),
            Vec2::ZERO,
        );
        store.commit();
        handle_entity_entity_collision(&mut store, &mut ctx, &mut session, &mut audio);
        assert_eq!(session.score(), 5);
        assert!(!store.is_active(bullet) && !store.is_active(boost));

        let _bullet = spawn_box(
            &mut store,
            Tag::Bullet,
            Vec2::new(500.0, 500.0),
            Vec2::splat(6.0),
            Vec2::X,
        );
        let _debuff = spawn_box(
            &mut store,
            Tag::SlownessDebuff,
            Vec2::new(498.0, 498.0),
            Vec2::splat(16.0),
            Vec2::ZERO,
        );
        store.commit();
        handle_entity_entity_collision(&mut store, &mut ctx, &mut session, &mut audio);
        assert_eq!(session.score(), 20);
    }

    #[test]
    fn test_bullet_wall_bounces_and_cues() {
        let mut store = EntityStore::new();
        let mut ctx = context();
        let mut session = Session::new(3, 60_000);
        let mut audio = CueQueue::new();

        let bullet = spawn_box(
            &mut store,
            Tag::Bullet,
            Vec2::new(95.0, 150.0),
            Vec2::splat(6.0),
            Vec2::new(8.0, 0.0),
        );
        store.insert(bullet, BounceTracker::default()).unwrap();
        let _wall = spawn_box(
            &mut store,
            Tag::Wall,
            Vec2::new(100.0, 100.0),
            Vec2::new(20.0, 200.0),
            Vec2::ZERO,
        );
        store.commit();

        handle_entity_entity_collision(&mut store, &mut ctx, &mut session, &mut audio);
        assert!(store.is_active(bullet));
        assert_eq!(store.get::<BounceTracker>(bullet).unwrap().bounces, 1);
        assert_eq!(store.get::<Transform>(bullet).unwrap().vel.x, -8.0);
        assert_eq!(audio.count(AudioCue::BulletHit), 1);
    }

    #[test]
    fn test_missing_shape_is_skipped() {
        let mut store = EntityStore::new();
        let mut ctx = context();
        let mut session = Session::new(3, 60_000);
        let mut audio = CueQueue::new();

        let player = store.add_entity(Tag::Player);
        store.insert(player, Transform::default()).unwrap();
        let item = spawn_box(
            &mut store,
            Tag::Item,
            Vec2::ZERO,
            Vec2::splat(12.0),
            Vec2::ZERO,
        );
        store.commit();

        handle_entity_entity_collision(&mut store, &mut ctx, &mut session, &mut audio);
        assert!(store.is_active(item));
        assert_eq!(session.score(), 0);
    }

    proptest! {
        #[test]
        fn prop_overlap_is_symmetric(
            ax in -100.0f32..100.0, ay in -100.0f32..100.0,
            bx in -100.0f32..100.0, by in -100.0f32..100.0,
            aw in 1.0f32..50.0, ah in 1.0f32..50.0,
            bw in 1.0f32..50.0, bh in 1.0f32..50.0,
        ) {
            let a = boxed(ax, ay, aw, ah);
            let b = boxed(bx, by, bw, bh);
            prop_assert_eq!(calculate_overlap(&a, &b), calculate_overlap(&b, &a));
            prop_assert_eq!(calculate_collision(&a, &b), calculate_collision(&b, &a));
        }
    }
}
