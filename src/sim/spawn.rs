//! Procedural spawn placement
//!
//! New entities get a random in-window position and a non-zero velocity,
//! then placement is retried a bounded number of times until the box
//! touches neither a window edge nor any live entity. Exhausting the
//! attempts is a normal outcome: the entity is destroyed and swept out on
//! the next commit.

use glam::Vec2;
use rand::Rng;

use super::collision::{calculate_collision, detect_out_of_bounds};
use super::components::{BounceTracker, Lifespan, Transform};
use super::context::SimContext;
use super::entity::{EntityId, Tag};
use super::store::EntityStore;
use crate::Aabb;
use crate::config::ArchetypeConfig;
use crate::consts::MAX_SPAWN_ATTEMPTS;
use crate::error::SimError;

/// Archetypes rolled by the per-frame spawner, in draw order
pub const SPAWNED_ARCHETYPES: [Tag; 4] =
    [Tag::Enemy, Tag::SpeedBoost, Tag::SlownessDebuff, Tag::Item];

/// Uniform corner position within the window
pub fn create_random_position<R: Rng>(rng: &mut R, window: Vec2) -> Vec2 {
    let x = rng.random_range(0.0..window.x);
    let y = rng.random_range(0.0..window.y);
    Vec2::new(x, y)
}

/// Velocity in {-1, 0, 1}², rejection-sampled until non-zero
pub fn create_valid_velocity<R: Rng>(rng: &mut R) -> Vec2 {
    loop {
        let x = rng.random_range(-1..=1);
        let y = rng.random_range(-1..=1);
        if x != 0 || y != 0 {
            return Vec2::new(x as f32, y as f32);
        }
    }
}

/// True iff `candidate` is strictly inside the window and clear of the
/// player and every other live entity
pub fn validate_spawn_position(
    candidate: &Aabb,
    candidate_id: EntityId,
    player: EntityId,
    store: &EntityStore,
    window: Vec2,
) -> bool {
    if !detect_out_of_bounds(candidate, window).is_empty() {
        return false;
    }
    match store.aabb(player) {
        Ok(player_box) if calculate_collision(candidate, &player_box) => return false,
        Ok(_) => {}
        Err(err) => {
            log::warn!("spawn check against player skipped: {err}");
        }
    }
    store
        .entities()
        .iter()
        .filter(|&&id| id != candidate_id && id != player)
        .filter_map(|&id| store.aabb(id).ok())
        .all(|other| !calculate_collision(candidate, &other))
}

/// Retry placement for an already-built entity.
///
/// Validates up to `MAX_SPAWN_ATTEMPTS` times, drawing a fresh position
/// after each failure. The velocity is kept.
pub fn place_entity(
    store: &mut EntityStore,
    ctx: &mut SimContext,
    id: EntityId,
    player: EntityId,
) -> Result<bool, SimError> {
    let size = store.aabb(id)?.size;
    for attempt in 1..=MAX_SPAWN_ATTEMPTS {
        if attempt > 1 {
            let pos = create_random_position(&mut ctx.rng, ctx.window);
            store.component_mut::<Transform>(id)?.pos = pos;
        }
        let pos = store.component::<Transform>(id)?.pos;
        if validate_spawn_position(&Aabb::new(pos, size), id, player, store, ctx.window) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Build and place one archetype instance.
///
/// Returns the new id when placement succeeds. On a missing player or
/// exhausted attempts the entity is destroyed and `None` is returned.
pub fn spawn_archetype(
    store: &mut EntityStore,
    ctx: &mut SimContext,
    tag: Tag,
    archetype: &ArchetypeConfig,
    player: Option<EntityId>,
) -> Option<EntityId> {
    let id = store.add_entity(tag);
    let Some(player) = player.filter(|&p| store.is_active(p)) else {
        log::warn!("{tag:?} spawn aborted: {}", SimError::MissingPlayer);
        store.destroy(id);
        return None;
    };

    let placed = build_archetype(store, ctx, id, tag, archetype)
        .and_then(|()| place_entity(store, ctx, id, player));
    match placed {
        Ok(true) => {
            log::trace!("spawned {tag:?} {id}");
            Some(id)
        }
        Ok(false) => {
            log::debug!("{tag:?} {id} found no free spot in {MAX_SPAWN_ATTEMPTS} attempts");
            store.destroy(id);
            None
        }
        Err(err) => {
            log::warn!("{tag:?} spawn failed: {err}");
            store.destroy(id);
            None
        }
    }
}

fn build_archetype(
    store: &mut EntityStore,
    ctx: &mut SimContext,
    id: EntityId,
    tag: Tag,
    archetype: &ArchetypeConfig,
) -> Result<(), SimError> {
    let pos = create_random_position(&mut ctx.rng, ctx.window);
    let vel = create_valid_velocity(&mut ctx.rng);
    store.insert(id, Transform::new(pos, vel))?;
    store.insert(id, archetype.shape.to_shape())?;
    if archetype.lifespan_ms > 0 {
        store.insert(id, Lifespan::new(ctx.now_ms, archetype.lifespan_ms))?;
    }
    if matches!(tag, Tag::Enemy | Tag::SpeedBoost | Tag::SlownessDebuff) {
        store.insert(id, BounceTracker::default())?;
    }
    Ok(())
}

/// Roll each archetype's spawn percentage and spawn the winners
pub fn spawn_archetypes(store: &mut EntityStore, ctx: &mut SimContext, player: Option<EntityId>) {
    for tag in SPAWNED_ARCHETYPES {
        let Some(archetype) = ctx.config.archetype(tag).copied() else {
            continue;
        };
        let roll: u8 = ctx.rng.random_range(0..100);
        if roll < archetype.spawn_percentage {
            spawn_archetype(store, ctx, tag, &archetype, player);
        }
    }
}

/// Fire a bullet from the player's center toward `direction`.
/// Bullets skip placement validation.
pub fn spawn_bullet(
    store: &mut EntityStore,
    ctx: &SimContext,
    player: EntityId,
    direction: Vec2,
) -> Result<EntityId, SimError> {
    let dir = direction.normalize_or_zero();
    if dir == Vec2::ZERO {
        return Err(SimError::InvalidInput("bullet direction is zero".into()));
    }
    let origin = store.center(player)?;
    let bullet = ctx.config.bullet;
    let shape = bullet.shape.to_shape();

    let id = store.add_entity(Tag::Bullet);
    store.insert(id, Transform::new(origin - shape.size() * 0.5, dir))?;
    store.insert(id, shape)?;
    store.insert(id, Lifespan::new(ctx.now_ms, bullet.lifespan_ms))?;
    store.insert(id, BounceTracker::default())?;
    Ok(id)
}
