//! Per-frame simulation step
//!
//! Systems run strictly in order, once per frame:
//! movement → bounds + pairwise collisions → commit → spawning →
//! lifespan sweep → effect expiry → timer countdown.

use glam::Vec2;

use super::collision::{handle_entity_bounds, handle_entity_entity_collision};
use super::components::{Input, Lifespan, Transform};
use super::context::{Scoreboard, Session, SimContext};
use super::effects::{Effects, expire_effects, movement_multiplier};
use super::entity::{EntityId, Tag};
use super::spawn::{spawn_archetypes, spawn_bullet};
use super::store::EntityStore;
use crate::audio::{AudioCue, AudioSink};
use crate::centered_in;
use crate::config::{GameConfig, ShapeConfig};
use crate::error::SimError;

/// Input commands for a single frame (deterministic)
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// Directional flags copied onto the player's `Input`
    pub movement: Input,
    /// Fire a bullet toward this direction
    pub fire: Option<Vec2>,
}

/// A running session: store, context and scoreboard
#[derive(Debug, Clone)]
pub struct Simulation {
    store: EntityStore,
    ctx: SimContext,
    session: Session,
    player: Option<EntityId>,
    last_frame_ms: Option<u64>,
    frame: u64,
}

impl Simulation {
    /// Validate the config and build the arena (player + walls, committed)
    pub fn new(config: GameConfig) -> Result<Self, SimError> {
        config.validate()?;
        let session = Session::new(config.player.lives, config.session_duration_ms);
        let mut sim = Self {
            store: EntityStore::new(),
            ctx: SimContext::new(config),
            session,
            player: None,
            last_frame_ms: None,
            frame: 0,
        };
        sim.build_arena()?;
        log::info!(
            "Session started: seed {}, {} walls, {} lives",
            sim.ctx.seed,
            sim.ctx.config.walls.len(),
            sim.session.lives()
        );
        Ok(sim)
    }

    fn build_arena(&mut self) -> Result<(), SimError> {
        let window = self.ctx.window;
        let player_cfg = self.ctx.config.player;

        let player = self.store.add_entity(Tag::Player);
        let shape = player_cfg.shape.to_shape();
        let pos = centered_in(window, shape.size());
        self.store.insert(player, Transform::new(pos, Vec2::ZERO))?;
        self.store.insert(player, shape)?;
        self.store.insert(player, Input::default())?;
        self.store.insert(player, Effects::new())?;
        self.player = Some(player);

        let color = self.ctx.config.wall_color;
        for wall in &self.ctx.config.walls {
            let id = self.store.add_entity(Tag::Wall);
            self.store
                .insert(id, Transform::new(Vec2::new(wall.x, wall.y), Vec2::ZERO))?;
            self.store
                .insert(id, ShapeConfig::new(wall.width, wall.height, color).to_shape())?;
        }

        self.store.commit();
        Ok(())
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut EntityStore {
        &mut self.store
    }

    pub fn context(&self) -> &SimContext {
        &self.ctx
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn player(&self) -> Option<EntityId> {
        self.player
    }

    /// Frames stepped so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn is_over(&self) -> bool {
        self.session.is_over()
    }

    /// Advance one frame at monotonic time `now_ms`. No-op once the session is over.
    pub fn step(&mut self, input: &FrameInput, now_ms: u64, audio: &mut dyn AudioSink) {
        if self.session.is_over() {
            return;
        }

        let elapsed = self
            .last_frame_ms
            .map(|last| now_ms.saturating_sub(last))
            .unwrap_or(0);
        self.last_frame_ms = Some(now_ms);
        self.ctx.now_ms = now_ms;
        self.frame += 1;

        self.apply_input(input, audio);

        move_entities(&mut self.store, &self.ctx);
        handle_entity_bounds(&mut self.store, self.ctx.window);
        handle_entity_entity_collision(&mut self.store, &mut self.ctx, &mut self.session, audio);

        self.store.commit();

        spawn_archetypes(&mut self.store, &mut self.ctx, self.player);
        sweep_lifespans(&mut self.store, now_ms);
        expire_effects(&mut self.store, now_ms);
        self.session.count_down(elapsed);

        if self.session.is_over() {
            log::info!(
                "Session over after {} frames: score {}, lives {}",
                self.frame,
                self.session.score(),
                self.session.lives()
            );
        }
    }

    fn apply_input(&mut self, input: &FrameInput, audio: &mut dyn AudioSink) {
        let Some(player) = self.player.filter(|&p| self.store.is_active(p)) else {
            log::warn!("input dropped: {}", SimError::MissingPlayer);
            return;
        };
        if let Err(err) = self.store.insert(player, input.movement) {
            log::warn!("input dropped: {err}");
        }
        if let Some(direction) = input.fire {
            match spawn_bullet(&mut self.store, &self.ctx, player, direction) {
                Ok(_) => audio.queue_sample(AudioCue::Shoot, AudioCue::Shoot.priority()),
                Err(err) => log::warn!("shot skipped: {err}"),
            }
        }
    }
}

/// Movement system: displacement = velocity × archetype speed × effect multiplier.
/// The player's velocity comes from its `Input`; walls never move.
pub fn move_entities(store: &mut EntityStore, ctx: &SimContext) {
    let ids = store.entities().to_vec();
    for id in ids {
        let Some(tag) = store.tag(id) else { continue };
        if !store.is_active(id) || tag == Tag::Wall {
            continue;
        }
        let multiplier = movement_multiplier(store.get::<Effects>(id), &ctx.config.player);
        let speed = ctx.config.speed_for(tag) * multiplier;
        let direction = if tag == Tag::Player {
            store.get::<Input>(id).map(Input::direction)
        } else {
            None
        };

        let Some(transform) = store.get_mut::<Transform>(id) else {
            log::warn!("{id} not moved: no Transform");
            continue;
        };
        if let Some(direction) = direction {
            transform.vel = direction;
        }
        transform.pos += transform.vel * speed;
    }
}

/// Destroy every live entity whose lifespan has run out
pub fn sweep_lifespans(store: &mut EntityStore, now_ms: u64) {
    let expired: Vec<EntityId> = store
        .entities()
        .iter()
        .copied()
        .filter(|&id| store.is_active(id))
        .filter(|&id| store.get::<Lifespan>(id).is_some_and(|l| l.is_expired(now_ms)))
        .collect();
    for id in expired {
        log::trace!("{id} lifespan ended");
        store.destroy(id);
    }
}
