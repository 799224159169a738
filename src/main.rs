//! Bounce Arena headless runner
//!
//! Plays a scripted session against the simulation core and logs a summary.
//! Usage: `bounce-arena [config.json] [frames]`

use std::f32::consts::TAU;

use bounce_arena::sim::{FrameInput, Input, Scoreboard, Simulation, Tag};
use bounce_arena::{AudioCue, CueQueue, GameConfig, SimError};

/// Simulated frame length (~60 Hz)
const FRAME_MS: u64 = 16;
const DEFAULT_FRAMES: u64 = 3_600;

fn load_config(path: Option<&str>) -> Result<GameConfig, SimError> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .map_err(|err| SimError::InvalidConfig(format!("cannot read {path}: {err}")))?;
    GameConfig::from_json_str(&json)
}

/// Scripted input: circle the arena and fire a spread every half second
fn scripted_input(frame: u64) -> FrameInput {
    let phase = (frame / 90) % 4;
    let movement = Input {
        forward: phase == 0,
        right: phase == 1,
        backward: phase == 2,
        left: phase == 3,
    };
    let fire = (frame % 30 == 0).then(|| {
        let angle = (frame as f32 * 0.37) % TAU;
        glam::Vec2::new(angle.cos(), angle.sin())
    });
    FrameInput { movement, fire }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Bounce Arena (headless) starting...");

    let args: Vec<String> = std::env::args().collect();
    let config = match load_config(args.get(1).map(String::as_str)) {
        Ok(config) => config,
        Err(err) => {
            log::error!("{err}");
            std::process::exit(1);
        }
    };
    let frames = args
        .get(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_FRAMES);

    let mut sim = match Simulation::new(config) {
        Ok(sim) => sim,
        Err(err) => {
            log::error!("{err}");
            std::process::exit(1);
        }
    };

    let mut audio = CueQueue::new();
    let mut hits = 0;
    for frame in 0..frames {
        if sim.is_over() {
            break;
        }
        sim.step(&scripted_input(frame), frame * FRAME_MS, &mut audio);
        hits += audio
            .drain_by_priority()
            .iter()
            .filter(|(cue, _)| *cue == AudioCue::BulletHit)
            .count();
    }

    let store = sim.store();
    log::info!(
        "{} frames: score {}, lives {}, {} ms left, {} bullet hits",
        sim.frame(),
        sim.session().score(),
        sim.session().lives(),
        sim.session().time_remaining_ms(),
        hits
    );
    for tag in Tag::ALL {
        let count = store.entities_with_tag(tag).len();
        if count > 0 {
            log::info!("  {:>16}: {count}", tag.as_str());
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The core is embedded by a host on the web; nothing to run here
}
