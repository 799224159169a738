//! Audio cue boundary
//!
//! The simulation only queues cues; playback belongs to whatever sink the
//! host wires in. The core never waits on or inspects playback.

use serde::{Deserialize, Serialize};

/// Sound cue identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioCue {
    /// Bullet hits an enemy or a wall
    BulletHit,
    /// Bullet destroys a pickup
    PickupShot,
    /// Player collides with an enemy
    PlayerHurt,
    /// Player picks up a speed boost
    SpeedUp,
    /// Player picks up a slowness debuff
    SlowDown,
    /// Player collects an item
    ItemCollect,
    /// Player fires
    Shoot,
}

impl AudioCue {
    /// Default queue priority (higher wins when the mixer is saturated)
    pub fn priority(&self) -> u8 {
        match self {
            AudioCue::PlayerHurt => 10,
            AudioCue::SpeedUp | AudioCue::SlowDown | AudioCue::ItemCollect => 6,
            AudioCue::BulletHit | AudioCue::PickupShot => 4,
            AudioCue::Shoot => 1,
        }
    }
}

/// Fire-and-forget cue sink
pub trait AudioSink {
    fn queue_sample(&mut self, cue: AudioCue, priority: u8);
}

/// Discards every cue (headless runs)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn queue_sample(&mut self, _cue: AudioCue, _priority: u8) {}
}

/// Records queued cues in order so a host can drain them once per frame
#[derive(Debug, Default, Clone)]
pub struct CueQueue {
    queued: Vec<(AudioCue, u8)>,
}

impl CueQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cues queued since the last drain, oldest first
    pub fn queued(&self) -> &[(AudioCue, u8)] {
        &self.queued
    }

    /// Take all queued cues, highest priority first (stable within a priority)
    pub fn drain_by_priority(&mut self) -> Vec<(AudioCue, u8)> {
        let mut cues = std::mem::take(&mut self.queued);
        cues.sort_by(|a, b| b.1.cmp(&a.1));
        cues
    }

    pub fn count(&self, cue: AudioCue) -> usize {
        self.queued.iter().filter(|(c, _)| *c == cue).count()
    }

    pub fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }
}

impl AudioSink for CueQueue {
    fn queue_sample(&mut self, cue: AudioCue, priority: u8) {
        self.queued.push((cue, priority));
    }
}
