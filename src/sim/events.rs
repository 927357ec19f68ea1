//! Sound events emitted by the simulation
//!
//! The core never plays audio. It queues events during a tick and hands the
//! queue to the host in the tick output.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEvent {
    Shoot,
    EnemySpawn,
    EnemyExplode,
    PlayerDeath,
    GameOver,
    Pickup,
    BlackHoleActivate,
    BlackHoleRupture,
    GateDetonate,
    Bomb,
    ExtraLife,
    ExtraBomb,
    MultiplierUp,
    WaveStart,
}

impl SoundEvent {
    /// Stable name for hosts mapping events to sample files
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundEvent::Shoot => "shoot",
            SoundEvent::EnemySpawn => "enemy_spawn",
            SoundEvent::EnemyExplode => "enemy_explode",
            SoundEvent::PlayerDeath => "player_death",
            SoundEvent::GameOver => "game_over",
            SoundEvent::Pickup => "pickup",
            SoundEvent::BlackHoleActivate => "blackhole_activate",
            SoundEvent::BlackHoleRupture => "blackhole_rupture",
            SoundEvent::GateDetonate => "gate_detonate",
            SoundEvent::Bomb => "bomb",
            SoundEvent::ExtraLife => "extra_life",
            SoundEvent::ExtraBomb => "extra_bomb",
            SoundEvent::MultiplierUp => "multiplier_up",
            SoundEvent::WaveStart => "wave_start",
        }
    }
}

/// Events queued during the current tick
#[derive(Debug, Clone, Default)]
pub struct SoundQueue {
    events: Vec<SoundEvent>,
}

impl SoundQueue {
    pub fn push(&mut self, event: SoundEvent) {
        self.events.push(event);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn contains(&self, event: SoundEvent) -> bool {
        self.events.contains(&event)
    }

    /// Hand the queued events to the host, leaving the queue empty
    pub fn drain(&mut self) -> Vec<SoundEvent> {
        std::mem::take(&mut self.events)
    }
}
