//! Spawn director
//!
//! Decides what enters the arena and when. Evolved (and attract) mode mixes
//! an ambient spawner with scripted landing parties at each wave start;
//! pacifism mode sends follower swarms and gates. Rewards for score and
//! kills are granted here too.

use std::f32::consts::TAU;

use glam::Vec2;

use super::entity::{Archetype, Element, Entity};
use super::events::SoundEvent;
use super::state::{GameData, GameMode};
use crate::color::hsv_to_rgb;
use crate::error::{ArenaError, ArenaResult};
use crate::from_angle;

/// Ambient spawns never land closer than this to the player
const MIN_SPAWN_DISTANCE: f32 = 450.0;
/// Pacifism gates keep this far from the player
const GATE_SPAWN_DISTANCE: f32 = 200.0;
const SPAWN_ATTEMPTS: usize = 32;
/// Corner spawn points are inset from the arena edge
const CORNER_INSET: f32 = 60.0;
/// Scatter around a corner spawn point
const CORNER_SCATTER: f32 = 40.0;

/// A continuous wave spawning at the four corners
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveData {
    pub archetype: Archetype,
    /// Seconds between corner spawns
    pub spawn_freq: f32,
    /// Seconds the wave lasts
    pub duration: f32,
    pub started_ms: f64,
    pub last_spawn_ms: f64,
}

/// Scripted set-piece chosen at a wave start
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LandingParty {
    /// `per_corner` units at each arena corner
    Corners { archetype: Archetype, per_corner: usize },
    /// `count` units on a circle of `radius` around the player
    Circle {
        archetype: Archetype,
        count: usize,
        radius: f32,
        /// Skip the spawn grace
        immediate: bool,
    },
    Continuous {
        archetype: Archetype,
        spawn_freq: f32,
        duration: f32,
    },
    BlackHoles { count: usize },
}

/// Map an ambient roll to an archetype
pub fn roll_ambient(r: f32) -> Archetype {
    if r <= 0.1 {
        Archetype::Wanderer
    } else if r <= 0.4 {
        Archetype::Follower
    } else if r <= 0.43 {
        Archetype::Pink
    } else if r <= 0.49 {
        Archetype::Dodger
    } else if r <= 0.5 {
        Archetype::BlackHole
    } else {
        Archetype::Snek
    }
}

/// Map a wave roll in `[0, 0.8 + notoriety)` to a landing party
pub fn select_landing_party(roll: f32) -> LandingParty {
    use Archetype::*;
    match roll {
        r if r < 0.15 => LandingParty::Corners {
            archetype: Follower,
            per_corner: 4,
        },
        r if r < 0.30 => LandingParty::Corners {
            archetype: Wanderer,
            per_corner: 3,
        },
        r if r < 0.42 => LandingParty::Circle {
            archetype: Follower,
            count: 12,
            radius: 350.0,
            immediate: true,
        },
        r if r < 0.52 => LandingParty::Continuous {
            archetype: Follower,
            spawn_freq: 0.4,
            duration: 8.0,
        },
        r if r < 0.62 => LandingParty::Circle {
            archetype: Dodger,
            count: 8,
            radius: 400.0,
            immediate: false,
        },
        r if r < 0.72 => LandingParty::Corners {
            archetype: Pink,
            per_corner: 1,
        },
        r if r < 0.80 => LandingParty::Continuous {
            archetype: Wanderer,
            spawn_freq: 0.6,
            duration: 6.0,
        },
        r if r < 0.95 => LandingParty::Circle {
            archetype: Snek,
            count: 4,
            radius: 450.0,
            immediate: false,
        },
        r if r < 1.10 => LandingParty::BlackHoles { count: 2 },
        _ => LandingParty::Continuous {
            archetype: Dodger,
            spawn_freq: 0.5,
            duration: 10.0,
        },
    }
}

/// The director may only place hostile archetypes
pub fn check_spawnable(archetype: Archetype) -> ArenaResult<()> {
    if archetype.is_enemy() {
        Ok(())
    } else {
        Err(ArenaError::RuntimeInvariant {
            context: format!("director asked to spawn {}", archetype.as_str()),
        })
    }
}

/// The four spawn corners, inset from the edges
pub fn corners(half: Vec2) -> [Vec2; 4] {
    let c = half - Vec2::splat(CORNER_INSET);
    [
        Vec2::new(-c.x, -c.y),
        Vec2::new(c.x, -c.y),
        Vec2::new(-c.x, c.y),
        Vec2::new(c.x, c.y),
    ]
}

/// Queue an enemy. Elemental enemies appear as notoriety grows.
pub fn spawn_enemy(data: &mut GameData, archetype: Archetype, at: Vec2) -> bool {
    if let Err(err) = check_spawnable(archetype) {
        debug_assert!(false, "{err}");
        log::error!("{err}");
        return false;
    }
    let at = at.clamp(-data.half(), data.half());
    let mut e = Entity::spawn(archetype, at, data.clock.now_ms, &mut data.rng);
    let elemental = (data.pacing.notoriety * 0.25).min(0.5);
    if data.mode != GameMode::Pacifism && data.rng.chance(elemental) {
        let element = Element::random(&mut data.rng);
        e.elements.push(element);
        e.color = hsv_to_rgb(element.hue(), 0.8, 1.0);
    }
    data.entities.spawn(e);
    true
}

/// Random point at least `min_distance` from the player
fn far_point(data: &mut GameData, min_distance: f32) -> Vec2 {
    let half = data.half();
    let player = data.player.origin;
    let mut at = data.rng.point_in(half);
    for _ in 1..SPAWN_ATTEMPTS {
        if at.distance(player) >= min_distance {
            break;
        }
        at = data.rng.point_in(half);
    }
    at
}

/// Run the director for one tick
pub fn update(data: &mut GameData) {
    if data.clock.now_ms < data.clock.director_resume {
        return;
    }
    data.pacing.notoriety = data.kills as f32 / 100.0;

    match data.mode {
        GameMode::Evolved | GameMode::Menu => {
            ambient(data);
            waves(data);
        }
        GameMode::Pacifism => pacifism(data),
        GameMode::Sandbox => {}
    }
    update_continuous(data);

    if data.mode != GameMode::Menu {
        grant_rewards(data);
    }
}

fn ambient(data: &mut GameData) {
    let p = data.pacing;
    if !p.spawning || data.clock.since(data.clock.last_spawn) < p.ambient_spawn_freq * p.time_scale {
        return;
    }
    for _ in 0..p.spawn_count {
        let roll = data.rng.uniform(0.0, 0.2 + p.notoriety.min(0.31));
        let at = far_point(data, MIN_SPAWN_DISTANCE);
        spawn_enemy(data, roll_ambient(roll), at);
    }
    data.clock.last_spawn = data.clock.now_ms;
    data.pacing.spawns += 1;
    data.pacing.spawn_count = (data.pacing.spawns / 50).clamp(1, 4);
    data.sounds.push(SoundEvent::EnemySpawn);
}

fn waves(data: &mut GameData) {
    let p = data.pacing;
    let clear = data.waves.is_empty()
        && data.enemy_count() == 0
        && data.entities.pending().iter().all(|e| !e.archetype.is_enemy());
    let due = data.clock.since(data.clock.last_wave) >= p.wave_freq * p.time_scale;
    if !clear && !due {
        return;
    }

    data.pacing.ambient_spawn_freq = (3.0 - (p.spawns / 30) as f32 * 0.5).max(1.0);
    data.pacing.wave_freq = (20.0 - 3.0 * p.notoriety).max(5.0);
    if !p.spawning && data.rng.chance(0.1) {
        data.pacing.spawning = true;
    }

    let roll = data.rng.uniform(0.0, 0.8 + p.notoriety);
    let party = select_landing_party(roll);
    log::debug!("Landing party {party:?} (roll {roll:.2})");
    launch(data, party);

    data.clock.last_wave = data.clock.now_ms;
    data.sounds.push(SoundEvent::WaveStart);
    log::info!(
        "Wave start: notoriety={:.2} wave_freq={:.1}s ambient_freq={:.1}s",
        data.pacing.notoriety,
        data.pacing.wave_freq,
        data.pacing.ambient_spawn_freq
    );
}

/// Place a landing party
pub fn launch(data: &mut GameData, party: LandingParty) {
    let half = data.half();
    match party {
        LandingParty::Corners {
            archetype,
            per_corner,
        } => {
            for corner in corners(half) {
                for _ in 0..per_corner {
                    let at = data.rng.point_near(corner, CORNER_SCATTER);
                    spawn_enemy(data, archetype, at);
                }
            }
        }
        LandingParty::Circle {
            archetype,
            count,
            radius,
            immediate,
        } => {
            let center = data.player.origin;
            let grace = data.tuning.spawn_grace_ms;
            for i in 0..count {
                let at = center + from_angle(i as f32 * TAU / count as f32) * radius;
                if spawn_enemy(data, archetype, at) && immediate {
                    skip_grace(data, grace);
                }
            }
        }
        LandingParty::Continuous {
            archetype,
            spawn_freq,
            duration,
        } => {
            let now = data.clock.now_ms;
            data.waves.push(WaveData {
                archetype,
                spawn_freq,
                duration,
                started_ms: now,
                last_spawn_ms: now,
            });
            // The set piece replaces the ambient spawner while it runs
            data.pacing.spawning = false;
        }
        LandingParty::BlackHoles { count } => {
            for _ in 0..count {
                let at = far_point(data, MIN_SPAWN_DISTANCE);
                spawn_enemy(data, Archetype::BlackHole, at);
            }
        }
    }
}

/// Backdate the most recently queued spawn so it acts immediately
fn skip_grace(data: &mut GameData, grace_ms: f64) {
    let now = data.clock.now_ms;
    if let Some(e) = data.entities.pending_last_mut() {
        e.born_ms = now - grace_ms;
        e.spawning = false;
    }
}

/// Continuous waves spawn at the corners until they expire
fn update_continuous(data: &mut GameData) {
    let now = data.clock.now_ms;
    let half = data.half();
    let before = data.waves.len();
    data.waves
        .retain(|w| ((now - w.started_ms) / 1000.0) as f32 <= w.duration);
    if data.waves.len() < before && data.waves.is_empty() {
        data.pacing.spawning = true;
    }

    let mut due = Vec::new();
    for wave in &mut data.waves {
        if ((now - wave.last_spawn_ms) / 1000.0) as f32 >= wave.spawn_freq {
            wave.last_spawn_ms = now;
            due.push(wave.archetype);
        }
    }
    for archetype in due {
        for corner in corners(half) {
            spawn_enemy(data, archetype, corner);
        }
    }
}

fn pacifism(data: &mut GameData) {
    let p = data.pacing;
    if data.clock.since(data.clock.last_spawn) < p.ambient_spawn_freq * p.time_scale {
        return;
    }
    let spots = corners(data.half());
    let corner = data.rng.pick(&spots).copied().unwrap_or(Vec2::ZERO);
    for _ in 0..p.spawn_count {
        let at = data.rng.point_near(corner, CORNER_SCATTER * 2.0);
        spawn_enemy(data, Archetype::Follower, at);
    }
    for _ in 0..(1 + p.spawn_count / 8) {
        let at = far_point(data, GATE_SPAWN_DISTANCE);
        spawn_enemy(data, Archetype::Gate, at);
    }

    data.clock.last_spawn = data.clock.now_ms;
    data.pacing.spawns += 1;
    let spawns = data.pacing.spawns;
    data.pacing.spawn_count = (4 + spawns / 10).min(40);
    data.pacing.ambient_spawn_freq = (4.0 - 0.25 * (spawns / 20) as f32).max(1.0);
    data.sounds.push(SoundEvent::EnemySpawn);
}

/// Extra lives, bombs and multiplier steps. Thresholds double additively.
pub fn grant_rewards(data: &mut GameData) {
    if data.score >= data.rewards.next_life {
        data.lives += 1;
        data.rewards.next_life += data.rewards.next_life;
        data.sounds.push(SoundEvent::ExtraLife);
        log::info!("Extra life, next at {}", data.rewards.next_life);
    }
    if data.score >= data.rewards.next_bomb {
        data.bombs += 1;
        data.rewards.next_bomb += data.rewards.next_bomb;
        data.sounds.push(SoundEvent::ExtraBomb);
        log::info!("Extra bomb, next at {}", data.rewards.next_bomb);
    }
    if data.kills >= data.rewards.next_multiplier {
        data.rewards.next_multiplier += data.rewards.next_multiplier;
        if data.multiplier < data.tuning.max_multiplier {
            data.multiplier += 1;
            data.sounds.push(SoundEvent::MultiplierUp);
        }
    }
}
