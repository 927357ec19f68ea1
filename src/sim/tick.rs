//! Simulation tick
//!
//! Advances the game-state machine and, in phases where the world is live,
//! runs one scaled step in a fixed order: player, entity steering, bullets
//! and grid wake, black holes, particles, grid, collisions and damage,
//! age-out, pool promotion, then the director.

use glam::Vec2;

use super::autopilot;
use super::collision;
use super::combat;
use super::director;
use super::events::SoundEvent;
use super::input::{InputSnapshot, Intent, MenuCommand};
use super::state::{GameData, GameMode, GamePhase};
use super::steering::{self, BulletThreat, SteerContext};
use super::weapon::WeaponProfile;
use crate::consts::MAX_FRAME_DT;
use crate::snapshot::RenderSnapshot;

/// Scale applied to a bullet's velocity for its grid wake
const WAKE_SCALE: f32 = 0.0006;
const WAKE_RADIUS: f32 = 40.0;
/// Camera leads toward this fraction of the player position
const CAMERA_LEAD: f32 = 0.75;

/// What the host gets back from a tick
#[derive(Debug, Clone)]
pub struct TickOutput {
    pub snapshot: RenderSnapshot,
    pub sounds: Vec<SoundEvent>,
}

/// Advance the game by one host frame of `real_dt` seconds
pub fn tick(data: &mut GameData, input: &InputSnapshot, real_dt: f32) -> TickOutput {
    let intent = input.intent(data.player.origin);
    advance_phase(data, &intent);

    if data.phase.simulates() {
        step(data, input, &intent, real_dt);
    }

    TickOutput {
        snapshot: RenderSnapshot::capture(data),
        sounds: data.sounds.drain(),
    }
}

/// Apply this frame's state-machine transitions
fn advance_phase(data: &mut GameData, intent: &Intent) {
    let before = data.phase;
    match data.phase {
        GamePhase::StartScreen => {
            if intent.confirm || intent.cancel {
                data.phase = GamePhase::MainMenu;
            }
        }
        GamePhase::MainMenu => match intent.menu {
            Some(MenuCommand::SelectMode(mode)) => {
                data.pending_mode = mode;
                data.phase = GamePhase::Starting;
            }
            Some(MenuCommand::Story) => data.phase = GamePhase::StoryMode,
            Some(MenuCommand::Reset) => data.phase = GamePhase::Reset,
            Some(MenuCommand::Quit) => data.phase = GamePhase::Quitting,
            Some(MenuCommand::MainMenu) | None => {}
        },
        GamePhase::Starting => {
            data.reset_run(data.pending_mode);
            data.phase = GamePhase::Playing;
        }
        GamePhase::Playing => {
            if intent.pause {
                data.phase = GamePhase::Paused;
            }
        }
        GamePhase::Paused => {
            if intent.menu == Some(MenuCommand::MainMenu) {
                back_to_menu(data);
            } else if intent.cancel || intent.pause {
                data.phase = GamePhase::Playing;
            }
        }
        GamePhase::GameOver => {
            if intent.confirm {
                data.pending_mode = data.mode;
                data.phase = GamePhase::Starting;
            } else if intent.cancel {
                back_to_menu(data);
            }
        }
        GamePhase::StoryMode => {
            if intent.cancel {
                data.phase = GamePhase::MainMenu;
            }
        }
        GamePhase::Reset => back_to_menu(data),
        GamePhase::Quitting => {}
    }

    if data.phase == GamePhase::Quitting {
        data.running = false;
    }
    if data.phase != before {
        log::info!("Phase {} -> {}", before.as_str(), data.phase.as_str());
    }
}

fn back_to_menu(data: &mut GameData) {
    data.reset_run(GameMode::Menu);
    data.phase = GamePhase::MainMenu;
}

/// One scaled simulation step
fn step(data: &mut GameData, input: &InputSnapshot, intent: &Intent, real_dt: f32) {
    let dt = real_dt.clamp(0.0, MAX_FRAME_DT) * data.pacing.time_scale;
    if dt <= 0.0 {
        return;
    }
    data.clock.now_ms += f64::from(dt) * 1000.0;
    let edt = dt * data.pacing.entity_time_scale;

    let lead = data.player.origin * CAMERA_LEAD;
    let follow = 1.0 - (1.0f32 / 128.0).powf(dt);
    data.camera = data.camera.lerp(lead, follow);

    let intent = if data.is_autopiloted() || input.idle_mode {
        autopilot::intent(data)
    } else {
        *intent
    };
    control_player(data, &intent, dt);

    steer_entities(data, edt);
    advance_bullets(data, dt);
    combat::black_hole_pass(data, dt);
    update_particles(data, dt);
    data.grid.update();

    collision::separate(&mut data.entities, data.tuning.half_extents());
    combat::resolve_bullets(data);
    if data.phase != GamePhase::GameOver {
        combat::resolve_player_contacts(data);
    }

    age_out(data);
    data.entities.promote();
    data.bullets.promote();
    data.particles.promote();

    if data.phase != GamePhase::StoryMode && data.phase != GamePhase::GameOver {
        director::update(data);
    }

    data.pacing.entity_time_scale = combat::entity_time_scale(data);
}

/// Move, aim, fire and bomb
fn control_player(data: &mut GameData, intent: &Intent, dt: f32) {
    let half = data.half();
    let now = data.clock.now_ms;

    let player = &mut data.player;
    if intent.move_dir != Vec2::ZERO {
        player.propel(intent.move_dir, dt);
    }
    player.integrate(dt, half);
    match intent.aim {
        Some(aim) => player.face(aim),
        None => player.face(intent.move_dir),
    }

    data.weapon = WeaponProfile::resolve(&data.player.elements);

    if let Some(aim) = intent.aim {
        data.aim = aim;
        let ready = now - data.clock.last_bullet >= f64::from(data.weapon.fire_rate);
        if data.mode != GameMode::Pacifism && ready {
            let volley = data.weapon.fire(
                data.player.origin,
                aim,
                &data.player.elements,
                now,
                &mut data.rng,
            );
            for bullet in volley {
                data.bullets.spawn(bullet);
            }
            data.clock.last_bullet = now;
            data.sounds.push(SoundEvent::Shoot);
        }
    }

    if intent.bomb && data.mode != GameMode::Menu {
        combat::trigger_bomb(data);
    }
}

fn steer_entities(data: &mut GameData, edt: f32) {
    let threats: Vec<BulletThreat> = data
        .bullets
        .iter()
        .filter(|b| b.alive)
        .map(|b| BulletThreat {
            origin: b.origin,
            heading: b.orientation,
            wind: b.is_wind(),
        })
        .collect();
    let ctx = SteerContext {
        now_ms: data.clock.now_ms,
        dt: edt,
        player: data.player.origin,
        half: data.tuning.half_extents(),
        arena_radius: data.tuning.arena_radius(),
        threats: &threats,
    };
    let grace = data.tuning.spawn_grace_ms;
    for e in data.entities.iter_mut() {
        e.update_spawning(ctx.now_ms, grace);
        steering::update(e, &ctx, &mut data.rng);
    }
}

/// Move bullets and drag the grid along behind them
fn advance_bullets(data: &mut GameData, dt: f32) {
    for b in data.bullets.iter_mut().filter(|b| b.alive) {
        b.advance(dt);
        data.grid.apply_directed_force(
            (b.velocity * WAKE_SCALE).extend(0.0),
            b.origin.extend(0.0),
            WAKE_RADIUS,
        );
    }
}

fn update_particles(data: &mut GameData, dt: f32) {
    let half = data.half();
    for p in data.particles.iter_mut() {
        p.update(dt, half);
    }
}

/// Clear spent particles, expired bullets and removable entities
fn age_out(data: &mut GameData) {
    let now = data.clock.now_ms;
    let linger = data.tuning.dead_linger_ms;
    data.particles.clear_where(|p| p.life <= 0.0);
    data.bullets.clear_where(|b| b.is_expired(now));
    data.entities.clear_where(|e| e.is_removable(now, linger));
}
