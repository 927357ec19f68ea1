//! Damage, deaths and contact resolution
//!
//! Death effects (pink splits, gate detonations, essence drops) are queued
//! into the pending pools and only become live after the tick's promotion.

use glam::{Vec2, Vec3};

use super::collision::{entity_hits_circle, tail_hits_circle};
use super::entity::{enqueue_element, Archetype, ArchetypeState, Element, Entity};
use super::events::SoundEvent;
use super::particle::{emit_burst, Burst, Particle, ParticleKind};
use super::state::{GameData, GamePhase, GameMode};
use super::weapon::consume_wards;
use crate::color::palette;
use crate::unit_or;

/// Gate detonation reach and damage
pub const GATE_BLAST_RADIUS: f32 = 224.0;
pub const GATE_BLAST_DAMAGE: i32 = 4;
/// Minimum time between bombs (ms)
pub const BOMB_COOLDOWN_MS: f64 = 1000.0;
/// Pink plebs spawned by a dying pink
const PINK_SPLIT: usize = 3;
/// Bubbles released by a rupturing black hole
const RUPTURE_BUBBLES: usize = 5;

/// Why an entity died
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillCause {
    Bullet,
    /// Touched the player (gate, warded enemy, attract-mode AI)
    Contact,
    /// Caught in a gate detonation
    Gate,
    /// Swallowed by a black hole
    Consumed,
    Bomb,
}

impl KillCause {
    /// Kills that pay out bounty and trigger death effects
    pub fn awards(&self) -> bool {
        matches!(self, KillCause::Bullet | KillCause::Contact | KillCause::Gate)
    }
}

#[inline]
fn flat(v: Vec2) -> Vec3 {
    v.extend(0.0)
}

/// Apply damage to a live entity, running death effects if it dies.
/// Returns true if this blow killed it.
pub fn damage_entity(data: &mut GameData, idx: usize, amount: i32, cause: KillCause) -> bool {
    let now = data.clock.now_ms;
    let Some(e) = data.entities.get_mut(idx) else {
        return false;
    };
    let was_dormant = e.archetype == Archetype::BlackHole && !e.is_black_hole_active();
    let killed = e.damage(amount, now);
    if was_dormant && e.is_black_hole_active() {
        data.sounds.push(SoundEvent::BlackHoleActivate);
    }
    if killed {
        on_death(data, idx, cause);
    }
    killed
}

/// Kill a live entity outright
pub fn destroy_entity(data: &mut GameData, idx: usize, cause: KillCause) {
    let now = data.clock.now_ms;
    let Some(e) = data.entities.get_mut(idx) else {
        return;
    };
    if !e.alive {
        return;
    }
    e.kill(now);
    on_death(data, idx, cause);
}

fn on_death(data: &mut GameData, idx: usize, cause: KillCause) {
    let Some(e) = data.entities.get(idx) else {
        return;
    };
    let (archetype, origin, bounty, color) = (e.archetype, e.origin, e.bounty, e.color);
    if archetype == Archetype::Essence || !cause.awards() {
        return;
    }

    data.award(bounty);
    data.kills += 1;
    emit_burst(&mut data.particles, &mut data.rng, origin, Burst::debris(40, color));
    data.grid.apply_explosive_force(20.0, flat(origin), 80.0);
    data.sounds.push(SoundEvent::EnemyExplode);

    match archetype {
        Archetype::Pink => split_pink(data, origin),
        Archetype::Gate => detonate_gate(data, idx, origin),
        _ => {}
    }

    if data.rng.chance(data.tuning.essence_drop_chance) {
        let element = Element::random(&mut data.rng);
        let essence = Entity::essence(
            origin,
            element,
            data.clock.now_ms,
            data.tuning.essence_lifetime_ms,
        );
        data.entities.spawn(essence);
    }
}

/// Three plebs around the dead pink, never on top of the player
fn split_pink(data: &mut GameData, origin: Vec2) {
    let half = data.half();
    let now = data.clock.now_ms;
    let keep_out = data.player.radius + 12.0;
    for _ in 0..PINK_SPLIT {
        let mut at = origin;
        for _ in 0..8 {
            at = data.rng.point_near(origin, 60.0).clamp(-half, half);
            if at.distance(data.player.origin) > keep_out {
                break;
            }
        }
        let pleb = Entity::spawn(Archetype::PinkPleb, at, now, &mut data.rng);
        data.entities.spawn(pleb);
    }
}

/// Blast every other live entity within reach. Gates killed by the blast
/// detonate in turn.
fn detonate_gate(data: &mut GameData, gate: usize, origin: Vec2) {
    data.grid.apply_explosive_force(90.0, flat(origin), GATE_BLAST_RADIUS);
    emit_burst(
        &mut data.particles,
        &mut data.rng,
        origin,
        Burst::blast(120, palette::GATE),
    );
    data.sounds.push(SoundEvent::GateDetonate);

    for idx in data.entities.indices() {
        if idx == gate {
            continue;
        }
        let in_reach = data.entities.get(idx).is_some_and(|e| {
            e.alive && e.archetype.is_enemy() && e.origin.distance(origin) < GATE_BLAST_RADIUS
        });
        if in_reach {
            damage_entity(data, idx, GATE_BLAST_DAMAGE, KillCause::Gate);
        }
    }
}

/// An overfed black hole bursts into bubbles
pub fn rupture_black_hole(data: &mut GameData, idx: usize) {
    let now = data.clock.now_ms;
    let Some(hole) = data.entities.get_mut(idx) else {
        return;
    };
    if !hole.alive {
        return;
    }
    hole.kill(now);
    let origin = hole.origin;

    data.grid.apply_explosive_force(200.0, flat(origin), 400.0);
    emit_burst(
        &mut data.particles,
        &mut data.rng,
        origin,
        Burst::blast(300, palette::BLACK_HOLE),
    );
    let half = data.half();
    for _ in 0..RUPTURE_BUBBLES {
        let at = data.rng.point_near(origin, 40.0).clamp(-half, half);
        let bubble = Entity::spawn(Archetype::Bubble, at, now, &mut data.rng);
        data.entities.spawn(bubble);
    }
    data.sounds.push(SoundEvent::BlackHoleRupture);
    log::debug!("Black hole ruptured at ({:.0}, {:.0})", origin.x, origin.y);
}

/// Lose a life: the arena is wiped and the director pauses
pub fn kill_player(data: &mut GameData) {
    let now = data.clock.now_ms;
    let origin = data.player.origin;

    data.lives = data.lives.saturating_sub(1);
    data.entities.clear();
    data.bullets.clear();
    data.waves.clear();
    emit_burst(
        &mut data.particles,
        &mut data.rng,
        origin,
        Burst::blast(1200, data.player.color),
    );
    data.grid.apply_explosive_force(200.0, flat(origin), 600.0);
    data.sounds.push(SoundEvent::PlayerDeath);

    data.multiplier = 1;
    data.rewards.next_multiplier = data.tuning.multiplier_reward;
    data.clock.director_resume = now + data.tuning.respawn_pause_ms;
    data.player.velocity = Vec2::ZERO;
    data.player.elements.clear();

    if data.lives == 0 {
        data.phase = GamePhase::GameOver;
        data.high_score = data.high_score.max(data.score);
        data.sounds.push(SoundEvent::GameOver);
        log::info!("Game over: score={} kills={}", data.score, data.kills);
    } else {
        log::info!("Player died, {} lives left", data.lives);
    }
}

/// Detonate a bomb if one is available and off cooldown.
/// Returns true if a bomb went off.
pub fn trigger_bomb(data: &mut GameData) -> bool {
    let now = data.clock.now_ms;
    if data.bombs == 0 || now - data.clock.last_bomb < BOMB_COOLDOWN_MS {
        return false;
    }
    data.bombs -= 1;
    data.clock.last_bomb = now;

    for idx in data.entities.indices() {
        destroy_entity(data, idx, KillCause::Bomb);
    }
    let origin = data.player.origin;
    data.grid.apply_explosive_force(150.0, flat(origin), 600.0);
    emit_burst(
        &mut data.particles,
        &mut data.rng,
        origin,
        Burst::blast(600, palette::LIGHT_BLUE),
    );
    data.sounds.push(SoundEvent::Bomb);
    true
}

/// Bullets against the world edge and every solid enemy
pub fn resolve_bullets(data: &mut GameData) {
    let now = data.clock.now_ms;
    let half = data.half();

    for bi in data.bullets.indices() {
        let Some(bullet) = data.bullets.get_mut(bi) else {
            continue;
        };
        if !bullet.alive {
            continue;
        }
        if bullet.is_outside(half) {
            bullet.kill(now);
            let at = bullet.origin.clamp(-half, half);
            emit_burst(
                &mut data.particles,
                &mut data.rng,
                at,
                Burst::sparks(30, palette::BULLET),
            );
            continue;
        }
        let (origin, reach) = (bullet.origin, bullet.collision_radius());

        for ei in data.entities.indices() {
            let Some(enemy) = data.entities.get_mut(ei) else {
                continue;
            };
            if !enemy.is_solid() || !enemy.archetype.is_enemy() {
                continue;
            }
            let Some(bullet) = data.bullets.get_mut(bi) else {
                break;
            };

            if tail_hits_circle(enemy, origin, reach) {
                bullet.kill(now);
                emit_burst(
                    &mut data.particles,
                    &mut data.rng,
                    origin,
                    Burst::sparks(8, enemy.color),
                );
                break;
            }
            if !entity_hits_circle(enemy, origin, reach) {
                continue;
            }

            if consume_wards(&mut bullet.elements, &mut enemy.elements) > 0 {
                bullet.kill(now);
                emit_burst(
                    &mut data.particles,
                    &mut data.rng,
                    origin,
                    Burst::sparks(12, enemy.color),
                );
                break;
            }

            let damage = bullet.hp;
            bullet.hp -= enemy.hp.max(1);
            let spent = bullet.hp <= 0;
            if spent {
                bullet.kill(now);
            }
            damage_entity(data, ei, damage, KillCause::Bullet);
            if spent {
                break;
            }
        }
    }
}

/// Contacts between the player ship and solid entities
pub fn resolve_player_contacts(data: &mut GameData) {
    let now = data.clock.now_ms;
    let (origin, radius) = (data.player.origin, data.player.radius);

    for idx in data.entities.indices() {
        let Some(e) = data.entities.get_mut(idx) else {
            continue;
        };
        if !e.is_solid() {
            continue;
        }
        let touching = entity_hits_circle(e, origin, radius) || tail_hits_circle(e, origin, radius);
        if !touching {
            continue;
        }

        let archetype = e.archetype;
        match archetype {
            Archetype::Essence => {
                if let Some(&element) = e.elements.first() {
                    enqueue_element(&mut data.player.elements, element);
                }
                e.kill(now);
                data.sounds.push(SoundEvent::Pickup);
            }
            Archetype::Gate => destroy_entity(data, idx, KillCause::Contact),
            _ => {
                let warded = consume_wards(&mut data.player.elements, &mut e.elements) > 0;
                if warded || data.mode == GameMode::Menu {
                    destroy_entity(data, idx, KillCause::Contact);
                } else if !data.tuning.debug {
                    kill_player(data);
                    return;
                }
            }
        }
    }
}

/// Black hole gravity on the grid, player, bullets, particles and entities
pub fn black_hole_pass(data: &mut GameData, dt: f32) {
    const SPIRAL_STEP: f32 = std::f32::consts::PI / 25.0;
    const PLAYER_REACH: f32 = 300.0;
    const PULL_REACH: f32 = 250.0;
    const CONSUME_MARGIN: f32 = 8.0;
    const RUPTURE_HP: i32 = 15;

    let holes: Vec<usize> = data
        .entities
        .indexed()
        .filter(|(_, e)| e.alive && e.is_black_hole_active())
        .map(|(i, _)| i)
        .collect();

    for hi in holes {
        let Some(hole) = data.entities.get_mut(hi) else {
            continue;
        };
        if !hole.alive {
            continue;
        }
        let (origin, hole_radius) = (hole.origin, hole.radius);
        let angle = match &mut hole.state {
            ArchetypeState::BlackHole { emit_angle, .. } => {
                let a = *emit_angle;
                *emit_angle -= SPIRAL_STEP;
                a
            }
            _ => 0.0,
        };

        // Spiral emission
        let dir = crate::from_angle(angle);
        let color = crate::color::hsv_to_rgb((angle.to_degrees()).rem_euclid(360.0), 0.5, 1.0);
        let mut spiral = Particle::new(
            origin + dir * hole_radius,
            dir * 300.0,
            color,
            90.0,
            ParticleKind::Spiral,
        );
        spiral.length_multiplier = 1.5;
        data.particles.spawn(spiral);

        data.grid
            .apply_implosive_force((angle * 0.5).sin() * 10.0 + 20.0, flat(origin), 200.0);

        // Player
        let to_hole = origin - data.player.origin;
        let d = to_hole.length();
        if d < PLAYER_REACH {
            let pull = unit_or(to_hole, Vec2::ZERO) * 1500.0 * (1.0 - d / PLAYER_REACH) * dt;
            data.player.velocity += pull;
        }

        // Bullets curl around the hole
        for b in data.bullets.iter_mut().filter(|b| b.alive) {
            let offset = origin - b.origin;
            let d = offset.length();
            if d < PULL_REACH {
                b.curl(unit_or(offset, Vec2::ZERO), 0.1 * (1.0 - d / PULL_REACH));
            }
        }

        for p in data.particles.iter_mut() {
            if p.kind != ParticleKind::Spiral && p.origin.distance(origin) < PULL_REACH {
                let d = p.origin.distance(origin);
                p.pull(origin, 40.0 * (1.0 - d / PULL_REACH));
            }
        }

        // Pull and consume other entities
        let mut fed = false;
        for ei in data.entities.indices() {
            if ei == hi {
                continue;
            }
            let swallowed = {
                let Some((hole, e)) = data.entities.pair_mut(hi, ei) else {
                    continue;
                };
                if !e.alive || matches!(e.archetype, Archetype::BlackHole | Archetype::Essence) {
                    continue;
                }
                let offset = origin - e.origin;
                let d = offset.length();
                if d < hole.radius + CONSUME_MARGIN + e.radius {
                    hole.hp += e.hp.max(0);
                    hole.bounty += e.bounty;
                    true
                } else {
                    if d < PULL_REACH {
                        e.velocity += unit_or(offset, Vec2::ZERO) * 600.0 * (1.0 - d / PULL_REACH) * dt;
                    }
                    false
                }
            };
            if swallowed {
                destroy_entity(data, ei, KillCause::Consumed);
                fed = true;
            }
        }

        if fed && data.entities.get(hi).is_some_and(|h| h.hp > RUPTURE_HP) {
            rupture_black_hole(data, hi);
        }
    }
}

/// Closest active black hole or bubble to the player slows entities down
pub fn entity_time_scale(data: &GameData) -> f32 {
    let player = data.player.origin;
    data.entities
        .iter()
        .filter(|e| {
            e.alive && (e.is_black_hole_active() || e.archetype == Archetype::Bubble)
        })
        .map(|e| e.origin.distance(player))
        .min_by(|a, b| a.total_cmp(b))
        .map_or(1.0, |d| (d.min(256.0) / 256.0).max(0.1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::bullet::Bullet;
    use crate::sim::weapon::WeaponProfile;
    use crate::tuning::Tuning;

    fn sandbox() -> GameData {
        let mut data = GameData::new(7, Tuning::default());
        data.reset_run(GameMode::Sandbox);
        data.phase = GamePhase::Playing;
        data.clock.now_ms = 10_000.0;
        data
    }

    fn place(data: &mut GameData, archetype: Archetype, at: Vec2) -> usize {
        let mut e = Entity::spawn(archetype, at, 0.0, &mut data.rng);
        e.spawning = false;
        data.entities.spawn(e);
        data.entities.promote();
        data.entities
            .indexed()
            .filter(|(_, e)| e.origin == at && e.archetype == archetype)
            .map(|(i, _)| i)
            .last()
            .unwrap_or(usize::MAX)
    }

    fn shoot(data: &mut GameData, at: Vec2, elements: &[Element]) {
        let b = Bullet::new(at, 0.0, &WeaponProfile::default(), elements, data.clock.now_ms);
        data.bullets.spawn(b);
        data.bullets.promote();
    }

    #[test]
    fn test_bullet_kills_follower_and_awards() {
        let mut data = sandbox();
        data.multiplier = 2;
        let idx = place(&mut data, Archetype::Follower, Vec2::new(100.0, 0.0));
        shoot(&mut data, Vec2::new(95.0, 0.0), &[]);
        resolve_bullets(&mut data);
        assert!(!data.entities.get(idx).is_some_and(|e| e.alive));
        assert_eq!(data.score, 100);
        assert_eq!(data.kills, 1);
        assert!(data.bullets.iter().all(|b| !b.alive));
        assert!(data.sounds.contains(SoundEvent::EnemyExplode));
    }

    #[test]
    fn test_ward_spends_bullet_without_damage() {
        let mut data = sandbox();
        let idx = place(&mut data, Archetype::Follower, Vec2::new(100.0, 0.0));
        if let Some(e) = data.entities.get_mut(idx) {
            e.elements = vec![Element::Fire];
        }
        shoot(&mut data, Vec2::new(95.0, 0.0), &[Element::Fire]);
        resolve_bullets(&mut data);
        let e = data.entities.get(idx).cloned().unwrap_or_else(|| panic!("slot emptied"));
        assert!(e.alive);
        assert!(e.elements.is_empty());
        assert_eq!(data.score, 0);
        assert!(data.bullets.iter().all(|b| !b.alive));
    }

    #[test]
    fn test_bullet_leaving_world_sparks() {
        let mut data = sandbox();
        shoot(&mut data, Vec2::new(900.0, 0.0), &[]);
        resolve_bullets(&mut data);
        assert!(data.bullets.iter().all(|b| !b.alive));
        assert_eq!(data.particles.pending_len(), 30);
    }

    #[test]
    fn test_gate_detonation_damages_neighbours() {
        let mut data = sandbox();
        let gate = place(&mut data, Archetype::Gate, Vec2::new(30.0, 0.0));
        let hole = place(&mut data, Archetype::BlackHole, Vec2::new(150.0, 0.0));
        let far = place(&mut data, Archetype::BlackHole, Vec2::new(600.0, 0.0));
        if let Some(g) = data.entities.get_mut(gate) {
            g.orientation = Vec2::X;
        }
        resolve_player_contacts(&mut data);
        assert!(!data.entities.get(gate).is_some_and(|e| e.alive));
        assert_eq!(data.entities.get(hole).map(|e| e.hp), Some(6));
        assert_eq!(data.entities.get(far).map(|e| e.hp), Some(10));
        assert_eq!(data.lives, 3);
        assert!(data.sounds.contains(SoundEvent::GateDetonate));
    }

    #[test]
    fn test_contact_kills_player_and_wipes_arena() {
        let mut data = sandbox();
        place(&mut data, Archetype::Follower, Vec2::new(10.0, 0.0));
        place(&mut data, Archetype::Wanderer, Vec2::new(400.0, 0.0));
        data.multiplier = 4;
        resolve_player_contacts(&mut data);
        assert_eq!(data.lives, 2);
        assert!(data.entities.is_empty());
        assert_eq!(data.multiplier, 1);
        assert_eq!(data.particles.pending_len(), 1200);
        assert!(data.clock.director_resume > data.clock.now_ms);
        assert_eq!(data.phase, GamePhase::Playing);
    }

    #[test]
    fn test_last_life_ends_game() {
        let mut data = sandbox();
        data.lives = 1;
        data.score = 500;
        data.high_score = 100;
        kill_player(&mut data);
        assert_eq!(data.phase, GamePhase::GameOver);
        assert_eq!(data.high_score, 500);
        assert!(data.sounds.contains(SoundEvent::GameOver));
    }

    #[test]
    fn test_debug_player_is_invulnerable() {
        let mut data = sandbox();
        data.tuning.debug = true;
        place(&mut data, Archetype::Follower, Vec2::new(10.0, 0.0));
        resolve_player_contacts(&mut data);
        assert_eq!(data.lives, 3);
        assert_eq!(data.entities.len(), 1);
    }

    #[test]
    fn test_menu_ai_destroys_what_it_touches() {
        let mut data = sandbox();
        data.mode = GameMode::Menu;
        let idx = place(&mut data, Archetype::Follower, Vec2::new(10.0, 0.0));
        resolve_player_contacts(&mut data);
        assert_eq!(data.lives, 3);
        assert!(!data.entities.get(idx).is_some_and(|e| e.alive));
    }

    #[test]
    fn test_essence_pickup() {
        let mut data = sandbox();
        data.player.elements = vec![Element::Wind, Element::Water];
        let essence = Entity::essence(Vec2::new(5.0, 0.0), Element::Chaos, data.clock.now_ms, 1000.0);
        data.entities.spawn(essence);
        data.entities.promote();
        resolve_player_contacts(&mut data);
        assert_eq!(data.player.elements, vec![Element::Water, Element::Chaos]);
        assert!(data.sounds.contains(SoundEvent::Pickup));
        assert_eq!(data.score, 0);
    }

    #[test]
    fn test_warded_contact_kills_enemy() {
        let mut data = sandbox();
        data.player.elements = vec![Element::Spirit];
        let idx = place(&mut data, Archetype::Follower, Vec2::new(10.0, 0.0));
        if let Some(e) = data.entities.get_mut(idx) {
            e.elements = vec![Element::Spirit];
        }
        resolve_player_contacts(&mut data);
        assert_eq!(data.lives, 3);
        assert!(data.player.elements.is_empty());
        assert!(!data.entities.get(idx).is_some_and(|e| e.alive));
    }

    #[test]
    fn test_pink_splits() {
        let mut data = sandbox();
        let idx = place(&mut data, Archetype::Pink, Vec2::new(300.0, 0.0));
        destroy_entity(&mut data, idx, KillCause::Bullet);
        let plebs = data
            .entities
            .pending()
            .iter()
            .filter(|e| e.archetype == Archetype::PinkPleb)
            .count();
        assert_eq!(plebs, 3);
    }

    #[test]
    fn test_bomb_clears_without_bounty() {
        let mut data = sandbox();
        place(&mut data, Archetype::Follower, Vec2::new(300.0, 0.0));
        place(&mut data, Archetype::Pink, Vec2::new(-300.0, 0.0));
        assert!(trigger_bomb(&mut data));
        assert!(data.entities.iter().all(|e| !e.alive));
        assert_eq!(data.entities.pending_len(), 0);
        assert_eq!(data.score, 0);
        assert_eq!(data.bombs, 2);
        // Cooldown
        assert!(!trigger_bomb(&mut data));
    }

    #[test]
    fn test_black_hole_consumes_and_ruptures() {
        let mut data = sandbox();
        let hole = place(&mut data, Archetype::BlackHole, Vec2::new(300.0, 0.0));
        if let Some(h) = data.entities.get_mut(hole) {
            h.damage(1, 0.0);
            h.hp = 15;
        }
        place(&mut data, Archetype::Follower, Vec2::new(320.0, 0.0));
        black_hole_pass(&mut data, 0.016);
        assert!(!data.entities.get(hole).is_some_and(|e| e.alive));
        let bubbles = data
            .entities
            .pending()
            .iter()
            .filter(|e| e.archetype == Archetype::Bubble)
            .count();
        assert_eq!(bubbles, 5);
        assert!(data.sounds.contains(SoundEvent::BlackHoleRupture));
    }

    #[test]
    fn test_time_scale_near_bubble() {
        let mut data = sandbox();
        assert_eq!(entity_time_scale(&data), 1.0);
        place(&mut data, Archetype::Bubble, Vec2::new(128.0, 0.0));
        assert!((entity_time_scale(&data) - 0.5).abs() < 1e-6);
        place(&mut data, Archetype::Bubble, Vec2::new(1.0, 0.0));
        assert!((entity_time_scale(&data) - 0.1).abs() < 1e-6);
    }
}
