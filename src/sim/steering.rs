//! Per-archetype steering
//!
//! Enemies steer only after their spawn grace period. Every entity is then
//! integrated (friction, movement, arena clamp).

use std::f32::consts::PI;

use glam::Vec2;

use super::entity::{clamp_to_arena, Archetype, ArchetypeState, Entity, TailSegment};
use super::rng::GameRng;
use crate::consts::SNEK_MAX_TAIL;
use crate::{rotate, unit_or};

/// Wanderers repick their target within this distance
const WANDER_REPICK_DIST: f32 = 5.0;
/// Dodgers consider bullets within this range
const DODGE_RANGE: f32 = 200.0;
/// Orbit radius of a pink pleb around its virtual origin
const PLEB_ORBIT: f32 = 48.0;

/// A bullet as seen by dodgers
#[derive(Debug, Clone, Copy)]
pub struct BulletThreat {
    pub origin: Vec2,
    /// Unit heading
    pub heading: Vec2,
    /// Wind bullets are ignored by dodgers
    pub wind: bool,
}

/// World facts steering reads
#[derive(Debug, Clone, Copy)]
pub struct SteerContext<'a> {
    pub now_ms: f64,
    /// Entity-scaled tick length (s)
    pub dt: f32,
    pub player: Vec2,
    pub half: Vec2,
    pub arena_radius: f32,
    pub threats: &'a [BulletThreat],
}

/// Steer (if past the spawn grace) and integrate one entity
pub fn update(e: &mut Entity, ctx: &SteerContext, rng: &mut GameRng) {
    if !e.alive {
        return;
    }
    if !e.spawning {
        steer(e, ctx, rng);
    }
    match e.archetype {
        Archetype::PinkPleb => integrate_pleb(e, ctx),
        Archetype::Snek => {
            e.integrate(ctx.dt, ctx.half);
            if !e.spawning {
                update_tail(e);
            }
        }
        Archetype::BlackHole | Archetype::Essence => {}
        _ => e.integrate(ctx.dt, ctx.half),
    }
}

fn steer(e: &mut Entity, ctx: &SteerContext, rng: &mut GameRng) {
    let to_player = unit_or(ctx.player - e.origin, e.orientation);
    match e.archetype {
        Archetype::Follower | Archetype::Bubble | Archetype::Replicator | Archetype::Pink => {
            e.face(to_player);
            e.propel(to_player, ctx.dt);
        }
        Archetype::Wanderer => wander(e, ctx, rng, 60f32.to_radians()),
        Archetype::Gate => wander(e, ctx, rng, 7f32.to_radians()),
        Archetype::Dodger => {
            e.face(to_player);
            match closest_threat(e.origin, ctx.threats) {
                Some(bullet) => {
                    let away = unit_or(e.origin - bullet, -to_player);
                    e.propel(away, ctx.dt);
                }
                None => e.propel(to_player, ctx.dt),
            }
        }
        Archetype::PinkPleb => {
            let center = pleb_center(e);
            let dir = unit_or(ctx.player - center, Vec2::ZERO);
            e.propel(dir, ctx.dt);
        }
        Archetype::Snek => steer_snek(e, ctx, rng, to_player),
        Archetype::Player | Archetype::BlackHole | Archetype::Essence => {}
    }
}

/// Drift toward a random target while spinning at `spin` rad/s
fn wander(e: &mut Entity, ctx: &SteerContext, rng: &mut GameRng, spin: f32) {
    let needs_target = e
        .target
        .is_none_or(|t| t.distance(e.origin) < WANDER_REPICK_DIST);
    if needs_target {
        let t = rng.point_near(e.origin, ctx.arena_radius);
        e.target = Some(t.clamp(-ctx.half, ctx.half));
    }
    if let Some(target) = e.target {
        let dir = unit_or(target - e.origin, Vec2::ZERO);
        e.propel(dir, ctx.dt);
    }
    e.orientation = rotate(e.orientation, spin * ctx.dt);
}

/// Closest bullet on a near-miss course toward `origin`
pub fn closest_threat(origin: Vec2, threats: &[BulletThreat]) -> Option<Vec2> {
    threats
        .iter()
        .filter(|b| !b.wind)
        .filter_map(|b| {
            let offset = origin - b.origin;
            let dist = offset.length();
            if dist >= DODGE_RANGE || dist <= f32::EPSILON {
                return None;
            }
            let facing = b.heading.dot(offset / dist);
            (facing > 0.7 && facing < 0.95).then_some((dist, b.origin))
        })
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, origin)| origin)
}

fn steer_snek(e: &mut Entity, ctx: &SteerContext, rng: &mut GameRng, to_player: Vec2) {
    let alive_for = e.time_alive(ctx.now_ms);
    let t = alive_for % 2.0;
    let current_period = (alive_for / 2.0) as u32;
    let weave = if let ArchetypeState::Snek { cone, period, .. } = &mut e.state {
        if *period != current_period {
            *period = current_period;
            *cone = rng.uniform(30.0, 120.0).to_radians();
        }
        (PI * t).sin() * *cone
    } else {
        0.0
    };
    let dir = rotate(to_player, weave);
    e.face(dir);
    e.propel(dir, ctx.dt);
}

/// Grow the tail by one segment (up to the cap) and drag each segment to the
/// back point of the one ahead of it
fn update_tail(e: &mut Entity) {
    let mut lead = TailSegment {
        origin: e.origin,
        orientation: e.orientation,
        radius: e.radius,
    };
    let ArchetypeState::Snek { tail, .. } = &mut e.state else {
        return;
    };
    if tail.len() < SNEK_MAX_TAIL {
        let last = tail.last().copied().unwrap_or(lead);
        tail.push(TailSegment {
            origin: last.back(),
            orientation: last.orientation,
            radius: lead.radius * 0.75,
        });
    }
    for segment in tail.iter_mut() {
        let target = lead.back();
        let dir = unit_or(target - segment.origin, segment.orientation);
        segment.orientation = dir;
        segment.origin = target - dir * segment.radius;
        lead = *segment;
    }
}

fn pleb_center(e: &Entity) -> Vec2 {
    match e.state {
        ArchetypeState::PinkPleb { virtual_origin } => virtual_origin,
        _ => e.origin,
    }
}

/// Pink plebs move their virtual origin and orbit it
fn integrate_pleb(e: &mut Entity, ctx: &SteerContext) {
    e.apply_friction();
    let alive_for = e.time_alive(ctx.now_ms);
    let ArchetypeState::PinkPleb { virtual_origin } = &mut e.state else {
        return;
    };
    let (center, velocity) = clamp_to_arena(
        *virtual_origin + e.velocity * ctx.dt,
        e.velocity,
        ctx.half,
        e.bounce,
    );
    *virtual_origin = center;
    e.velocity = velocity;
    let orbit = pleb_orbit(alive_for);
    e.origin = (center + orbit).clamp(-ctx.half, ctx.half);
}

/// Offset of a pink pleb from its virtual origin at `time_alive` seconds
pub fn pleb_orbit(time_alive: f32) -> Vec2 {
    let t = time_alive % 2.0;
    rotate(Vec2::new(PLEB_ORBIT, 0.0), PI * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HALF: Vec2 = Vec2::new(800.0, 500.0);

    fn ctx(now_ms: f64, player: Vec2, threats: &[BulletThreat]) -> SteerContext<'_> {
        SteerContext {
            now_ms,
            dt: 0.016,
            player,
            half: HALF,
            arena_radius: 500.0,
            threats,
        }
    }

    fn awake(archetype: Archetype, origin: Vec2, rng: &mut GameRng) -> Entity {
        let mut e = Entity::spawn(archetype, origin, 0.0, rng);
        e.spawning = false;
        e
    }

    #[test]
    fn test_follower_closes_distance() {
        let mut rng = GameRng::new(1);
        let mut e = awake(Archetype::Follower, Vec2::new(400.0, 0.0), &mut rng);
        let mut last = e.origin.length();
        for i in 0..60 {
            update(&mut e, &ctx(i as f64 * 16.0, Vec2::ZERO, &[]), &mut rng);
            let d = e.origin.length();
            assert!(d <= last);
            last = d;
        }
        assert!(last < 400.0);
    }

    #[test]
    fn test_spawning_entity_does_not_steer() {
        let mut rng = GameRng::new(1);
        let mut e = Entity::spawn(Archetype::Follower, Vec2::new(400.0, 0.0), 0.0, &mut rng);
        update(&mut e, &ctx(16.0, Vec2::ZERO, &[]), &mut rng);
        assert_eq!(e.origin, Vec2::new(400.0, 0.0));
    }

    #[test]
    fn test_wanderer_spins_and_targets() {
        let mut rng = GameRng::new(2);
        let mut e = awake(Archetype::Wanderer, Vec2::ZERO, &mut rng);
        let before = e.orientation;
        update(&mut e, &ctx(0.0, Vec2::new(300.0, 0.0), &[]), &mut rng);
        let target = e.target.expect("wanderer picks a target");
        assert!(target.x.abs() <= HALF.x && target.y.abs() <= HALF.y);
        let turned = before.angle_to(e.orientation);
        assert!((turned - 60f32.to_radians() * 0.016).abs() < 1e-4);
    }

    #[test]
    fn test_dodger_threat_window() {
        let origin = Vec2::ZERO;
        // Bullet 100 units to the left, heading almost at the dodger
        let near_miss = BulletThreat {
            origin: Vec2::new(-100.0, 0.0),
            heading: rotate(Vec2::X, 30f32.to_radians()),
            wind: false,
        };
        assert!(closest_threat(origin, &[near_miss]).is_some());

        let dead_on = BulletThreat {
            heading: Vec2::X,
            ..near_miss
        };
        assert!(closest_threat(origin, &[dead_on]).is_none());

        let wind = BulletThreat {
            wind: true,
            ..near_miss
        };
        assert!(closest_threat(origin, &[wind]).is_none());

        let far = BulletThreat {
            origin: Vec2::new(-300.0, 0.0),
            ..near_miss
        };
        assert!(closest_threat(origin, &[far]).is_none());
    }

    #[test]
    fn test_dodger_evades() {
        let mut rng = GameRng::new(4);
        let mut e = awake(Archetype::Dodger, Vec2::ZERO, &mut rng);
        let threats = [BulletThreat {
            origin: Vec2::new(-100.0, 0.0),
            heading: rotate(Vec2::X, 30f32.to_radians()),
            wind: false,
        }];
        update(&mut e, &ctx(0.0, Vec2::new(-500.0, 0.0), &threats), &mut rng);
        // Player is to the left, but the bullet pushes the dodger right
        assert!(e.velocity.x > 0.0);
    }

    #[test]
    fn test_snek_tail_grows_one_per_tick() {
        let mut rng = GameRng::new(5);
        let mut e = awake(Archetype::Snek, Vec2::ZERO, &mut rng);
        for i in 0..20 {
            update(&mut e, &ctx(i as f64 * 16.0, Vec2::new(400.0, 0.0), &[]), &mut rng);
            assert_eq!(e.tail().len(), (i + 1).min(SNEK_MAX_TAIL));
        }
    }

    #[test]
    fn test_snek_tail_is_chained() {
        let mut rng = GameRng::new(6);
        let mut e = awake(Archetype::Snek, Vec2::ZERO, &mut rng);
        for i in 0..40 {
            update(&mut e, &ctx(i as f64 * 16.0, Vec2::new(400.0, 200.0), &[]), &mut rng);
        }
        let tail = e.tail();
        let first = tail[0];
        assert!((first.origin.distance(e.back()) - first.radius).abs() < 1e-2);
        for pair in tail.windows(2) {
            let d = pair[1].origin.distance(pair[0].back());
            assert!((d - pair[1].radius).abs() < 1e-2);
        }
    }

    #[test]
    fn test_pleb_orbits_virtual_origin() {
        let mut rng = GameRng::new(7);
        let mut e = awake(Archetype::PinkPleb, Vec2::ZERO, &mut rng);
        update(&mut e, &ctx(500.0, Vec2::new(300.0, 0.0), &[]), &mut rng);
        let ArchetypeState::PinkPleb { virtual_origin } = e.state else {
            panic!("pleb state");
        };
        assert!((e.origin.distance(virtual_origin) - PLEB_ORBIT).abs() < 1e-3);
        let expected = pleb_orbit(0.5);
        assert!((e.origin - virtual_origin - expected).length() < 1e-3);
    }

    #[test]
    fn test_pleb_comes_to_rest() {
        let mut rng = GameRng::new(7);
        let mut e = awake(Archetype::PinkPleb, Vec2::new(40.0, 0.0), &mut rng);
        e.velocity = Vec2::new(0.1, 0.0);
        integrate_pleb(&mut e, &ctx(500.0, Vec2::ZERO, &[]));
        assert_eq!(e.velocity, Vec2::ZERO);
        let ArchetypeState::PinkPleb { virtual_origin } = e.state else {
            panic!("pleb state");
        };
        assert_eq!(virtual_origin, Vec2::new(40.0, 0.0));
    }

    #[test]
    fn test_black_hole_is_stationary() {
        let mut rng = GameRng::new(8);
        let mut e = awake(Archetype::BlackHole, Vec2::new(10.0, 10.0), &mut rng);
        e.velocity = Vec2::new(50.0, 0.0);
        update(&mut e, &ctx(0.0, Vec2::ZERO, &[]), &mut rng);
        assert_eq!(e.origin, Vec2::new(10.0, 10.0));
    }
}
