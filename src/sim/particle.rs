//! Visual particles (not gameplay-affecting)

use glam::{Vec2, Vec4};

use super::pool::Pool;
use super::rng::GameRng;
use crate::color::with_alpha;
use crate::{angle_of, unit_or};

/// Per-tick velocity decay
const PARTICLE_DRAG: f32 = 0.96;

/// How a particle behaves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    /// Short hit sparks
    Spark,
    /// Enemy death debris
    Debris,
    /// Black hole spiral; ignores black hole gravity
    Spiral,
    /// Player death / bomb burst
    Burst,
}

/// A single particle
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub origin: Vec2,
    /// Heading angle (radians)
    pub orientation: f32,
    pub scale: Vec2,
    pub color: Vec4,
    /// Ticks to live
    pub duration: f32,
    /// Remaining life fraction in [0, 1]
    pub life: f32,
    /// Units per second
    pub velocity: Vec2,
    pub length_multiplier: f32,
    pub kind: ParticleKind,
}

impl Particle {
    pub fn new(origin: Vec2, velocity: Vec2, color: Vec4, duration: f32, kind: ParticleKind) -> Self {
        Self {
            origin,
            orientation: angle_of(velocity),
            scale: Vec2::ONE,
            color,
            duration: duration.max(1.0),
            life: 1.0,
            velocity,
            length_multiplier: 1.0,
            kind,
        }
    }

    /// Advance one tick. Returns false once the particle has expired.
    pub fn update(&mut self, dt: f32, half: Vec2) -> bool {
        self.origin += self.velocity * dt;

        // Bounce off the arena walls
        if self.origin.x.abs() > half.x {
            self.origin.x = self.origin.x.clamp(-half.x, half.x);
            self.velocity.x = -self.velocity.x;
        }
        if self.origin.y.abs() > half.y {
            self.origin.y = self.origin.y.clamp(-half.y, half.y);
            self.velocity.y = -self.velocity.y;
        }

        let speed = self.velocity.length();
        if speed > f32::EPSILON {
            self.orientation = angle_of(self.velocity);
        }
        let stretch = (speed / 400.0).clamp(0.2, 1.0);
        self.scale = Vec2::new(self.length_multiplier * stretch * 2.0, 1.0);

        self.velocity *= PARTICLE_DRAG;
        if self.velocity.length_squared() < 1e-4 {
            self.velocity = Vec2::ZERO;
        }

        self.life = (self.life - 1.0 / self.duration).max(0.0);
        self.life > 0.0
    }

    /// Color with the remaining life folded into alpha
    pub fn render_color(&self) -> Vec4 {
        with_alpha(self.color, self.life.min(1.0))
    }

    pub fn pull(&mut self, toward: Vec2, strength: f32) {
        let dir = unit_or(toward - self.origin, Vec2::ZERO);
        self.velocity += dir * strength;
    }
}

/// Parameters for a radial burst
#[derive(Debug, Clone, Copy)]
pub struct Burst {
    pub count: usize,
    pub color: Vec4,
    pub min_speed: f32,
    pub max_speed: f32,
    /// Ticks to live
    pub min_duration: f32,
    pub max_duration: f32,
    pub kind: ParticleKind,
}

impl Burst {
    pub fn sparks(count: usize, color: Vec4) -> Self {
        Self {
            count,
            color,
            min_speed: 100.0,
            max_speed: 400.0,
            min_duration: 15.0,
            max_duration: 30.0,
            kind: ParticleKind::Spark,
        }
    }

    pub fn debris(count: usize, color: Vec4) -> Self {
        Self {
            count,
            color,
            min_speed: 150.0,
            max_speed: 600.0,
            min_duration: 40.0,
            max_duration: 90.0,
            kind: ParticleKind::Debris,
        }
    }

    pub fn blast(count: usize, color: Vec4) -> Self {
        Self {
            count,
            color,
            min_speed: 200.0,
            max_speed: 1200.0,
            min_duration: 60.0,
            max_duration: 150.0,
            kind: ParticleKind::Burst,
        }
    }
}

/// Queue a radial burst of particles at `origin`
pub fn emit_burst(pool: &mut Pool<Particle>, rng: &mut GameRng, origin: Vec2, burst: Burst) {
    for _ in 0..burst.count {
        let speed = rng.uniform(burst.min_speed, burst.max_speed);
        let velocity = rng.direction() * speed;
        let duration = rng.uniform(burst.min_duration, burst.max_duration);
        let mut p = Particle::new(origin, velocity, burst.color, duration, burst.kind);
        p.length_multiplier = rng.uniform(0.6, 1.4);
        pool.spawn(p);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HALF: Vec2 = Vec2::new(800.0, 500.0);

    #[test]
    fn test_life_decreases_to_zero() {
        let mut p = Particle::new(Vec2::ZERO, Vec2::X * 100.0, Vec4::ONE, 10.0, ParticleKind::Spark);
        let mut last = p.life;
        let mut ticks = 0;
        while p.update(0.016, HALF) {
            assert!(p.life < last);
            last = p.life;
            ticks += 1;
        }
        assert_eq!(p.life, 0.0);
        assert!((9..=10).contains(&ticks));
    }

    #[test]
    fn test_particle_bounces_off_wall() {
        let mut p = Particle::new(
            Vec2::new(795.0, 0.0),
            Vec2::new(1000.0, 0.0),
            Vec4::ONE,
            60.0,
            ParticleKind::Debris,
        );
        p.update(0.016, HALF);
        assert_eq!(p.origin.x, 800.0);
        assert!(p.velocity.x < 0.0);
    }

    #[test]
    fn test_burst_queues_count() {
        let mut pool = Pool::with_capacity(100);
        let mut rng = GameRng::new(9);
        emit_burst(&mut pool, &mut rng, Vec2::ZERO, Burst::sparks(30, Vec4::ONE));
        assert_eq!(pool.pending_len(), 30);
        pool.promote();
        assert_eq!(pool.len(), 30);
    }

    #[test]
    fn test_render_color_fades() {
        let mut p = Particle::new(Vec2::ZERO, Vec2::ZERO, Vec4::ONE, 4.0, ParticleKind::Spark);
        p.update(0.016, HALF);
        assert!((p.render_color().w - 0.75).abs() < 1e-6);
    }
}
