//! Player projectiles

use glam::Vec2;

use super::entity::Element;
use super::weapon::WeaponProfile;
use crate::from_angle;

/// A projectile with constant velocity
#[derive(Debug, Clone, PartialEq)]
pub struct Bullet {
    pub origin: Vec2,
    pub velocity: Vec2,
    /// Unit heading
    pub orientation: Vec2,
    pub width: f32,
    pub length: f32,
    /// Lifetime (s)
    pub duration: f32,
    pub hp: i32,
    /// Player elements at the moment of firing
    pub elements: Vec<Element>,
    pub born_ms: f64,
    pub death_ms: Option<f64>,
    pub alive: bool,
}

impl Bullet {
    /// Fire along `angle` (radians) with the stats of `profile`
    pub fn new(
        origin: Vec2,
        angle: f32,
        profile: &WeaponProfile,
        elements: &[Element],
        now_ms: f64,
    ) -> Self {
        let heading = from_angle(angle);
        Self {
            origin,
            velocity: heading * profile.velocity,
            orientation: heading,
            width: profile.width,
            length: profile.length,
            duration: profile.duration,
            hp: profile.hp,
            elements: elements.to_vec(),
            born_ms: now_ms,
            death_ms: None,
            alive: true,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        if self.alive {
            self.origin += self.velocity * dt;
        }
    }

    /// Seconds since firing
    #[inline]
    pub fn age(&self, now_ms: f64) -> f32 {
        ((now_ms - self.born_ms).max(0.0) / 1000.0) as f32
    }

    /// Past its lifetime; the slot can be cleared whether or not it is alive
    #[inline]
    pub fn is_expired(&self, now_ms: f64) -> bool {
        self.age(now_ms) > self.duration
    }

    #[inline]
    pub fn collision_radius(&self) -> f32 {
        (self.width + self.length) * 0.25
    }

    pub fn is_wind(&self) -> bool {
        self.elements.contains(&Element::Wind)
    }

    pub fn kill(&mut self, now_ms: f64) {
        if self.alive {
            self.alive = false;
            self.death_ms = Some(now_ms);
        }
    }

    /// Outside `[-half, half]`
    pub fn is_outside(&self, half: Vec2) -> bool {
        self.origin.x.abs() > half.x || self.origin.y.abs() > half.y
    }

    /// Bend the heading toward `dir` by `amount`, keeping speed
    pub fn curl(&mut self, dir: Vec2, amount: f32) {
        let speed = self.velocity.length();
        let heading = crate::unit_or(self.orientation + dir * amount, self.orientation);
        self.orientation = heading;
        self.velocity = heading * speed;
    }
}
