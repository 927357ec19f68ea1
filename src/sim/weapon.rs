//! Weapon composition
//!
//! The player's ordered element list (0-2 items) is projected onto a base
//! profile every tick. Inclusion rules run first, then each element applies
//! its cumulative rule in order, then a random cone absorbs any conic angle.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::bullet::Bullet;
use super::entity::Element;
use super::rng::GameRng;
use crate::{angle_of, from_angle};

/// Fire rate never drops below this (ms between volleys)
const MIN_FIRE_RATE: f32 = 10.0;
/// Fan and reflective bullets start this far from the ship
const MUZZLE_OFFSET: f32 = 25.0;
/// The centre bullet of a conic burst starts this far from the ship
const CONIC_CENTER_OFFSET: f32 = 10.0;

/// Derived weapon stats
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaponProfile {
    /// Milliseconds between volleys
    pub fire_rate: f32,
    pub bullet_count: u32,
    pub width: f32,
    pub length: f32,
    /// Half-angle of a three-way burst (degrees)
    pub conic_angle: f32,
    /// Full width of a random spray (degrees)
    pub random_cone: f32,
    pub velocity: f32,
    /// Bullet lifetime (s)
    pub duration: f32,
    pub hp: i32,
    /// Extra copies fired around the ship per bullet
    pub reflective: u32,
}

impl Default for WeaponProfile {
    fn default() -> Self {
        Self {
            fire_rate: 150.0,
            bullet_count: 2,
            width: 8.0,
            length: 20.0,
            conic_angle: 0.0,
            random_cone: 0.0,
            velocity: 1100.0,
            duration: 5.0,
            hp: 1,
            reflective: 0,
        }
    }
}

impl WeaponProfile {
    /// Project an element list onto the base profile
    pub fn resolve(elements: &[Element]) -> Self {
        let mut w = Self::default();
        let has = |e: Element| elements.contains(&e);

        if has(Element::Water) || has(Element::Spirit) {
            w.bullet_count = 1;
        }
        if has(Element::Fire) {
            w.bullet_count = 4;
            w.duration = 0.25;
            w.fire_rate = 50.0;
            w.random_cone = 12.0;
        }
        if elements.iter().filter(|e| **e == Element::Chaos).count() >= 2 {
            w.bullet_count = 1;
        }

        for element in elements {
            match element {
                Element::Wind => {
                    w.bullet_count += 3;
                    w.duration += 0.2;
                }
                Element::Water => {
                    w.conic_angle += 3.0;
                    w.velocity += 100.0;
                    w.fire_rate = (w.fire_rate - 30.0).max(130.0);
                    w.duration = 5.0;
                    w.reset_random_cone();
                }
                Element::Fire => {
                    w.velocity += 100.0;
                    if w.conic_angle == 0.0 {
                        w.random_cone += 8.0;
                        w.bullet_count += 3;
                    } else {
                        w.duration += 0.125;
                    }
                }
                Element::Spirit => {
                    w.velocity += 400.0;
                    w.length += 4.0;
                    w.conic_angle += 1.0;
                    w.hp *= 2;
                    w.duration = 5.0;
                    w.fire_rate = (w.fire_rate - 30.0).max(120.0);
                    w.reset_random_cone();
                }
                Element::Lightning => {
                    w.width /= 1.4;
                    w.length *= 1.4;
                    w.velocity += 150.0;
                    w.fire_rate -= 30.0;
                    w.duration += 0.125;
                }
                Element::Chaos => {
                    w.reflective += 1;
                    w.conic_angle += 2.0;
                    w.fire_rate -= 20.0;
                    w.duration += 0.125;
                }
            }
        }

        if w.random_cone > 0.0 {
            w.random_cone += w.conic_angle;
            w.conic_angle = 0.0;
        }
        w.fire_rate = w.fire_rate.max(MIN_FIRE_RATE);
        w
    }

    fn reset_random_cone(&mut self) {
        if self.random_cone > 0.0 {
            self.random_cone = 0.0;
            self.bullet_count = 2;
        }
    }

    /// Build the volley fired from `origin` along the unit vector `aim`
    pub fn fire(
        &self,
        origin: Vec2,
        aim: Vec2,
        elements: &[Element],
        now_ms: f64,
        rng: &mut GameRng,
    ) -> Vec<Bullet> {
        let theta = angle_of(aim);
        let mut volley = Vec::new();

        if self.conic_angle > 0.0 {
            let spread = self.conic_angle.to_radians();
            volley.push(Bullet::new(origin, theta + spread, self, elements, now_ms));
            volley.push(Bullet::new(origin, theta - spread, self, elements, now_ms));
            volley.push(Bullet::new(
                origin + aim * CONIC_CENTER_OFFSET,
                theta,
                self,
                elements,
                now_ms,
            ));
        } else if self.random_cone > 0.0 {
            let half = self.random_cone * 0.5;
            for _ in 0..self.bullet_count {
                let angle = theta + rng.uniform(-half, half).to_radians();
                let mut bullet = Bullet::new(origin, angle, self, elements, now_ms);
                bullet.duration *= rng.uniform(0.75, 1.25);
                volley.push(bullet);
            }
        } else {
            let muzzle = origin + aim * MUZZLE_OFFSET;
            let lateral = aim.perp();
            let count = self.bullet_count.max(1) as f32;
            for i in 0..self.bullet_count {
                let offset = -self.width * 0.5 + i as f32 * (self.width / count);
                let angle = theta + (i as f32 - 2.0).to_radians();
                volley.push(Bullet::new(
                    muzzle + lateral * offset,
                    angle,
                    self,
                    elements,
                    now_ms,
                ));
            }
        }

        if self.reflective > 0 {
            let step = std::f32::consts::TAU / (self.reflective + 1) as f32;
            let primaries: Vec<f32> = volley.iter().map(|b| angle_of(b.orientation)).collect();
            for angle in primaries {
                for k in 1..=self.reflective {
                    let a = angle + k as f32 * step;
                    let start = origin + from_angle(a) * MUZZLE_OFFSET;
                    volley.push(Bullet::new(start, a, self, elements, now_ms));
                }
            }
        }

        volley
    }
}

/// Consume shared element tags, one pair per match, from both lists.
/// Returns how many pairs were consumed.
pub fn consume_wards(attacker: &mut Vec<Element>, defender: &mut Vec<Element>) -> usize {
    let mut consumed = 0;
    let mut i = 0;
    while i < attacker.len() {
        if let Some(j) = defender.iter().position(|e| *e == attacker[i]) {
            defender.remove(j);
            attacker.remove(i);
            consumed += 1;
        } else {
            i += 1;
        }
    }
    consumed
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_base_profile() {
        let w = WeaponProfile::resolve(&[]);
        assert_eq!(w, WeaponProfile::default());
        assert_eq!(w.fire_rate, 150.0);
        assert_eq!(w.bullet_count, 2);
    }

    #[test]
    fn test_fire_lightning() {
        let w = WeaponProfile::resolve(&[Element::Fire, Element::Lightning]);
        assert_eq!(w.bullet_count, 7);
        assert!(approx(w.duration, 0.375));
        assert!(approx(w.fire_rate, 20.0));
        assert!(approx(w.random_cone, 20.0));
        assert_eq!(w.conic_angle, 0.0);
        assert!(approx(w.velocity, 1350.0));
        assert!(approx(w.length, 28.0));
        assert!(approx(w.width, 8.0 / 1.4));
    }

    #[test]
    fn test_water_water() {
        let w = WeaponProfile::resolve(&[Element::Water, Element::Water]);
        assert_eq!(w.bullet_count, 1);
        assert!(approx(w.conic_angle, 6.0));
        assert!(approx(w.velocity, 1300.0));
        assert!(approx(w.fire_rate, 130.0));
        assert!(approx(w.duration, 5.0));
        assert_eq!(w.random_cone, 0.0);
    }

    #[test]
    fn test_fire_then_water_resets_cone() {
        let w = WeaponProfile::resolve(&[Element::Fire, Element::Water]);
        // fire: cone 12 + 8, count 7; water resets the cone and count
        assert_eq!(w.random_cone, 0.0);
        assert_eq!(w.bullet_count, 2);
        assert!(approx(w.conic_angle, 3.0));
        assert!(approx(w.duration, 5.0));
    }

    #[test]
    fn test_random_cone_absorbs_conic() {
        let w = WeaponProfile::resolve(&[Element::Fire, Element::Chaos]);
        assert!(approx(w.random_cone, 22.0));
        assert_eq!(w.conic_angle, 0.0);
        assert_eq!(w.reflective, 1);
    }

    #[test]
    fn test_double_chaos_single_bullet() {
        let w = WeaponProfile::resolve(&[Element::Chaos, Element::Chaos]);
        assert_eq!(w.bullet_count, 1);
        assert_eq!(w.reflective, 2);
        assert!(approx(w.conic_angle, 4.0));
    }

    #[test]
    fn test_spirit_doubles_hp() {
        let w = WeaponProfile::resolve(&[Element::Spirit]);
        assert_eq!(w.hp, 2);
        assert!(approx(w.velocity, 1500.0));
        assert!(approx(w.fire_rate, 120.0));
    }

    #[test]
    fn test_wind_adds_bullets() {
        let w = WeaponProfile::resolve(&[Element::Wind, Element::Wind]);
        assert_eq!(w.bullet_count, 8);
        assert!(approx(w.duration, 5.4));
    }

    #[test]
    fn test_fan_volley() {
        let mut rng = GameRng::new(1);
        let w = WeaponProfile::default();
        let volley = w.fire(Vec2::ZERO, Vec2::X, &[], 0.0, &mut rng);
        assert_eq!(volley.len(), 2);
        // Both start 25 units ahead, spread across the bullet width
        for b in &volley {
            assert!(approx(b.origin.x, 25.0));
        }
        assert!(approx(volley[0].origin.y, -4.0));
        assert!(approx(volley[1].origin.y, 0.0));
        assert!(approx(angle_of(volley[0].orientation), (-2f32).to_radians()));
        assert!(approx(angle_of(volley[1].orientation), (-1f32).to_radians()));
    }

    #[test]
    fn test_conic_volley() {
        let mut rng = GameRng::new(1);
        let w = WeaponProfile::resolve(&[Element::Water]);
        let volley = w.fire(Vec2::ZERO, Vec2::Y, &[Element::Water], 0.0, &mut rng);
        assert_eq!(volley.len(), 3);
        let center = &volley[2];
        assert!(approx(center.origin.y, 10.0));
        let a = angle_of(volley[0].orientation) - angle_of(Vec2::Y);
        assert!(approx(a, 3f32.to_radians()));
        assert!(volley.iter().all(|b| b.elements == vec![Element::Water]));
    }

    #[test]
    fn test_random_cone_volley() {
        let mut rng = GameRng::new(1);
        let w = WeaponProfile::resolve(&[Element::Fire]);
        let volley = w.fire(Vec2::ZERO, Vec2::X, &[], 0.0, &mut rng);
        assert_eq!(volley.len(), w.bullet_count as usize);
        let half = (w.random_cone * 0.5).to_radians();
        for b in &volley {
            assert!(angle_of(b.orientation).abs() <= half + 1e-4);
            assert!(b.duration >= w.duration * 0.75 - 1e-4);
            assert!(b.duration <= w.duration * 1.25 + 1e-4);
        }
    }

    #[test]
    fn test_reflective_copies() {
        let mut rng = GameRng::new(1);
        let w = WeaponProfile::resolve(&[Element::Chaos]);
        // conic 2, reflective 1: three primaries, each mirrored once
        let volley = w.fire(Vec2::ZERO, Vec2::X, &[], 0.0, &mut rng);
        assert_eq!(volley.len(), 6);
        let mirrored = &volley[5];
        assert!(approx(angle_of(mirrored.orientation).abs(), std::f32::consts::PI));
        assert!(approx(mirrored.origin.length(), 25.0));
    }

    #[test]
    fn test_consume_wards_pairs() {
        let mut bullet = vec![Element::Fire, Element::Fire];
        let mut enemy = vec![Element::Fire, Element::Water];
        assert_eq!(consume_wards(&mut bullet, &mut enemy), 1);
        assert_eq!(bullet, vec![Element::Fire]);
        assert_eq!(enemy, vec![Element::Water]);

        let mut none = vec![Element::Wind];
        assert_eq!(consume_wards(&mut none, &mut enemy), 0);
        assert_eq!(none, vec![Element::Wind]);
    }

    fn element() -> impl Strategy<Value = Element> {
        prop::sample::select(Element::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn prop_resolved_profile_is_usable(elements in prop::collection::vec(element(), 0..=2)) {
            let w = WeaponProfile::resolve(&elements);
            prop_assert!(w.fire_rate >= MIN_FIRE_RATE);
            prop_assert!(w.bullet_count >= 1);
            prop_assert!(w.velocity > 0.0);
            prop_assert!(w.duration > 0.0);
            prop_assert!(w.hp >= 1);
            prop_assert!(w.conic_angle == 0.0 || w.random_cone == 0.0);
        }

        #[test]
        fn prop_volley_is_nonempty(elements in prop::collection::vec(element(), 0..=2), angle in 0.0f32..6.28) {
            let mut rng = GameRng::new(11);
            let w = WeaponProfile::resolve(&elements);
            let volley = w.fire(Vec2::ZERO, from_angle(angle), &elements, 0.0, &mut rng);
            prop_assert!(!volley.is_empty());
            prop_assert!(volley.iter().all(|b| b.velocity.is_finite()));
        }
    }
}
