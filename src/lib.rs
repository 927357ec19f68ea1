//! Warp Arena - a twin-stick arena shooter simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, warp grid, weapons, spawn director)
//! - `snapshot`: Read-only render snapshot emitted after every tick
//! - `highscores`: Highscore persistence (`gamedata.yml`)
//! - `tuning`: Data-driven game balance
//!
//! The host drives [`sim::tick`] with an input snapshot and renders the
//! returned [`snapshot::RenderSnapshot`]; sound events are fire-and-forget.

pub mod color;
pub mod error;
pub mod highscores;
pub mod sim;
pub mod snapshot;
pub mod tuning;

pub use error::{ArenaError, ArenaResult};
pub use highscores::HighScore;
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep used by the headless host (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Real frame time is clamped to this before scaling
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Default arena dimensions (world units, centered on the origin)
    pub const ARENA_WIDTH: f32 = 1600.0;
    pub const ARENA_HEIGHT: f32 = 1000.0;
    /// Spacing between warp grid nodes
    pub const GRID_SPACING: f32 = 40.0;

    /// Pool capacities
    pub const MAX_ENTITIES: usize = 1024;
    pub const MAX_BULLETS: usize = 1024;
    pub const MAX_PARTICLES: usize = 5000;

    /// Player ship defaults
    pub const PLAYER_RADIUS: f32 = 20.0;
    pub const PLAYER_SPEED: f32 = 450.0;
    pub const PLAYER_ACCELERATION: f32 = 3.0;
    pub const PLAYER_FRICTION: f32 = 0.9;

    /// Snake tail cap
    pub const SNEK_MAX_TAIL: usize = 16;
    /// Player element list cap
    pub const MAX_ELEMENTS: usize = 2;
}

/// Angle of a vector in radians
#[inline]
pub fn angle_of(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

/// Unit vector for an angle in radians
#[inline]
pub fn from_angle(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}

/// Rotate a vector by `theta` radians
#[inline]
pub fn rotate(v: Vec2, theta: f32) -> Vec2 {
    Vec2::from_angle(theta).rotate(v)
}

/// Unit vector, or `fallback` for a (near) zero-length input
#[inline]
pub fn unit_or(v: Vec2, fallback: Vec2) -> Vec2 {
    let len_sq = v.length_squared();
    if len_sq > 1e-12 { v / len_sq.sqrt() } else { fallback }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_or_zero_vector() {
        assert_eq!(unit_or(Vec2::ZERO, Vec2::X), Vec2::X);
        let u = unit_or(Vec2::new(3.0, 4.0), Vec2::X);
        assert!((u.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let v = rotate(Vec2::X, std::f32::consts::FRAC_PI_2);
        assert!(v.x.abs() < 1e-6);
        assert!((v.y - 1.0).abs() < 1e-6);
    }
}
