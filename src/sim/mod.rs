//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Stable iteration order (by pool slot)
//! - Additions are deferred until the end of the tick
//! - No rendering, audio or platform dependencies

pub mod autopilot;
pub mod bullet;
pub mod collision;
pub mod combat;
pub mod director;
pub mod entity;
pub mod events;
pub mod grid;
pub mod input;
pub mod particle;
pub mod pool;
pub mod rng;
pub mod state;
pub mod steering;
pub mod tick;
pub mod weapon;

pub use bullet::Bullet;
pub use entity::{Archetype, Element, Entity};
pub use events::SoundEvent;
pub use grid::Grid;
pub use input::{Button, InputSnapshot, Intent, Key, MenuCommand};
pub use particle::Particle;
pub use state::{GameData, GameMode, GamePhase};
pub use tick::{TickOutput, tick};
pub use weapon::WeaponProfile;
