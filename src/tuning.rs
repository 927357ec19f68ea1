//! Data-driven game balance
//!
//! Every field defaults to the compile-time constant in [`crate::consts`], so a
//! tuning file only needs the values it overrides.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{ArenaError, ArenaResult};

/// Optional tuning file read from the working directory
pub const TUNING_FILE: &str = "tuning.json";

/// Runtime-tunable balance and world configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === World ===
    pub arena_width: f32,
    pub arena_height: f32,
    pub grid_spacing: f32,

    // === Pools ===
    pub max_entities: usize,
    pub max_bullets: usize,
    pub max_particles: usize,

    // === Entity lifecycle ===
    /// Grace period after spawning before an enemy steers or collides (ms)
    pub spawn_grace_ms: f64,
    /// How long a dead entity lingers for its bounty text (ms)
    pub dead_linger_ms: f64,
    /// Chance a killed enemy drops an essence
    pub essence_drop_chance: f32,
    /// Essence lifetime (ms)
    pub essence_lifetime_ms: f64,

    // === Player ===
    pub starting_lives: u32,
    pub starting_bombs: u32,
    /// Director pause after a player death (ms)
    pub respawn_pause_ms: f64,

    // === Rewards ===
    pub life_reward: u64,
    pub bomb_reward: u64,
    pub multiplier_reward: u32,
    pub max_multiplier: u32,

    // === Debug ===
    /// Player cannot die
    pub debug: bool,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,
            grid_spacing: GRID_SPACING,

            max_entities: MAX_ENTITIES,
            max_bullets: MAX_BULLETS,
            max_particles: MAX_PARTICLES,

            spawn_grace_ms: 1000.0,
            dead_linger_ms: 300.0,
            essence_drop_chance: 0.04,
            essence_lifetime_ms: 10_000.0,

            starting_lives: 3,
            starting_bombs: 3,
            respawn_pause_ms: 2000.0,

            life_reward: 75_000,
            bomb_reward: 100_000,
            multiplier_reward: 25,
            max_multiplier: 10,

            debug: false,
        }
    }
}

impl Tuning {
    /// Load tuning from a JSON file.
    ///
    /// A missing file yields defaults; a malformed one logs a warning and
    /// yields defaults.
    pub fn load(path: &Path) -> Self {
        match Self::load_strict(path) {
            Ok(tuning) => tuning,
            Err(ArenaError::AssetMissing { .. }) => {
                log::info!("No tuning file at {}, using defaults", path.display());
                Self::default()
            }
            Err(err) => {
                log::warn!("{err}; using default tuning");
                Self::default()
            }
        }
    }

    /// Load tuning from a JSON file, reporting every failure.
    pub fn load_strict(path: &Path) -> ArenaResult<Self> {
        let text = fs::read_to_string(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => ArenaError::AssetMissing {
                path: path.to_path_buf(),
            },
            _ => ArenaError::PersistenceRead {
                path: path.to_path_buf(),
                reason: err.to_string(),
            },
        })?;

        let tuning: Self = serde_json::from_str(&text).map_err(|err| ArenaError::PersistenceRead {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning.sanitized())
    }

    /// Clamp values that would break the simulation
    pub fn sanitized(mut self) -> Self {
        self.arena_width = self.arena_width.max(200.0);
        self.arena_height = self.arena_height.max(200.0);
        self.grid_spacing = self.grid_spacing.max(4.0);
        self.max_entities = self.max_entities.max(1);
        self.max_bullets = self.max_bullets.max(1);
        self.max_particles = self.max_particles.min(MAX_PARTICLES);
        self.max_multiplier = self.max_multiplier.max(1);
        self.life_reward = self.life_reward.max(1);
        self.bomb_reward = self.bomb_reward.max(1);
        self.multiplier_reward = self.multiplier_reward.max(1);
        self.essence_drop_chance = self.essence_drop_chance.clamp(0.0, 1.0);
        self
    }

    /// Half extents of the arena
    pub fn half_extents(&self) -> glam::Vec2 {
        glam::Vec2::new(self.arena_width, self.arena_height) * 0.5
    }

    /// Radius used for random wander targets
    pub fn arena_radius(&self) -> f32 {
        self.arena_width.min(self.arena_height) * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let tuning = Tuning::load(&dir.path().join("nope.json"));
        assert_eq!(tuning, Tuning::default());
    }

    #[test]
    fn test_missing_file_strict_is_asset_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = Tuning::load_strict(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ArenaError::AssetMissing { .. }));
    }

    #[test]
    fn test_partial_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "arena_width": 800.0, "debug": true }}"#).unwrap();
        let tuning = Tuning::load(file.path());
        assert_eq!(tuning.arena_width, 800.0);
        assert!(tuning.debug);
        assert_eq!(tuning.arena_height, ARENA_HEIGHT);
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert_eq!(Tuning::load(file.path()), Tuning::default());
    }

    #[test]
    fn test_sanitize_caps_particles() {
        let tuning = Tuning {
            max_particles: 1_000_000,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(tuning.max_particles, MAX_PARTICLES);
    }
}
