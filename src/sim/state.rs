//! Game data and core simulation types
//!
//! [`GameData`] exclusively owns the pools, the grid and the PRNG. Everything
//! a tick reads or writes lives here.

use glam::{Vec2, Vec4};
use serde::{Deserialize, Serialize};

use super::bullet::Bullet;
use super::director::WaveData;
use super::entity::Entity;
use super::events::SoundQueue;
use super::grid::Grid;
use super::particle::Particle;
use super::pool::Pool;
use super::rng::GameRng;
use super::weapon::WeaponProfile;
use crate::tuning::Tuning;

/// Game-state tag driven by the tick's state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen; the attract-mode AI plays behind it
    StartScreen,
    MainMenu,
    Paused,
    /// One-tick setup before a run
    Starting,
    Playing,
    GameOver,
    StoryMode,
    /// Clears the run, then returns to the main menu
    Reset,
    Quitting,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::StartScreen => "start_screen",
            GamePhase::MainMenu => "main_menu",
            GamePhase::Paused => "paused",
            GamePhase::Starting => "starting",
            GamePhase::Playing => "playing",
            GamePhase::GameOver => "game_over",
            GamePhase::StoryMode => "story_mode",
            GamePhase::Reset => "reset",
            GamePhase::Quitting => "quitting",
        }
    }

    /// Phases in which the world advances
    pub fn simulates(&self) -> bool {
        matches!(
            self,
            GamePhase::StartScreen | GamePhase::MainMenu | GamePhase::Playing | GamePhase::StoryMode
        )
    }
}

/// Rule set for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    Evolved,
    /// No weapon; followers and gates only
    Pacifism,
    /// Attract mode behind the menus; the ship flies itself
    Menu,
    /// Everything but the director
    Sandbox,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Evolved => "evolved",
            GameMode::Pacifism => "pacifism",
            GameMode::Menu => "menu",
            GameMode::Sandbox => "sandbox",
        }
    }
}

/// Next reward thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rewards {
    pub next_life: u64,
    pub next_bomb: u64,
    pub next_multiplier: u32,
}

impl Rewards {
    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self {
            next_life: tuning.life_reward,
            next_bomb: tuning.bomb_reward,
            next_multiplier: tuning.multiplier_reward,
        }
    }
}

/// Director pacing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pacing {
    /// Seconds between ambient spawns
    pub ambient_spawn_freq: f32,
    /// Seconds between waves
    pub wave_freq: f32,
    /// kills / 100
    pub notoriety: f32,
    /// Global tick scale
    pub time_scale: f32,
    /// Extra scale for entities near black holes and bubbles
    pub entity_time_scale: f32,
    /// Ambient spawning enabled
    pub spawning: bool,
    /// Enemies per ambient spawn
    pub spawn_count: u32,
    /// Ambient spawns so far this run
    pub spawns: u32,
}

impl Pacing {
    pub fn for_mode(mode: GameMode) -> Self {
        let base = Self {
            ambient_spawn_freq: 3.0,
            wave_freq: 20.0,
            notoriety: 0.0,
            time_scale: 1.0,
            entity_time_scale: 1.0,
            spawning: true,
            spawn_count: 1,
            spawns: 0,
        };
        match mode {
            GameMode::Pacifism => Self {
                ambient_spawn_freq: 4.0,
                spawn_count: 4,
                ..base
            },
            _ => base,
        }
    }
}

/// Game clock and event timestamps (ms)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Clock {
    pub now_ms: f64,
    pub last_spawn: f64,
    pub last_bullet: f64,
    pub last_bomb: f64,
    pub last_wave: f64,
    pub game_start: f64,
    /// The director stays idle until this time
    pub director_resume: f64,
}

impl Clock {
    /// Seconds elapsed since `since`
    pub fn since(&self, since: f64) -> f32 {
        ((self.now_ms - since).max(0.0) / 1000.0) as f32
    }
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameData {
    pub tuning: Tuning,
    pub rng: GameRng,
    pub phase: GamePhase,
    pub mode: GameMode,
    /// Mode the next run starts in
    pub pending_mode: GameMode,
    /// Cleared when the host should shut down
    pub running: bool,
    pub player: Entity,
    /// Last aim direction (unit)
    pub aim: Vec2,
    pub entities: Pool<Entity>,
    pub bullets: Pool<Bullet>,
    pub particles: Pool<Particle>,
    pub grid: Grid,
    pub score: u64,
    pub kills: u32,
    pub lives: u32,
    pub bombs: u32,
    pub multiplier: u32,
    pub high_score: u64,
    pub rewards: Rewards,
    pub pacing: Pacing,
    pub clock: Clock,
    pub weapon: WeaponProfile,
    pub waves: Vec<WaveData>,
    pub camera: Vec2,
    /// Autopilot wander target
    pub ai_target: Option<Vec2>,
    pub sounds: SoundQueue,
}

impl GameData {
    /// Fresh state on the start screen, attract mode running
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let tuning = tuning.sanitized();
        let half = tuning.half_extents();
        let mut data = Self {
            rng: GameRng::new(seed),
            phase: GamePhase::StartScreen,
            mode: GameMode::Menu,
            pending_mode: GameMode::Evolved,
            running: true,
            player: Entity::player(Vec2::ZERO, 0.0),
            aim: Vec2::Y,
            entities: Pool::with_capacity(tuning.max_entities),
            bullets: Pool::with_capacity(tuning.max_bullets),
            particles: Pool::with_capacity(tuning.max_particles),
            grid: Grid::new(-half, half, tuning.grid_spacing),
            score: 0,
            kills: 0,
            lives: tuning.starting_lives,
            bombs: tuning.starting_bombs,
            multiplier: 1,
            high_score: 0,
            rewards: Rewards::from_tuning(&tuning),
            pacing: Pacing::for_mode(GameMode::Menu),
            clock: Clock::default(),
            weapon: WeaponProfile::default(),
            waves: Vec::new(),
            camera: Vec2::ZERO,
            ai_target: None,
            sounds: SoundQueue::default(),
            tuning,
        };
        data.reset_run(GameMode::Menu);
        data
    }

    /// Clear the world and start a new run in `mode`. The game clock keeps
    /// running so timestamps stay monotonic.
    pub fn reset_run(&mut self, mode: GameMode) {
        let now = self.clock.now_ms;
        self.mode = mode;
        self.entities.clear();
        self.bullets.clear();
        self.particles.clear();
        self.waves.clear();
        self.player = Entity::player(Vec2::ZERO, now);
        self.aim = Vec2::Y;
        self.score = 0;
        self.kills = 0;
        self.lives = self.tuning.starting_lives;
        self.bombs = self.tuning.starting_bombs;
        self.multiplier = 1;
        self.rewards = Rewards::from_tuning(&self.tuning);
        self.pacing = Pacing::for_mode(mode);
        self.clock = Clock {
            now_ms: now,
            last_spawn: now,
            last_bullet: now,
            last_bomb: now - 1000.0,
            last_wave: now,
            game_start: now,
            director_resume: now,
        };
        self.weapon = WeaponProfile::default();
        self.ai_target = None;
        log::info!("Run started: mode={} seed={}", mode.as_str(), self.rng.seed());
    }

    #[inline]
    pub fn half(&self) -> Vec2 {
        self.tuning.half_extents()
    }

    /// Add a bounty, scaled by the multiplier
    pub fn award(&mut self, bounty: u32) {
        self.score += u64::from(bounty) * u64::from(self.multiplier);
    }

    /// Live enemies (spawning ones included)
    pub fn enemy_count(&self) -> usize {
        self.entities
            .iter()
            .filter(|e| e.alive && e.archetype.is_enemy())
            .count()
    }

    /// Player is steered by the autopilot
    pub fn is_autopiloted(&self) -> bool {
        self.mode == GameMode::Menu
    }

    /// Color of the player ship, tinted by its newest element
    pub fn player_color(&self) -> Vec4 {
        match self.player.elements.last() {
            Some(element) => crate::color::hsv_to_rgb(element.hue(), 0.35, 1.0),
            None => self.player.color,
        }
    }
}
