//! Actor records shared by the player, enemies and pickups
//!
//! One flat [`Entity`] record is used for every in-world actor. The
//! [`Archetype`] tag selects steering, damage and cosmetic rules; data only a
//! few archetypes need lives in [`ArchetypeState`].

use glam::{Vec2, Vec4};
use serde::{Deserialize, Serialize};

use super::rng::GameRng;
use crate::color::palette;
use crate::consts::*;
use crate::unit_or;

/// Velocity magnitude below which an entity stops
const STOP_SPEED: f32 = 0.2;

/// Actor kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Archetype {
    Player,
    Follower,
    Wanderer,
    Dodger,
    Pink,
    PinkPleb,
    Snek,
    Bubble,
    BlackHole,
    Replicator,
    Gate,
    Essence,
}

impl Archetype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Archetype::Player => "player",
            Archetype::Follower => "follower",
            Archetype::Wanderer => "wanderer",
            Archetype::Dodger => "dodger",
            Archetype::Pink => "pink",
            Archetype::PinkPleb => "pinkpleb",
            Archetype::Snek => "snek",
            Archetype::Bubble => "bubble",
            Archetype::BlackHole => "blackhole",
            Archetype::Replicator => "replicator",
            Archetype::Gate => "gate",
            Archetype::Essence => "essence",
        }
    }

    /// Hostile to the player (everything except the player and pickups)
    pub fn is_enemy(&self) -> bool {
        !matches!(self, Archetype::Player | Archetype::Essence)
    }

    /// Archetypes exempt from same-kind separation
    pub fn overlaps_freely(&self) -> bool {
        matches!(
            self,
            Archetype::PinkPleb
                | Archetype::Snek
                | Archetype::Gate
                | Archetype::Essence
                | Archetype::Player
        )
    }
}

/// Weapon/ward element tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Element {
    Wind,
    Water,
    Fire,
    Spirit,
    Lightning,
    Chaos,
}

impl Element {
    pub const ALL: [Element; 6] = [
        Element::Wind,
        Element::Water,
        Element::Fire,
        Element::Spirit,
        Element::Lightning,
        Element::Chaos,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Element::Wind => "wind",
            Element::Water => "water",
            Element::Fire => "fire",
            Element::Spirit => "spirit",
            Element::Lightning => "lightning",
            Element::Chaos => "chaos",
        }
    }

    /// Hue (degrees) used to tint essences and warded enemies
    pub fn hue(&self) -> f32 {
        match self {
            Element::Wind => 150.0,
            Element::Water => 210.0,
            Element::Fire => 15.0,
            Element::Spirit => 280.0,
            Element::Lightning => 55.0,
            Element::Chaos => 320.0,
        }
    }

    pub fn random(rng: &mut GameRng) -> Self {
        Self::ALL[rng.range(0, Self::ALL.len())]
    }
}

/// Add an element to an ordered list of at most [`MAX_ELEMENTS`], dropping
/// the oldest when full.
pub fn enqueue_element(list: &mut Vec<Element>, element: Element) {
    list.push(element);
    while list.len() > MAX_ELEMENTS {
        list.remove(0);
    }
}

/// One snake tail segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TailSegment {
    pub origin: Vec2,
    pub orientation: Vec2,
    pub radius: f32,
}

impl TailSegment {
    /// Point behind the segment that the next segment follows
    pub fn back(&self) -> Vec2 {
        self.origin - self.orientation * self.radius
    }
}

/// Archetype-specific state
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ArchetypeState {
    #[default]
    None,
    Snek {
        tail: Vec<TailSegment>,
        /// Current weave amplitude (radians)
        cone: f32,
        /// Index of the 2 s period the cone was rolled for
        period: u32,
    },
    BlackHole {
        active: bool,
        /// Direction of the next spiral particle (radians)
        emit_angle: f32,
    },
    PinkPleb {
        /// Drifting centre the pleb orbits
        virtual_origin: Vec2,
    },
}

/// An in-world actor
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub archetype: Archetype,
    pub origin: Vec2,
    pub velocity: Vec2,
    /// Unit facing vector
    pub orientation: Vec2,
    pub target: Option<Vec2>,
    pub radius: f32,
    /// Radius used for same-kind separation
    pub collider_radius: f32,
    /// Speed cap (units/s)
    pub speed: f32,
    pub acceleration: f32,
    /// Per-tick velocity multiplier in (0, 1]
    pub friction: f32,
    pub hp: i32,
    pub bounty: u32,
    pub born_ms: f64,
    pub death_ms: Option<f64>,
    pub expiry_ms: Option<f64>,
    pub alive: bool,
    pub spawning: bool,
    /// Reflect velocity at the arena edge
    pub bounce: bool,
    pub color: Vec4,
    pub elements: Vec<Element>,
    pub state: ArchetypeState,
}

impl Entity {
    /// Bare record with shared defaults; archetype factories tune it
    fn base(archetype: Archetype, origin: Vec2, now_ms: f64) -> Self {
        Self {
            archetype,
            origin,
            velocity: Vec2::ZERO,
            orientation: Vec2::X,
            target: None,
            radius: 20.0,
            collider_radius: 20.0,
            speed: 200.0,
            acceleration: 0.5,
            friction: 0.95,
            hp: 1,
            bounty: 0,
            born_ms: now_ms,
            death_ms: None,
            expiry_ms: None,
            alive: true,
            spawning: true,
            bounce: false,
            color: palette::PLAYER,
            elements: Vec::new(),
            state: ArchetypeState::None,
        }
    }

    /// The player ship
    pub fn player(origin: Vec2, now_ms: f64) -> Self {
        Self {
            radius: PLAYER_RADIUS,
            collider_radius: PLAYER_RADIUS,
            speed: PLAYER_SPEED,
            acceleration: PLAYER_ACCELERATION,
            friction: PLAYER_FRICTION,
            spawning: false,
            orientation: Vec2::Y,
            ..Self::base(Archetype::Player, origin, now_ms)
        }
    }

    /// An essence pickup carrying one element
    pub fn essence(origin: Vec2, element: Element, now_ms: f64, lifetime_ms: f64) -> Self {
        Self {
            radius: 14.0,
            collider_radius: 14.0,
            speed: 0.0,
            acceleration: 0.0,
            friction: 1.0,
            spawning: false,
            expiry_ms: Some(now_ms + lifetime_ms),
            color: crate::color::hsv_to_rgb(element.hue(), 0.6, 1.0),
            elements: vec![element],
            ..Self::base(Archetype::Essence, origin, now_ms)
        }
    }

    /// Archetype factory. Randomized fields (weave cone, spiral phase) draw
    /// from `rng`.
    pub fn spawn(archetype: Archetype, origin: Vec2, now_ms: f64, rng: &mut GameRng) -> Self {
        let base = Self::base(archetype, origin, now_ms);
        match archetype {
            Archetype::Player => Self::player(origin, now_ms),
            Archetype::Follower => Self {
                speed: 280.0,
                acceleration: 0.6,
                friction: 0.95,
                bounty: 50,
                color: palette::FOLLOWER,
                ..base
            },
            Archetype::Wanderer => Self {
                speed: 150.0,
                acceleration: 0.4,
                friction: 0.95,
                bounty: 25,
                bounce: true,
                orientation: rng.direction(),
                color: palette::WANDERER,
                ..base
            },
            Archetype::Dodger => Self {
                speed: 320.0,
                acceleration: 0.8,
                friction: 0.94,
                bounty: 100,
                color: palette::DODGER,
                ..base
            },
            Archetype::Pink => Self {
                radius: 22.0,
                collider_radius: 22.0,
                speed: 220.0,
                acceleration: 0.5,
                bounty: 100,
                color: palette::PINK,
                ..base
            },
            Archetype::PinkPleb => Self {
                radius: 12.0,
                collider_radius: 12.0,
                speed: 120.0,
                acceleration: 0.3,
                friction: 0.96,
                bounty: 75,
                bounce: true,
                color: palette::PINK_PLEB,
                state: ArchetypeState::PinkPleb {
                    virtual_origin: origin,
                },
                ..base
            },
            Archetype::Snek => Self {
                radius: 16.0,
                collider_radius: 16.0,
                speed: 260.0,
                acceleration: 0.7,
                bounty: 150,
                color: palette::SNEK,
                state: ArchetypeState::Snek {
                    tail: Vec::with_capacity(SNEK_MAX_TAIL),
                    cone: rng.uniform(30.0, 120.0).to_radians(),
                    period: 0,
                },
                ..base
            },
            Archetype::Bubble => Self {
                radius: 18.0,
                collider_radius: 18.0,
                speed: 600.0,
                acceleration: 0.9,
                friction: 0.99,
                bounty: 100,
                bounce: true,
                color: palette::BUBBLE,
                ..base
            },
            Archetype::BlackHole => Self {
                radius: 24.0,
                collider_radius: 24.0,
                speed: 0.0,
                acceleration: 0.0,
                friction: 1.0,
                hp: 10,
                bounty: 150,
                color: palette::BLACK_HOLE,
                state: ArchetypeState::BlackHole {
                    active: false,
                    emit_angle: rng.angle(),
                },
                ..base
            },
            Archetype::Replicator => Self {
                radius: 18.0,
                collider_radius: 18.0,
                speed: 200.0,
                acceleration: 0.25,
                bounty: 50,
                bounce: true,
                color: palette::REPLICATOR,
                ..base
            },
            Archetype::Gate => Self {
                radius: 40.0,
                collider_radius: 16.0,
                speed: 40.0,
                acceleration: 0.2,
                friction: 0.96,
                bounty: 50,
                bounce: true,
                orientation: rng.direction(),
                color: palette::GATE,
                ..base
            },
            Archetype::Essence => {
                Self::essence(origin, Element::random(rng), now_ms, 10_000.0)
            }
        }
    }

    /// Seconds since this entity was created
    #[inline]
    pub fn time_alive(&self, now_ms: f64) -> f32 {
        ((now_ms - self.born_ms).max(0.0) / 1000.0) as f32
    }

    /// Refresh the spawning flag against the grace period
    pub fn update_spawning(&mut self, now_ms: f64, grace_ms: f64) {
        self.spawning = self.archetype.is_enemy() && now_ms - self.born_ms < grace_ms;
    }

    /// Fraction of the spawn animation completed, in [0, 1]
    pub fn spawn_phase(&self, now_ms: f64, grace_ms: f64) -> f32 {
        if grace_ms <= 0.0 || !self.archetype.is_enemy() {
            1.0
        } else {
            (((now_ms - self.born_ms) / grace_ms).clamp(0.0, 1.0)) as f32
        }
    }

    /// Accelerate along `dir`, capped at the speed limit
    pub fn propel(&mut self, dir: Vec2, dt: f32) {
        self.velocity += dir * self.acceleration * (dt * 1000.0) * self.friction;
        self.velocity = self.velocity.clamp_length_max(self.speed);
    }

    /// Decay the velocity, stopping entities that have nearly come to rest
    #[inline]
    pub fn apply_friction(&mut self) {
        self.velocity *= self.friction;
        if self.velocity.length() < STOP_SPEED {
            self.velocity = Vec2::ZERO;
        }
    }

    /// Apply friction, move, and keep inside the arena `[-half, half]`
    pub fn integrate(&mut self, dt: f32, half: Vec2) {
        self.apply_friction();
        self.origin += self.velocity * dt;
        let (origin, velocity) = clamp_to_arena(self.origin, self.velocity, half, self.bounce);
        self.origin = origin;
        self.velocity = velocity;
    }

    /// Turn to face `dir`; zero-length input keeps the current facing
    #[inline]
    pub fn face(&mut self, dir: Vec2) {
        self.orientation = unit_or(dir, self.orientation);
    }

    pub fn kill(&mut self, now_ms: f64) {
        if self.alive {
            self.alive = false;
            self.death_ms = Some(now_ms);
            self.velocity = Vec2::ZERO;
        }
    }

    /// Apply damage; returns true if this blow killed the entity
    pub fn damage(&mut self, amount: i32, now_ms: f64) -> bool {
        if !self.alive || amount <= 0 {
            return false;
        }
        self.hp -= amount;
        if let ArchetypeState::BlackHole { active, .. } = &mut self.state {
            *active = true;
        }
        if self.hp <= 0 {
            self.kill(now_ms);
            true
        } else {
            false
        }
    }

    /// Whether the slot can be zeroed
    pub fn is_removable(&self, now_ms: f64, linger_ms: f64) -> bool {
        match self.death_ms {
            Some(died) if !self.alive => now_ms - died >= linger_ms,
            _ => self.expiry_ms.is_some_and(|expiry| now_ms >= expiry),
        }
    }

    /// Interacts with bullets and the player this tick
    #[inline]
    pub fn is_solid(&self) -> bool {
        self.alive && !self.spawning
    }

    pub fn is_black_hole_active(&self) -> bool {
        matches!(self.state, ArchetypeState::BlackHole { active: true, .. })
    }

    /// Gate collision segment (`±radius` along the orientation)
    pub fn gate_segment(&self) -> (Vec2, Vec2) {
        let half = self.orientation * self.radius;
        (self.origin - half, self.origin + half)
    }

    /// Snake tail, empty for every other archetype
    pub fn tail(&self) -> &[TailSegment] {
        match &self.state {
            ArchetypeState::Snek { tail, .. } => tail,
            _ => &[],
        }
    }

    /// Point behind the head that the first tail segment follows
    pub fn back(&self) -> Vec2 {
        self.origin - self.orientation * self.radius
    }
}

/// Clamp a point to `[-half, half]`, reflecting the velocity component that
/// crossed the boundary when `bounce` is set.
pub fn clamp_to_arena(origin: Vec2, velocity: Vec2, half: Vec2, bounce: bool) -> (Vec2, Vec2) {
    let clamped = origin.clamp(-half, half);
    let mut velocity = velocity;
    if bounce {
        if clamped.x != origin.x {
            velocity.x = -velocity.x;
        }
        if clamped.y != origin.y {
            velocity.y = -velocity.y;
        }
    }
    (clamped, velocity)
}
