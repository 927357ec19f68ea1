//! Read-only view of the world handed to the host after each tick
//!
//! Grid nodes and particles are flattened into `Pod` instances a renderer can
//! upload with `bytemuck::cast_slice` without further conversion.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec4};
use serde::Serialize;

use crate::sim::entity::{Archetype, Element};
use crate::sim::grid::project;
use crate::sim::state::{GameData, GamePhase};

/// Projected grid node
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable, Serialize)]
pub struct GridVertex {
    pub position: [f32; 2],
}

/// One particle instance
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable, Serialize)]
pub struct ParticleInstance {
    pub origin: [f32; 2],
    /// Radians
    pub orientation: f32,
    pub scale: [f32; 2],
    pub color: [f32; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityView {
    pub archetype: Archetype,
    pub origin: Vec2,
    pub orientation: Vec2,
    pub radius: f32,
    pub color: Vec4,
    /// Spawn animation progress in [0, 1]
    pub spawn_phase: f32,
    pub hp: i32,
    pub alive: bool,
    /// Bounty shown while a dead entity lingers
    pub bounty: u32,
    pub elements: Vec<Element>,
    /// Snake tail segment centres and radii
    pub tail: Vec<(Vec2, f32)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulletView {
    pub origin: Vec2,
    pub orientation: Vec2,
    pub width: f32,
    pub length: f32,
    pub elements: Vec<Element>,
    /// Seconds since firing
    pub age: f32,
    pub alive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hud {
    pub score: u64,
    pub multiplier: u32,
    pub lives: u32,
    pub bombs: u32,
    pub high_score: u64,
    pub phase: GamePhase,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSnapshot {
    pub camera: Vec2,
    pub grid_cols: usize,
    pub grid_rows: usize,
    /// Row-major projected grid nodes
    pub grid: Vec<GridVertex>,
    pub player: EntityView,
    pub entities: Vec<EntityView>,
    pub bullets: Vec<BulletView>,
    pub particles: Vec<ParticleInstance>,
    pub hud: Hud,
}

impl RenderSnapshot {
    pub fn capture(data: &GameData) -> Self {
        let now = data.clock.now_ms;
        let grace = data.tuning.spawn_grace_ms;
        let view = |e: &crate::sim::entity::Entity, color: Vec4| EntityView {
            archetype: e.archetype,
            origin: e.origin,
            orientation: e.orientation,
            radius: e.radius,
            color,
            spawn_phase: e.spawn_phase(now, grace),
            hp: e.hp,
            alive: e.alive,
            bounty: e.bounty * data.multiplier,
            elements: e.elements.clone(),
            tail: e.tail().iter().map(|s| (s.origin, s.radius)).collect(),
        };

        Self {
            camera: data.camera,
            grid_cols: data.grid.cols(),
            grid_rows: data.grid.rows(),
            grid: data
                .grid
                .points()
                .iter()
                .map(|p| GridVertex {
                    position: project(p.origin).to_array(),
                })
                .collect(),
            player: view(&data.player, data.player_color()),
            entities: data.entities.iter().map(|e| view(e, e.color)).collect(),
            bullets: data
                .bullets
                .iter()
                .map(|b| BulletView {
                    origin: b.origin,
                    orientation: b.orientation,
                    width: b.width,
                    length: b.length,
                    elements: b.elements.clone(),
                    age: b.age(now),
                    alive: b.alive,
                })
                .collect(),
            particles: data
                .particles
                .iter()
                .map(|p| ParticleInstance {
                    origin: p.origin.to_array(),
                    orientation: p.orientation,
                    scale: p.scale.to_array(),
                    color: p.render_color().to_array(),
                })
                .collect(),
            hud: Hud {
                score: data.score,
                multiplier: data.multiplier,
                lives: data.lives,
                bombs: data.bombs,
                high_score: data.high_score.max(data.score),
                phase: data.phase,
            },
        }
    }

    /// Grid nodes as raw bytes for a vertex buffer
    pub fn grid_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.grid)
    }

    /// Particles as raw bytes for an instance buffer
    pub fn particle_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.particles)
    }
}
