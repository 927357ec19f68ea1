//! Warp grid: a lattice of point masses joined by one-sided damped springs
//!
//! Free nodes and their fixed anchors share one node array: indices
//! `0..cols*rows` are the free lattice, the next `cols*rows` are anchors with
//! zero inverse mass. Springs reference nodes by index.

use glam::{Vec2, Vec3};

/// Velocity magnitude squared below which a node is considered at rest
const REST_VELOCITY_SQ: f32 = 1e-6;
/// Damping restored to every node after each update
const BASE_DAMPING: f32 = 0.98;
/// Damping multiplier applied by implosive/explosive forces
const FORCE_DAMPING: f32 = 0.6;

/// A grid node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointMass {
    pub origin: Vec3,
    pub velocity: Vec3,
    pub acceleration: Vec3,
    /// Zero means anchored: forces have no effect
    pub inverse_mass: f32,
    /// Per-tick velocity multiplier
    pub damping: f32,
}

impl PointMass {
    pub fn new(origin: Vec3, inverse_mass: f32) -> Self {
        Self {
            origin,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            inverse_mass,
            damping: BASE_DAMPING,
        }
    }

    #[inline]
    pub fn apply_force(&mut self, force: Vec3) {
        self.acceleration += force * self.inverse_mass;
    }

    #[inline]
    pub fn increase_damping(&mut self, factor: f32) {
        self.damping *= factor;
    }

    /// Symplectic Euler step
    pub fn update(&mut self) {
        self.velocity += self.acceleration;
        self.origin += self.velocity;
        self.acceleration = Vec3::ZERO;
        if self.velocity.length_squared() < REST_VELOCITY_SQ {
            self.velocity = Vec3::ZERO;
        }
        self.velocity *= self.damping;
        self.damping = BASE_DAMPING;
    }
}

/// A spring that only pulls when stretched past its target length
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    pub end1: usize,
    pub end2: usize,
    pub target_length: f32,
    pub stiffness: f32,
    pub damping: f32,
}

impl Spring {
    /// Force to apply to `end2` (the negation goes to `end1`), or `None`
    /// when the spring is slack.
    pub fn force(&self, end1: &PointMass, end2: &PointMass) -> Option<Vec3> {
        let x = end1.origin - end2.origin;
        let length = x.length();
        if length <= self.target_length {
            return None;
        }
        let stretch = (x / length) * (length - self.target_length);
        let dv = end2.velocity - end1.velocity;
        Some(stretch * self.stiffness - dv * self.damping)
    }
}

/// The warp grid
#[derive(Debug, Clone)]
pub struct Grid {
    cols: usize,
    rows: usize,
    spacing: f32,
    nodes: Vec<PointMass>,
    springs: Vec<Spring>,
}

impl Grid {
    /// Spring constants between lattice neighbours
    pub const LINK_STIFFNESS: f32 = 0.28;
    pub const LINK_DAMPING: f32 = 0.06;
    /// Border nodes are held by a stiff anchor spring
    pub const BORDER_STIFFNESS: f32 = 0.1;
    pub const BORDER_DAMPING: f32 = 0.1;
    /// Every third interior node is held by a weak anchor spring
    pub const WEAK_STIFFNESS: f32 = 0.002;
    pub const WEAK_DAMPING: f32 = 0.002;
    /// Springs rest at this fraction of the construction distance
    pub const SLACK: f32 = 0.95;

    /// Build a lattice covering the rectangle `[min, max]`
    pub fn new(min: Vec2, max: Vec2, spacing: f32) -> Self {
        let spacing = spacing.max(1.0);
        let size = (max - min).max(Vec2::ZERO);
        let cols = (size.x / spacing) as usize + 1;
        let rows = (size.y / spacing) as usize + 1;
        let count = cols * rows;

        let mut nodes = Vec::with_capacity(count * 2);
        for y in 0..rows {
            for x in 0..cols {
                let p = Vec3::new(min.x + x as f32 * spacing, min.y + y as f32 * spacing, 0.0);
                nodes.push(PointMass::new(p, 1.0));
            }
        }
        for i in 0..count {
            nodes.push(PointMass::new(nodes[i].origin, 0.0));
        }

        let mut grid = Self {
            cols,
            rows,
            spacing,
            nodes,
            springs: Vec::with_capacity(count * 3),
        };

        for y in 0..rows {
            for x in 0..cols {
                let i = grid.index(x, y);
                let anchor = count + i;
                if x == 0 || y == 0 || x == cols - 1 || y == rows - 1 {
                    grid.link(anchor, i, Self::BORDER_STIFFNESS, Self::BORDER_DAMPING);
                } else if x % 3 == 0 && y % 3 == 0 {
                    grid.link(anchor, i, Self::WEAK_STIFFNESS, Self::WEAK_DAMPING);
                }
                if x > 0 {
                    let left = grid.index(x - 1, y);
                    grid.link(left, i, Self::LINK_STIFFNESS, Self::LINK_DAMPING);
                }
                if y > 0 {
                    let up = grid.index(x, y - 1);
                    grid.link(up, i, Self::LINK_STIFFNESS, Self::LINK_DAMPING);
                }
            }
        }

        log::debug!(
            "warp grid {}x{} ({} springs, spacing {})",
            cols,
            rows,
            grid.springs.len(),
            spacing
        );
        grid
    }

    fn link(&mut self, end1: usize, end2: usize, stiffness: f32, damping: f32) {
        let distance = self.nodes[end1].origin.distance(self.nodes[end2].origin);
        self.springs.push(Spring {
            end1,
            end2,
            target_length: distance * Self::SLACK,
            stiffness,
            damping,
        });
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.cols + x
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    /// Free lattice node at column `x`, row `y`
    pub fn point(&self, x: usize, y: usize) -> Option<&PointMass> {
        if x < self.cols && y < self.rows {
            self.nodes.get(self.index(x, y))
        } else {
            None
        }
    }

    /// Free lattice nodes in row-major order
    pub fn points(&self) -> &[PointMass] {
        &self.nodes[..self.cols * self.rows]
    }

    /// Fixed anchors, parallel to [`Grid::points`]
    pub fn anchors(&self) -> &[PointMass] {
        &self.nodes[self.cols * self.rows..]
    }

    pub fn springs(&self) -> &[Spring] {
        &self.springs
    }

    /// Push every node within `radius` of `origin` by `force * 10 / (d + 10)`
    pub fn apply_directed_force(&mut self, force: Vec3, origin: Vec3, radius: f32) {
        if radius <= 0.0 {
            return;
        }
        let radius_sq = radius * radius;
        for node in &mut self.nodes {
            let dist_sq = origin.distance_squared(node.origin);
            if dist_sq < radius_sq {
                node.apply_force(force * 10.0 / (dist_sq.sqrt() + 10.0));
            }
        }
    }

    /// Pull nodes within `radius` toward `origin`
    pub fn apply_implosive_force(&mut self, force: f32, origin: Vec3, radius: f32) {
        if radius <= 0.0 {
            return;
        }
        let radius_sq = radius * radius;
        for node in &mut self.nodes {
            let dist_sq = origin.distance_squared(node.origin);
            if dist_sq < radius_sq {
                node.apply_force((origin - node.origin) * 10.0 * force / (100.0 + dist_sq));
                node.increase_damping(FORCE_DAMPING);
            }
        }
    }

    /// Push nodes within `radius` away from `origin`
    pub fn apply_explosive_force(&mut self, force: f32, origin: Vec3, radius: f32) {
        if radius <= 0.0 {
            return;
        }
        let radius_sq = radius * radius;
        for node in &mut self.nodes {
            let dist_sq = origin.distance_squared(node.origin);
            if dist_sq < radius_sq {
                node.apply_force((node.origin - origin) * 100.0 * force / (10_000.0 + dist_sq));
                node.increase_damping(FORCE_DAMPING);
            }
        }
    }

    /// Advance springs, then nodes
    pub fn update(&mut self) {
        for spring in &self.springs {
            let (a, b) = (self.nodes[spring.end1], self.nodes[spring.end2]);
            if let Some(force) = spring.force(&a, &b) {
                self.nodes[spring.end1].apply_force(-force);
                self.nodes[spring.end2].apply_force(force);
            }
        }
        for node in &mut self.nodes {
            node.update();
        }
    }

    /// Free nodes projected to 2D with a simple perspective on `z`
    pub fn projected(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.points().iter().map(|p| project(p.origin))
    }
}

/// Perspective projection used for rendering grid nodes
#[inline]
pub fn project(p: Vec3) -> Vec2 {
    let factor = (p.z + 2000.0) / 2000.0;
    Vec2::new(p.x, p.y) * factor
}
