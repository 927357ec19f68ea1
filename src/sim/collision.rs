//! Collision detection and same-kind separation
//!
//! Everything is a circle except the gate, which collides as a line segment
//! `±radius` along its orientation. Snake tails are a chain of circles that
//! block bullets but never take damage.

use std::collections::BTreeMap;

use glam::Vec2;

use super::entity::{clamp_to_arena, Archetype, Entity};
use super::pool::Pool;
use crate::unit_or;

/// Do two circles overlap (touching does not count)
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let reach = ra + rb;
    a.distance_squared(b) < reach * reach
}

/// Closest point to `p` on the segment `a..b`
pub fn closest_point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Does the segment `a..b` intersect the circle
pub fn segment_circle(a: Vec2, b: Vec2, center: Vec2, radius: f32) -> bool {
    closest_point_on_segment(center, a, b).distance_squared(center) < radius * radius
}

/// Does the entity's body (not its tail) touch the circle
pub fn entity_hits_circle(e: &Entity, center: Vec2, radius: f32) -> bool {
    match e.archetype {
        Archetype::Gate => {
            let (a, b) = e.gate_segment();
            segment_circle(a, b, center, radius)
        }
        _ => circles_overlap(e.origin, e.radius, center, radius),
    }
}

/// Does any tail segment touch the circle
pub fn tail_hits_circle(e: &Entity, center: Vec2, radius: f32) -> bool {
    e.tail()
        .iter()
        .any(|s| circles_overlap(s.origin, s.radius, center, radius))
}

/// Relaxation passes before the separation gives up on a pile-up
const SEPARATION_PASSES: usize = 64;
/// Overlap below this counts as resolved
const SEPARATION_SLOP: f32 = 1e-3;

/// Push overlapping same-archetype entities apart.
///
/// Each overlapping pair is pushed apart by half the overlap each, and the
/// sweep repeats until no pair in any group overlaps (or the pass limit is
/// hit). Archetypes that overlap freely are skipped. Returns the number of
/// pushes applied.
pub fn separate(entities: &mut Pool<Entity>, half: Vec2) -> usize {
    let mut groups: BTreeMap<Archetype, Vec<usize>> = BTreeMap::new();
    for (i, e) in entities.indexed() {
        if e.alive && !e.archetype.overlaps_freely() {
            groups.entry(e.archetype).or_default().push(i);
        }
    }

    let mut pushes = 0;
    for members in groups.values() {
        for _ in 0..SEPARATION_PASSES {
            let mut moved = false;
            for (n, &i) in members.iter().enumerate() {
                for &j in &members[n + 1..] {
                    let Some((a, b)) = entities.pair_mut(i, j) else {
                        continue;
                    };
                    let offset = a.origin - b.origin;
                    let overlap = a.collider_radius + b.collider_radius - offset.length();
                    if overlap <= SEPARATION_SLOP {
                        continue;
                    }
                    let push = unit_or(offset, Vec2::X) * (overlap * 0.5);
                    nudge(a, push, half);
                    nudge(b, -push, half);
                    moved = true;
                    pushes += 1;
                }
            }
            if !moved {
                break;
            }
        }
    }
    pushes
}

fn nudge(e: &mut Entity, push: Vec2, half: Vec2) {
    let (origin, velocity) = clamp_to_arena(e.origin + push, e.velocity, half, false);
    e.origin = origin;
    e.velocity = velocity;
}

/// Deepest overlap between two separable same-archetype entities
#[cfg(test)]
pub(crate) fn worst_overlap(entities: &Pool<Entity>) -> f32 {
    let live: Vec<&Entity> = entities
        .iter()
        .filter(|e| e.alive && !e.archetype.overlaps_freely())
        .collect();
    let mut worst = 0.0f32;
    for (n, a) in live.iter().enumerate() {
        for b in live[n + 1..].iter().filter(|b| b.archetype == a.archetype) {
            let overlap = a.collider_radius + b.collider_radius - a.origin.distance(b.origin);
            worst = worst.max(overlap);
        }
    }
    worst
}
