//! Autopilot for the attract mode and idle hosts
//!
//! Wanders toward random points, backs away from enemies that get close and
//! fires at the nearest enemy in range.

use glam::Vec2;

use super::input::Intent;
use super::state::GameData;
use crate::unit_or;

/// Enemies closer than this are fled from
const FLEE_RANGE: f32 = 150.0;
/// Enemies closer than this are shot at
const FIRE_RANGE: f32 = 400.0;
/// Distance at which a wander target counts as reached
const ARRIVE_RANGE: f32 = 20.0;

/// Produce the AI pilot's intent, updating its wander target
pub fn intent(data: &mut GameData) -> Intent {
    let player = data.player.origin;

    let mut flee = Vec2::ZERO;
    let mut nearest: Option<(f32, Vec2)> = None;
    for e in data.entities.iter() {
        if !e.alive || !e.archetype.is_enemy() {
            continue;
        }
        let offset = e.origin - player;
        let d = offset.length();
        if d < FLEE_RANGE {
            flee -= unit_or(offset, Vec2::X) * (1.0 - d / FLEE_RANGE);
        }
        if d < FIRE_RANGE && nearest.is_none_or(|(best, _)| d < best) {
            nearest = Some((d, offset));
        }
    }

    let move_dir = if flee != Vec2::ZERO {
        data.ai_target = None;
        unit_or(flee, Vec2::Y)
    } else {
        let reached = data
            .ai_target
            .is_none_or(|t| t.distance(player) < ARRIVE_RANGE);
        if reached {
            let half = data.half() * 0.8;
            data.ai_target = Some(data.rng.point_in(half));
        }
        data.ai_target
            .map_or(Vec2::ZERO, |t| unit_or(t - player, Vec2::ZERO))
    };

    Intent {
        move_dir,
        aim: nearest.map(|(_, offset)| unit_or(offset, data.aim)),
        ..Intent::default()
    }
}
