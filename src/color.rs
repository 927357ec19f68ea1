//! Color helpers and the game palette

use glam::Vec4;

/// Convert HSV to RGBA (alpha = 1).
///
/// `h` is in degrees and wraps; `s` and `v` are in [0, 1].
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Vec4 {
    if s <= 0.0 {
        return Vec4::new(v, v, v, 1.0);
    }

    let hp = h.rem_euclid(360.0) / 60.0;
    let c = v * s;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    Vec4::new(r + m, g + m, b + m, 1.0)
}

/// Multiply the alpha channel of a color
#[inline]
pub fn with_alpha(color: Vec4, alpha: f32) -> Vec4 {
    Vec4::new(color.x, color.y, color.z, color.w * alpha)
}

/// Colors for game elements
pub mod palette {
    use glam::Vec4;

    pub const PLAYER: Vec4 = Vec4::new(1.0, 1.0, 1.0, 1.0);
    pub const FOLLOWER: Vec4 = Vec4::new(0.2, 0.6, 1.0, 1.0);
    pub const WANDERER: Vec4 = Vec4::new(0.8, 0.2, 1.0, 1.0);
    pub const DODGER: Vec4 = Vec4::new(0.2, 1.0, 0.4, 1.0);
    pub const PINK: Vec4 = Vec4::new(1.0, 0.4, 0.8, 1.0);
    pub const PINK_PLEB: Vec4 = Vec4::new(1.0, 0.6, 0.9, 1.0);
    pub const SNEK: Vec4 = Vec4::new(1.0, 0.9, 0.2, 1.0);
    pub const BUBBLE: Vec4 = Vec4::new(0.4, 0.9, 1.0, 1.0);
    pub const BLACK_HOLE: Vec4 = Vec4::new(1.0, 0.2, 0.1, 1.0);
    pub const REPLICATOR: Vec4 = Vec4::new(1.0, 0.5, 0.1, 1.0);
    pub const GATE: Vec4 = Vec4::new(1.0, 0.8, 0.3, 1.0);
    pub const LIGHT_BLUE: Vec4 = Vec4::new(0.6, 0.85, 1.0, 1.0);
    pub const BULLET: Vec4 = Vec4::new(1.0, 1.0, 0.7, 1.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_zero_saturation_is_grey() {
        assert_eq!(hsv_to_rgb(0.0, 0.0, 0.6), Vec4::new(0.6, 0.6, 0.6, 1.0));
        assert_eq!(hsv_to_rgb(200.0, 0.0, 0.25), Vec4::new(0.25, 0.25, 0.25, 1.0));
    }

    #[test]
    fn test_primary_hues() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), Vec4::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(hsv_to_rgb(120.0, 1.0, 1.0), Vec4::new(0.0, 1.0, 0.0, 1.0));
        assert_eq!(hsv_to_rgb(240.0, 1.0, 1.0), Vec4::new(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn test_segments_meet_at_partition_edges() {
        for edge in 1..=5 {
            let h = edge as f32 * 60.0;
            let below = hsv_to_rgb(h - 0.01, 0.8, 0.9);
            let above = hsv_to_rgb(h + 0.01, 0.8, 0.9);
            assert!(
                (below - above).abs().max_element() < 1e-3,
                "discontinuity at hue sextant {edge}: {below:?} vs {above:?}"
            );
        }
    }

    proptest! {
        #[test]
        fn prop_channels_stay_in_unit_range(h in -720.0f32..720.0, s in 0.0f32..=1.0, v in 0.0f32..=1.0) {
            let c = hsv_to_rgb(h, s, v);
            prop_assert!(c.min_element() >= -1e-5);
            prop_assert!(c.max_element() <= 1.0 + 1e-5);
            prop_assert_eq!(c.w, 1.0);
        }
    }
}
