//! Per-tick input snapshot and the player intent derived from it
//!
//! Hosts translate their device events into an [`InputSnapshot`]; the core
//! never reads devices. Key and button names are logical, so a host is free
//! to bind them however it likes.

use std::collections::BTreeSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::GameMode;
use crate::unit_or;

/// Thumbstick magnitude below which input is ignored
pub const STICK_DEAD_ZONE: f32 = 0.2;

/// Logical keyboard keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Key {
    W,
    A,
    S,
    D,
    Up,
    Down,
    Left,
    Right,
    Space,
    Enter,
    Escape,
    Backspace,
    P,
    Q,
}

/// Logical gamepad buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Button {
    South,
    East,
    West,
    North,
    Start,
    Back,
    LeftShoulder,
    RightShoulder,
}

/// Selection made in a host-drawn menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MenuCommand {
    SelectMode(GameMode),
    Story,
    MainMenu,
    Reset,
    Quit,
}

/// Everything the host observed since the previous tick
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputSnapshot {
    /// Keys held down
    pub keys: BTreeSet<Key>,
    /// Keys that went down this frame
    pub keys_pressed: BTreeSet<Key>,
    pub joystick_connected: bool,
    /// Raw stick values in [-1, 1]
    pub left_stick: Vec2,
    pub right_stick: Vec2,
    pub left_trigger: f32,
    pub right_trigger: f32,
    pub mouse_primary: bool,
    pub mouse_secondary: bool,
    /// Cursor in world coordinates
    pub mouse_world: Option<Vec2>,
    /// Buttons that went down this frame
    pub buttons_pressed: BTreeSet<Button>,
    /// Menu selection, if the host's menu produced one
    pub menu: Option<MenuCommand>,
    /// Let the autopilot fly the ship
    pub idle_mode: bool,
}

/// Player intent for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Intent {
    /// Movement direction, length ≤ 1
    pub move_dir: Vec2,
    /// Unit aim direction when firing
    pub aim: Option<Vec2>,
    pub bomb: bool,
    pub pause: bool,
    pub confirm: bool,
    pub cancel: bool,
    pub menu: Option<MenuCommand>,
}

/// Zero a stick inside the dead zone and clamp it to the unit disc
pub fn apply_dead_zone(stick: Vec2) -> Vec2 {
    if stick.length() < STICK_DEAD_ZONE {
        Vec2::ZERO
    } else {
        stick.clamp_length_max(1.0)
    }
}

impl InputSnapshot {
    pub fn held(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }

    pub fn pressed(&self, key: Key) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn button(&self, button: Button) -> bool {
        self.buttons_pressed.contains(&button)
    }

    /// Fold devices into a single intent. `player` is used to turn the
    /// cursor position into an aim direction.
    pub fn intent(&self, player: Vec2) -> Intent {
        Intent {
            move_dir: self.move_dir(),
            aim: self.aim(player),
            bomb: self.pressed(Key::Space)
                || self.button(Button::RightShoulder)
                || self.mouse_secondary,
            pause: self.pressed(Key::P)
                || self.pressed(Key::Escape)
                || self.button(Button::Start),
            confirm: self.pressed(Key::Enter) || self.button(Button::South),
            cancel: self.pressed(Key::Escape)
                || self.pressed(Key::Backspace)
                || self.button(Button::East)
                || self.button(Button::Back),
            menu: self.menu.or_else(|| self.pressed(Key::Q).then_some(MenuCommand::Quit)),
        }
    }

    fn move_dir(&self) -> Vec2 {
        let mut dir = Vec2::ZERO;
        if self.held(Key::W) {
            dir.y += 1.0;
        }
        if self.held(Key::S) {
            dir.y -= 1.0;
        }
        if self.held(Key::D) {
            dir.x += 1.0;
        }
        if self.held(Key::A) {
            dir.x -= 1.0;
        }
        if self.joystick_connected {
            dir += apply_dead_zone(self.left_stick);
        }
        dir.clamp_length_max(1.0)
    }

    fn aim(&self, player: Vec2) -> Option<Vec2> {
        let mut dir = Vec2::ZERO;
        if self.held(Key::Up) {
            dir.y += 1.0;
        }
        if self.held(Key::Down) {
            dir.y -= 1.0;
        }
        if self.held(Key::Right) {
            dir.x += 1.0;
        }
        if self.held(Key::Left) {
            dir.x -= 1.0;
        }
        if self.joystick_connected {
            dir += apply_dead_zone(self.right_stick);
        }
        if dir != Vec2::ZERO {
            return dir.try_normalize();
        }

        match self.mouse_world {
            Some(cursor) if self.mouse_primary => Some(unit_or(cursor - player, Vec2::Y)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(list: &[Key]) -> BTreeSet<Key> {
        list.iter().copied().collect()
    }

    #[test]
    fn test_dead_zone() {
        assert_eq!(apply_dead_zone(Vec2::new(0.1, 0.1)), Vec2::ZERO);
        assert_eq!(apply_dead_zone(Vec2::new(0.5, 0.0)), Vec2::new(0.5, 0.0));
        assert!((apply_dead_zone(Vec2::new(1.0, 1.0)).length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_keyboard_movement_is_clamped() {
        let input = InputSnapshot {
            keys: keys(&[Key::W, Key::D]),
            ..Default::default()
        };
        let intent = input.intent(Vec2::ZERO);
        assert!((intent.move_dir.length() - 1.0).abs() < 1e-6);
        assert!(intent.move_dir.x > 0.0 && intent.move_dir.y > 0.0);
        assert!(intent.aim.is_none());
    }

    #[test]
    fn test_stick_ignored_when_disconnected() {
        let input = InputSnapshot {
            left_stick: Vec2::X,
            ..Default::default()
        };
        assert_eq!(input.intent(Vec2::ZERO).move_dir, Vec2::ZERO);
    }

    #[test]
    fn test_mouse_aim_requires_primary() {
        let mut input = InputSnapshot {
            mouse_world: Some(Vec2::new(100.0, 0.0)),
            ..Default::default()
        };
        assert!(input.intent(Vec2::ZERO).aim.is_none());
        input.mouse_primary = true;
        let aim = input.intent(Vec2::new(0.0, 0.0)).aim;
        assert_eq!(aim, Some(Vec2::X));
    }

    #[test]
    fn test_arrow_keys_override_mouse() {
        let input = InputSnapshot {
            keys: keys(&[Key::Left]),
            mouse_primary: true,
            mouse_world: Some(Vec2::new(100.0, 0.0)),
            ..Default::default()
        };
        assert_eq!(input.intent(Vec2::ZERO).aim, Some(Vec2::NEG_X));
    }

    #[test]
    fn test_bomb_sources() {
        let space = InputSnapshot {
            keys_pressed: keys(&[Key::Space]),
            ..Default::default()
        };
        assert!(space.intent(Vec2::ZERO).bomb);
        let shoulder = InputSnapshot {
            buttons_pressed: [Button::RightShoulder].into_iter().collect(),
            ..Default::default()
        };
        assert!(shoulder.intent(Vec2::ZERO).bomb);
    }

    #[test]
    fn test_quit_key_maps_to_menu_command() {
        let input = InputSnapshot {
            keys_pressed: keys(&[Key::Q]),
            ..Default::default()
        };
        assert_eq!(input.intent(Vec2::ZERO).menu, Some(MenuCommand::Quit));
    }
}
