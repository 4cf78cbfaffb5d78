//! Unified input events
//!
//! Mouse, touch and pen all arrive as pointer events; the keyboard is reduced
//! to a handful of game keys. Only `session::handle_input` consumes these.

use glam::Vec2;

/// Keys the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    /// Hold to draw, release to loose (Space)
    Charge,
    /// Loose immediately (Enter)
    QuickFire,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_dom_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" | "a" | "A" => Some(Key::Left),
            "ArrowRight" | "d" | "D" => Some(Key::Right),
            "ArrowUp" | "w" | "W" => Some(Key::Up),
            "ArrowDown" | "s" | "S" => Some(Key::Down),
            " " | "Spacebar" => Some(Key::Charge),
            "Enter" => Some(Key::QuickFire),
            _ => None,
        }
    }

    /// Aim nudge direction for arrow keys (y up)
    pub fn aim_direction(self) -> Option<Vec2> {
        match self {
            Key::Left => Some(Vec2::NEG_X),
            Key::Right => Some(Vec2::X),
            Key::Up => Some(Vec2::Y),
            Key::Down => Some(Vec2::NEG_Y),
            Key::Charge | Key::QuickFire => None,
        }
    }
}

/// One input event, positions already in game coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown { pos: Vec2 },
    PointerMove { pos: Vec2 },
    PointerUp,
    /// Pointer left the play surface
    PointerLeave,
    /// `repeat` is set for auto-repeated presses of a held key
    KeyDown { key: Key, repeat: bool },
    KeyUp { key: Key },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dom_key_mapping() {
        assert_eq!(Key::from_dom_key(" "), Some(Key::Charge));
        assert_eq!(Key::from_dom_key("Enter"), Some(Key::QuickFire));
        assert_eq!(Key::from_dom_key("ArrowLeft"), Some(Key::Left));
        assert_eq!(Key::from_dom_key("W"), Some(Key::Up));
        assert_eq!(Key::from_dom_key("Escape"), None);
    }

    #[test]
    fn test_only_arrows_nudge_aim() {
        assert_eq!(Key::Up.aim_direction(), Some(Vec2::Y));
        assert_eq!(Key::Charge.aim_direction(), None);
        assert_eq!(Key::QuickFire.aim_direction(), None);
    }
}
