//! Pointer and keyboard input types.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Key name that forces panning while held.
pub const PAN_KEY: &str = "Space";

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// Device a pointer event came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    #[default]
    Mouse,
    Pen,
    Touch,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// One pointer sample in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerInput {
    pub pointer_id: u64,
    #[serde(default)]
    pub kind: PointerKind,
    #[serde(default)]
    pub button: MouseButton,
    #[serde(default)]
    pub modifiers: Modifiers,
    pub position: Point,
}

impl PointerInput {
    /// Primary mouse button press from pointer 1.
    pub fn mouse(position: Point) -> Self {
        Self {
            pointer_id: 1,
            kind: PointerKind::Mouse,
            button: MouseButton::Left,
            modifiers: Modifiers::default(),
            position,
        }
    }

    pub fn touch(pointer_id: u64, position: Point) -> Self {
        Self {
            pointer_id,
            kind: PointerKind::Touch,
            button: MouseButton::Left,
            modifiers: Modifiers::default(),
            position,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn at(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    pub fn is_touch(&self) -> bool {
        self.kind == PointerKind::Touch
    }
}

/// Keyboard event type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyEvent {
    Pressed(String),
    Released(String),
}

/// Held keys and modifiers between events.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pressed_keys: HashSet<String>,
    /// Current modifier keys state.
    pub modifiers: Modifiers,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a keyboard event.
    pub fn handle_key_event(&mut self, event: KeyEvent) {
        match event {
            KeyEvent::Pressed(key) => {
                self.pressed_keys.insert(key);
            }
            KeyEvent::Released(key) => {
                self.pressed_keys.remove(&key);
            }
        }
    }

    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    pub fn is_key_pressed(&self, key: &str) -> bool {
        self.pressed_keys.contains(key)
    }

    /// Whether the pan key is held.
    pub fn forces_pan(&self) -> bool {
        self.is_key_pressed(PAN_KEY)
    }

    /// Forget held keys, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.pressed_keys.clear();
        self.modifiers = Modifiers::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_press() {
        let mut input = InputState::new();
        input.handle_key_event(KeyEvent::Pressed("a".to_string()));
        assert!(input.is_key_pressed("a"));
        assert!(!input.is_key_pressed("b"));
        input.handle_key_event(KeyEvent::Released("a".to_string()));
        assert!(!input.is_key_pressed("a"));
    }

    #[test]
    fn test_space_forces_pan() {
        let mut input = InputState::new();
        assert!(!input.forces_pan());
        input.handle_key_event(KeyEvent::Pressed(PAN_KEY.to_string()));
        assert!(input.forces_pan());
        input.release_all();
        assert!(!input.forces_pan());
    }

    #[test]
    fn test_pointer_input_defaults_from_json() {
        let input: PointerInput = serde_json::from_value(serde_json::json!({
            "pointerId": 7,
            "position": { "x": 1.0, "y": 2.0 }
        }))
        .unwrap();
        assert_eq!(input.kind, PointerKind::Mouse);
        assert_eq!(input.button, MouseButton::Left);
        assert!(!input.modifiers.shift);
    }
}
