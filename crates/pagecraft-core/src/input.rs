//! Input event types for pointer and wheel handling.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Cmd on macOS.
    pub fn zoom_held(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Wheel / trackpad scroll event in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelEvent {
    pub position: Point,
    /// Scroll amount; positive `y` scrolls down.
    pub delta: Vec2,
    pub modifiers: Modifiers,
}

impl WheelEvent {
    pub fn new(position: Point, delta: Vec2) -> Self {
        Self {
            position,
            delta,
            modifiers: Modifiers::default(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Pointer event in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point, button: MouseButton },
    Move { position: Point },
    Up { position: Point, button: MouseButton },
    /// Pointer capture lost without a matching up (left the window, focus lost).
    Cancel,
    Wheel(WheelEvent),
}

impl PointerEvent {
    /// Screen position carried by the event, if any.
    pub fn position(&self) -> Option<Point> {
        match self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Move { position }
            | PointerEvent::Up { position, .. } => Some(*position),
            PointerEvent::Wheel(wheel) => Some(wheel.position),
            PointerEvent::Cancel => None,
        }
    }
}
