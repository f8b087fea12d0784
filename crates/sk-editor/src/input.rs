//! Input abstraction layer.
//!
//! Normalizes pointer, keyboard and focus events from the host into a
//! unified `InputEvent` enum consumed by the interaction machine.

/// Modifier keys held during an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ..Modifiers::NONE
    };

    /// ⌘ on macOS, Ctrl elsewhere.
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }

    /// Whether a click should toggle membership instead of replacing the
    /// selection.
    pub fn multi_select(self) -> bool {
        self.shift || self.ctrl || self.meta
    }
}

/// A normalized input event in canvas coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown { x: f32, y: f32, modifiers: Modifiers },
    PointerMove { x: f32, y: f32, modifiers: Modifiers },
    PointerUp { x: f32, y: f32, modifiers: Modifiers },
    /// Pointer left the canvas mid-gesture.
    PointerLeave,
    DoubleClick { x: f32, y: f32 },
    /// `key` is the host's key name (`"a"`, `"Delete"`, `"ArrowLeft"`).
    Key { key: String, modifiers: Modifiers },
    /// The canvas lost keyboard focus.
    Blur,
}

impl InputEvent {
    pub fn pointer_down(x: f32, y: f32) -> Self {
        Self::PointerDown {
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn pointer_move(x: f32, y: f32) -> Self {
        Self::PointerMove {
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn pointer_up(x: f32, y: f32) -> Self {
        Self::PointerUp {
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn key(key: impl Into<String>) -> Self {
        Self::Key {
            key: key.into(),
            modifiers: Modifiers::NONE,
        }
    }

    /// Extract the position, snapped to whole canvas pixels, if this is a
    /// positioned event.
    pub fn position(&self) -> Option<(i32, i32)> {
        match self {
            Self::PointerDown { x, y, .. }
            | Self::PointerMove { x, y, .. }
            | Self::PointerUp { x, y, .. }
            | Self::DoubleClick { x, y } => Some((x.round() as i32, y.round() as i32)),
            _ => None,
        }
    }

    pub fn modifiers(&self) -> Modifiers {
        match self {
            Self::PointerDown { modifiers, .. }
            | Self::PointerMove { modifiers, .. }
            | Self::PointerUp { modifiers, .. }
            | Self::Key { modifiers, .. } => *modifiers,
            _ => Modifiers::NONE,
        }
    }
}
