//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. Text editing
//! never reaches this map: while a text box is being edited every key goes
//! to its content.

use crate::input::Modifiers;
use sk_core::{ShapeKind, TriangleDirection, ZOrder};

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Tools ──
    /// Arm a shape kind; the next drag on empty canvas creates it.
    Arm(ShapeKind),
    Disarm,

    // ── Edit ──
    Delete,
    SelectAll,
    /// Remove every entity from the canvas.
    ClearCanvas,
    Group,
    Ungroup,
    ToggleLock,
    /// Move the selected shape by one step in the given unit direction.
    Nudge { dx: i32, dy: i32 },

    // ── Z-order ──
    Reorder(ZOrder),

    // ── UI ──
    Deselect,
}

/// Resolves key events into shortcut actions.
///
/// Uses platform-aware modifier detection: on macOS `meta` is ⌘, on other
/// platforms `ctrl` serves the same role.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"r"`, `"Delete"`).
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        let cmd = modifiers.command();

        // ── Modifier combos first (most specific) ──
        if cmd && modifiers.shift {
            return match key {
                "[" | "{" => Some(ShortcutAction::Reorder(ZOrder::SendToBack)),
                "]" | "}" => Some(ShortcutAction::Reorder(ZOrder::BringToFront)),
                "g" | "G" => Some(ShortcutAction::Ungroup),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "a" | "A" => Some(ShortcutAction::SelectAll),
                "g" | "G" => Some(ShortcutAction::Group),
                "l" | "L" => Some(ShortcutAction::ToggleLock),
                "[" => Some(ShortcutAction::Reorder(ZOrder::SendBackward)),
                "]" => Some(ShortcutAction::Reorder(ZOrder::BringForward)),
                "Delete" | "Backspace" => Some(ShortcutAction::ClearCanvas),
                _ => None,
            };
        }

        if let Some((dx, dy)) = arrow(key) {
            return Some(ShortcutAction::Nudge { dx, dy });
        }
        if modifiers.shift || modifiers.alt {
            return None;
        }

        // ── Single keys (no modifiers) ──
        let kind = match key {
            "v" | "V" => return Some(ShortcutAction::Disarm),
            "Delete" | "Backspace" => return Some(ShortcutAction::Delete),
            "Escape" => return Some(ShortcutAction::Deselect),
            "r" | "R" => ShapeKind::Rectangle,
            "u" | "U" => ShapeKind::RoundedRectangle,
            "o" | "O" => ShapeKind::Circle,
            "e" | "E" => ShapeKind::Ellipse,
            "l" | "L" => ShapeKind::Parallelogram,
            "y" | "Y" => ShapeKind::Triangle(TriangleDirection::Up),
            "d" | "D" => ShapeKind::Diamond,
            "h" | "H" => ShapeKind::Hexagon,
            "p" | "P" => ShapeKind::Pentagon,
            "s" | "S" => ShapeKind::Star,
            "i" | "I" => ShapeKind::Image,
            _ => return None,
        };
        Some(ShortcutAction::Arm(kind))
    }
}

fn arrow(key: &str) -> Option<(i32, i32)> {
    match key {
        "ArrowLeft" => Some((-1, 0)),
        "ArrowRight" => Some((1, 0)),
        "ArrowUp" => Some((0, -1)),
        "ArrowDown" => Some((0, 1)),
        _ => None,
    }
}
