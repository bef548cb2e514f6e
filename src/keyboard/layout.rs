//! Keyboard layout definitions
//!
//! Provides the static 87-key (tenkeyless) layout drawn by the keyboard
//! visual. The metrics engine does not depend on it: keys outside the layout
//! are still measured, they are just not drawn.

use super::KeyId;
use serde::{Deserialize, Serialize};

/// Label set to show on the keycaps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    #[default]
    Windows,
    MacOS,
}

impl Platform {
    /// Display name for the platform
    pub fn name(&self) -> &'static str {
        match self {
            Self::Windows => "Windows",
            Self::MacOS => "MacOS",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Self::Windows => Self::MacOS,
            Self::MacOS => Self::Windows,
        }
    }
}

/// Code used for empty gaps between key groups
pub const SPACER: &str = "spacer";

/// Key definition for rendering in the keyboard visual
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyDescriptor {
    /// Physical key identifier, or [`SPACER`]
    pub code: &'static str,
    /// Default label
    pub label: &'static str,
    /// Label used on MacOS, when it differs
    pub alt_label: Option<&'static str>,
    /// Width relative to a standard key
    pub width: f32,
}

impl KeyDescriptor {
    const fn key(code: &'static str, label: &'static str) -> Self {
        Self::wide(code, label, 1.0)
    }

    const fn wide(code: &'static str, label: &'static str, width: f32) -> Self {
        Self {
            code,
            label,
            alt_label: None,
            width,
        }
    }

    const fn mac(code: &'static str, label: &'static str, mac: &'static str, width: f32) -> Self {
        Self {
            code,
            label,
            alt_label: Some(mac),
            width,
        }
    }

    const fn gap(width: f32) -> Self {
        Self::wide(SPACER, "", width)
    }

    pub fn is_spacer(&self) -> bool {
        self.code == SPACER
    }

    pub fn key_id(&self) -> KeyId {
        KeyId::new(self.code)
    }

    /// Label to show for the given platform
    pub fn label_for(&self, platform: Platform) -> &'static str {
        match (platform, self.alt_label) {
            (Platform::MacOS, Some(mac)) => mac,
            _ => self.label,
        }
    }
}

pub type Row = &'static [KeyDescriptor];

const FUNCTION_ROW: Row = &[
    KeyDescriptor::key("Escape", "Esc"),
    KeyDescriptor::gap(1.0),
    KeyDescriptor::key("F1", "F1"),
    KeyDescriptor::key("F2", "F2"),
    KeyDescriptor::key("F3", "F3"),
    KeyDescriptor::key("F4", "F4"),
    KeyDescriptor::gap(0.5),
    KeyDescriptor::key("F5", "F5"),
    KeyDescriptor::key("F6", "F6"),
    KeyDescriptor::key("F7", "F7"),
    KeyDescriptor::key("F8", "F8"),
    KeyDescriptor::gap(0.5),
    KeyDescriptor::key("F9", "F9"),
    KeyDescriptor::key("F10", "F10"),
    KeyDescriptor::key("F11", "F11"),
    KeyDescriptor::key("F12", "F12"),
    KeyDescriptor::gap(0.25),
    KeyDescriptor::mac("PrintScreen", "PrtSc", "F13", 1.0),
    KeyDescriptor::mac("ScrollLock", "ScrLk", "F14", 1.0),
    KeyDescriptor::mac("Pause", "Pause", "F15", 1.0),
];

const NUMBER_ROW: Row = &[
    KeyDescriptor::key("Backquote", "`"),
    KeyDescriptor::key("Digit1", "1"),
    KeyDescriptor::key("Digit2", "2"),
    KeyDescriptor::key("Digit3", "3"),
    KeyDescriptor::key("Digit4", "4"),
    KeyDescriptor::key("Digit5", "5"),
    KeyDescriptor::key("Digit6", "6"),
    KeyDescriptor::key("Digit7", "7"),
    KeyDescriptor::key("Digit8", "8"),
    KeyDescriptor::key("Digit9", "9"),
    KeyDescriptor::key("Digit0", "0"),
    KeyDescriptor::key("Minus", "-"),
    KeyDescriptor::key("Equal", "="),
    KeyDescriptor::mac("Backspace", "Bksp", "\u{232B}", 2.0), // ⌫
    KeyDescriptor::gap(0.25),
    KeyDescriptor::mac("Insert", "Ins", "Help", 1.0),
    KeyDescriptor::key("Home", "Home"),
    KeyDescriptor::key("PageUp", "PgUp"),
];

const TOP_ROW: Row = &[
    KeyDescriptor::mac("Tab", "Tab", "\u{21E5}", 1.5), // ⇥
    KeyDescriptor::key("KeyQ", "Q"),
    KeyDescriptor::key("KeyW", "W"),
    KeyDescriptor::key("KeyE", "E"),
    KeyDescriptor::key("KeyR", "R"),
    KeyDescriptor::key("KeyT", "T"),
    KeyDescriptor::key("KeyY", "Y"),
    KeyDescriptor::key("KeyU", "U"),
    KeyDescriptor::key("KeyI", "I"),
    KeyDescriptor::key("KeyO", "O"),
    KeyDescriptor::key("KeyP", "P"),
    KeyDescriptor::key("BracketLeft", "["),
    KeyDescriptor::key("BracketRight", "]"),
    KeyDescriptor::wide("Backslash", "\\", 1.5),
    KeyDescriptor::gap(0.25),
    KeyDescriptor::mac("Delete", "Del", "\u{2326}", 1.0), // ⌦
    KeyDescriptor::key("End", "End"),
    KeyDescriptor::key("PageDown", "PgDn"),
];

const HOME_ROW: Row = &[
    KeyDescriptor::mac("CapsLock", "Caps", "\u{21EA}", 1.75), // ⇪
    KeyDescriptor::key("KeyA", "A"),
    KeyDescriptor::key("KeyS", "S"),
    KeyDescriptor::key("KeyD", "D"),
    KeyDescriptor::key("KeyF", "F"),
    KeyDescriptor::key("KeyG", "G"),
    KeyDescriptor::key("KeyH", "H"),
    KeyDescriptor::key("KeyJ", "J"),
    KeyDescriptor::key("KeyK", "K"),
    KeyDescriptor::key("KeyL", "L"),
    KeyDescriptor::key("Semicolon", ";"),
    KeyDescriptor::key("Quote", "'"),
    KeyDescriptor::mac("Enter", "Enter", "\u{21A9}", 2.25), // ↩
    KeyDescriptor::gap(3.25),
];

const SHIFT_ROW: Row = &[
    KeyDescriptor::mac("ShiftLeft", "Shift", "\u{21E7}", 2.25), // ⇧
    KeyDescriptor::key("KeyZ", "Z"),
    KeyDescriptor::key("KeyX", "X"),
    KeyDescriptor::key("KeyC", "C"),
    KeyDescriptor::key("KeyV", "V"),
    KeyDescriptor::key("KeyB", "B"),
    KeyDescriptor::key("KeyN", "N"),
    KeyDescriptor::key("KeyM", "M"),
    KeyDescriptor::key("Comma", ","),
    KeyDescriptor::key("Period", "."),
    KeyDescriptor::key("Slash", "/"),
    KeyDescriptor::mac("ShiftRight", "Shift", "\u{21E7}", 2.75),
    KeyDescriptor::gap(1.25),
    KeyDescriptor::key("ArrowUp", "\u{2191}"), // ↑
    KeyDescriptor::gap(1.0),
];

const BOTTOM_ROW: Row = &[
    KeyDescriptor::mac("ControlLeft", "Ctrl", "\u{2303}", 1.25), // ⌃
    KeyDescriptor::mac("MetaLeft", "Win", "\u{2318}", 1.25),     // ⌘
    KeyDescriptor::mac("AltLeft", "Alt", "\u{2325}", 1.25),      // ⌥
    KeyDescriptor::wide("Space", "Space", 6.25),
    KeyDescriptor::mac("AltRight", "Alt", "\u{2325}", 1.25),
    KeyDescriptor::mac("MetaRight", "Win", "\u{2318}", 1.25),
    KeyDescriptor::mac("ContextMenu", "Menu", "Fn", 1.25),
    KeyDescriptor::mac("ControlRight", "Ctrl", "\u{2303}", 1.25),
    KeyDescriptor::gap(0.25),
    KeyDescriptor::key("ArrowLeft", "\u{2190}"),  // ←
    KeyDescriptor::key("ArrowDown", "\u{2193}"),  // ↓
    KeyDescriptor::key("ArrowRight", "\u{2192}"), // →
];

/// The tenkeyless layout, top row first
pub static TKL_87: [Row; 6] = [
    FUNCTION_ROW,
    NUMBER_ROW,
    TOP_ROW,
    HOME_ROW,
    SHIFT_ROW,
    BOTTOM_ROW,
];

/// All drawable keys of the layout, in row order
pub fn layout_keys() -> impl Iterator<Item = &'static KeyDescriptor> {
    TKL_87.iter().flat_map(|row| row.iter()).filter(|k| !k.is_spacer())
}

/// Number of real keys in the layout
pub fn layout_key_count() -> usize {
    layout_keys().count()
}

/// Find the descriptor for a key identifier
pub fn find_key(id: &KeyId) -> Option<&'static KeyDescriptor> {
    layout_keys().find(|k| k.code == id.as_str())
}

/// Total relative width of a row, spacers included
pub fn row_units(row: &[KeyDescriptor]) -> f32 {
    row.iter().map(|k| k.width).sum()
}
