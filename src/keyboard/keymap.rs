//! Key identifiers and scancode translation
//!
//! Every input source reports keys by a stable physical identifier such as
//! `KeyA` or `ShiftLeft`, independent of the label printed on the keycap.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Stable identifier of a physical key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyId(String);

impl KeyId {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Translate a Linux evdev scancode.
    ///
    /// Scancodes missing from the table still get a stable identifier
    /// (`Scancode<N>`) so OEM keys are tracked like any other key.
    pub fn from_scancode(scancode: u16) -> Self {
        match SCANCODES.get(&scancode) {
            Some(code) => Self::new(*code),
            None => Self(format!("Scancode{}", scancode)),
        }
    }

    /// Translate a `device_query` keycode, if it is a key we know about
    pub fn from_keycode(keycode: device_query::Keycode) -> Option<Self> {
        code_for_keycode(keycode).map(Self::new)
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for KeyId {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<String> for KeyId {
    fn from(code: String) -> Self {
        Self(code)
    }
}

impl AsRef<str> for KeyId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn code_for_keycode(keycode: device_query::Keycode) -> Option<&'static str> {
    use device_query::Keycode as DK;
    let code = match keycode {
        DK::Escape => "Escape",
        DK::F1 => "F1",
        DK::F2 => "F2",
        DK::F3 => "F3",
        DK::F4 => "F4",
        DK::F5 => "F5",
        DK::F6 => "F6",
        DK::F7 => "F7",
        DK::F8 => "F8",
        DK::F9 => "F9",
        DK::F10 => "F10",
        DK::F11 => "F11",
        DK::F12 => "F12",
        DK::Grave => "Backquote",
        DK::Key1 => "Digit1",
        DK::Key2 => "Digit2",
        DK::Key3 => "Digit3",
        DK::Key4 => "Digit4",
        DK::Key5 => "Digit5",
        DK::Key6 => "Digit6",
        DK::Key7 => "Digit7",
        DK::Key8 => "Digit8",
        DK::Key9 => "Digit9",
        DK::Key0 => "Digit0",
        DK::Minus => "Minus",
        DK::Equal => "Equal",
        DK::Backspace => "Backspace",
        DK::Tab => "Tab",
        DK::Q => "KeyQ",
        DK::W => "KeyW",
        DK::E => "KeyE",
        DK::R => "KeyR",
        DK::T => "KeyT",
        DK::Y => "KeyY",
        DK::U => "KeyU",
        DK::I => "KeyI",
        DK::O => "KeyO",
        DK::P => "KeyP",
        DK::LeftBracket => "BracketLeft",
        DK::RightBracket => "BracketRight",
        DK::BackSlash => "Backslash",
        DK::CapsLock => "CapsLock",
        DK::A => "KeyA",
        DK::S => "KeyS",
        DK::D => "KeyD",
        DK::F => "KeyF",
        DK::G => "KeyG",
        DK::H => "KeyH",
        DK::J => "KeyJ",
        DK::K => "KeyK",
        DK::L => "KeyL",
        DK::Semicolon => "Semicolon",
        DK::Apostrophe => "Quote",
        DK::Enter => "Enter",
        DK::LShift => "ShiftLeft",
        DK::Z => "KeyZ",
        DK::X => "KeyX",
        DK::C => "KeyC",
        DK::V => "KeyV",
        DK::B => "KeyB",
        DK::N => "KeyN",
        DK::M => "KeyM",
        DK::Comma => "Comma",
        DK::Dot => "Period",
        DK::Slash => "Slash",
        DK::RShift => "ShiftRight",
        DK::LControl => "ControlLeft",
        DK::LMeta => "MetaLeft",
        DK::LAlt => "AltLeft",
        DK::Space => "Space",
        DK::RAlt => "AltRight",
        DK::RMeta => "MetaRight",
        DK::RControl => "ControlRight",
        DK::Insert => "Insert",
        DK::Home => "Home",
        DK::PageUp => "PageUp",
        DK::Delete => "Delete",
        DK::End => "End",
        DK::PageDown => "PageDown",
        DK::Up => "ArrowUp",
        DK::Left => "ArrowLeft",
        DK::Down => "ArrowDown",
        DK::Right => "ArrowRight",
        DK::Numpad0 => "Numpad0",
        DK::Numpad1 => "Numpad1",
        DK::Numpad2 => "Numpad2",
        DK::Numpad3 => "Numpad3",
        DK::Numpad4 => "Numpad4",
        DK::Numpad5 => "Numpad5",
        DK::Numpad6 => "Numpad6",
        DK::Numpad7 => "Numpad7",
        DK::Numpad8 => "Numpad8",
        DK::Numpad9 => "Numpad9",
        DK::NumpadSubtract => "NumpadSubtract",
        DK::NumpadAdd => "NumpadAdd",
        DK::NumpadDivide => "NumpadDivide",
        DK::NumpadMultiply => "NumpadMultiply",
        _ => return None,
    };
    Some(code)
}

/// Linux evdev scancode to key identifier
pub static SCANCODES: LazyLock<HashMap<u16, &'static str>> = LazyLock::new(|| {
    let entries: &[(u16, &'static str)] = &[
        // Function row
        (1, "Escape"),
        (59, "F1"),
        (60, "F2"),
        (61, "F3"),
        (62, "F4"),
        (63, "F5"),
        (64, "F6"),
        (65, "F7"),
        (66, "F8"),
        (67, "F9"),
        (68, "F10"),
        (87, "F11"),
        (88, "F12"),
        (99, "PrintScreen"),
        (70, "ScrollLock"),
        (119, "Pause"),
        // Number row
        (41, "Backquote"),
        (2, "Digit1"),
        (3, "Digit2"),
        (4, "Digit3"),
        (5, "Digit4"),
        (6, "Digit5"),
        (7, "Digit6"),
        (8, "Digit7"),
        (9, "Digit8"),
        (10, "Digit9"),
        (11, "Digit0"),
        (12, "Minus"),
        (13, "Equal"),
        (14, "Backspace"),
        // Top letter row
        (15, "Tab"),
        (16, "KeyQ"),
        (17, "KeyW"),
        (18, "KeyE"),
        (19, "KeyR"),
        (20, "KeyT"),
        (21, "KeyY"),
        (22, "KeyU"),
        (23, "KeyI"),
        (24, "KeyO"),
        (25, "KeyP"),
        (26, "BracketLeft"),
        (27, "BracketRight"),
        (43, "Backslash"),
        // Home row
        (58, "CapsLock"),
        (30, "KeyA"),
        (31, "KeyS"),
        (32, "KeyD"),
        (33, "KeyF"),
        (34, "KeyG"),
        (35, "KeyH"),
        (36, "KeyJ"),
        (37, "KeyK"),
        (38, "KeyL"),
        (39, "Semicolon"),
        (40, "Quote"),
        (28, "Enter"),
        // Bottom letter row
        (42, "ShiftLeft"),
        (86, "IntlBackslash"),
        (44, "KeyZ"),
        (45, "KeyX"),
        (46, "KeyC"),
        (47, "KeyV"),
        (48, "KeyB"),
        (49, "KeyN"),
        (50, "KeyM"),
        (51, "Comma"),
        (52, "Period"),
        (53, "Slash"),
        (54, "ShiftRight"),
        // Modifiers and space
        (29, "ControlLeft"),
        (125, "MetaLeft"),
        (56, "AltLeft"),
        (57, "Space"),
        (100, "AltRight"),
        (126, "MetaRight"),
        (127, "ContextMenu"),
        (97, "ControlRight"),
        // Navigation cluster
        (110, "Insert"),
        (102, "Home"),
        (104, "PageUp"),
        (111, "Delete"),
        (107, "End"),
        (109, "PageDown"),
        (103, "ArrowUp"),
        (105, "ArrowLeft"),
        (108, "ArrowDown"),
        (106, "ArrowRight"),
        // Numpad
        (69, "NumLock"),
        (98, "NumpadDivide"),
        (55, "NumpadMultiply"),
        (74, "NumpadSubtract"),
        (71, "Numpad7"),
        (72, "Numpad8"),
        (73, "Numpad9"),
        (78, "NumpadAdd"),
        (75, "Numpad4"),
        (76, "Numpad5"),
        (77, "Numpad6"),
        (79, "Numpad1"),
        (80, "Numpad2"),
        (81, "Numpad3"),
        (96, "NumpadEnter"),
        (82, "Numpad0"),
        (83, "NumpadDecimal"),
    ];
    entries.iter().copied().collect()
});
