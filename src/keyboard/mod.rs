//! Keyboard event handling and state management

mod engine;
mod event;
pub mod keymap;
pub mod layout;
mod state;

#[cfg(target_os = "linux")]
pub mod evdev_listener;

pub use engine::{KeyDown, MetricsEngine};
pub use event::{KeyEvent, KeyEventType, KeyboardListener, Millis, SessionClock};
pub use keymap::KeyId;
pub use layout::{KeyDescriptor, Platform};
pub use state::{KeyStats, KeyStatus, KeyboardState};

#[cfg(target_os = "linux")]
pub use evdev_listener::{evdev_status, EvdevError, EvdevListener};
