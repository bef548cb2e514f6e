//! Keyboard event types and listener

use super::KeyId;
use device_query::{DeviceQuery, DeviceState};
use std::sync::mpsc;
use std::time::Instant;

/// Timestamps are fractional milliseconds on a monotonic session clock
pub type Millis = f64;

/// Type of keyboard event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventType {
    /// Key was pressed down (or auto-repeated)
    Press,
    /// Key was released
    Release,
}

/// A keyboard event with timing information
#[derive(Debug, Clone, PartialEq)]
pub struct KeyEvent {
    /// Physical key identifier
    pub key: KeyId,
    /// Type of event (press/release)
    pub event_type: KeyEventType,
    /// Milliseconds since the session clock epoch
    pub timestamp_ms: Millis,
}

impl KeyEvent {
    pub fn new(key: KeyId, event_type: KeyEventType, timestamp_ms: Millis) -> Self {
        Self {
            key,
            event_type,
            timestamp_ms,
        }
    }

    pub fn press(key: impl Into<KeyId>, timestamp_ms: Millis) -> Self {
        Self::new(key.into(), KeyEventType::Press, timestamp_ms)
    }

    pub fn release(key: impl Into<KeyId>, timestamp_ms: Millis) -> Self {
        Self::new(key.into(), KeyEventType::Release, timestamp_ms)
    }
}

/// Monotonic clock shared by every input source of a session
#[derive(Debug, Clone, Copy)]
pub struct SessionClock {
    epoch: Instant,
}

impl SessionClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }

    /// Milliseconds elapsed since the epoch
    pub fn now_ms(&self) -> Millis {
        self.at(Instant::now())
    }

    /// Convert an instant to session milliseconds
    pub fn at(&self, instant: Instant) -> Millis {
        instant.saturating_duration_since(self.epoch).as_secs_f64() * 1000.0
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Keyboard listener that polls for key state changes
///
/// `device_query` only exposes the set of held keys, so presses and
/// releases are derived by diffing consecutive polls.
pub struct KeyboardListener {
    device_state: DeviceState,
    last_keys: Vec<device_query::Keycode>,
    clock: SessionClock,
    event_tx: mpsc::Sender<KeyEvent>,
}

impl KeyboardListener {
    /// Create a new keyboard listener
    pub fn new(clock: SessionClock, event_tx: mpsc::Sender<KeyEvent>) -> Self {
        log::info!("device_query keyboard listener started");
        Self {
            device_state: DeviceState::new(),
            last_keys: Vec::new(),
            clock,
            event_tx,
        }
    }

    /// Poll for keyboard state changes
    /// Returns the number of events generated
    pub fn poll(&mut self) -> usize {
        let now = self.clock.now_ms();
        let current_keys = self.device_state.get_keys();
        let mut event_count = 0;

        let pressed = current_keys.iter().filter(|k| !self.last_keys.contains(k));
        let released = self.last_keys.iter().filter(|k| !current_keys.contains(k));

        for (keys, event_type) in [
            (pressed.collect::<Vec<_>>(), KeyEventType::Press),
            (released.collect::<Vec<_>>(), KeyEventType::Release),
        ] {
            for key in keys {
                let Some(id) = KeyId::from_keycode(*key) else {
                    log::trace!("ignoring unmapped keycode {:?}", key);
                    continue;
                };
                if self.event_tx.send(KeyEvent::new(id, event_type, now)).is_ok() {
                    event_count += 1;
                }
            }
        }

        self.last_keys = current_keys;
        event_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn clock_converts_instants_to_millis() {
        let clock = SessionClock::new();
        let later = clock.epoch + Duration::from_micros(12_500);
        assert!((clock.at(later) - 12.5).abs() < 1e-9);
    }

    #[test]
    fn clock_never_goes_negative() {
        let clock = SessionClock::new();
        let before = clock.epoch.checked_sub(Duration::from_millis(5));
        if let Some(before) = before {
            assert_eq!(clock.at(before), 0.0);
        }
    }

    #[test]
    fn press_and_release_constructors() {
        let down = KeyEvent::press("KeyA", 100.0);
        assert_eq!(down.event_type, KeyEventType::Press);
        assert_eq!(down.key.as_str(), "KeyA");

        let up = KeyEvent::release("KeyA", 180.0);
        assert_eq!(up.event_type, KeyEventType::Release);
        assert_eq!(up.timestamp_ms, 180.0);
    }
}
