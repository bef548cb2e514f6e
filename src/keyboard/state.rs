//! Keyboard state snapshot

use super::{KeyId, Millis};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Timing statistics for a single key
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyStats {
    /// Hold duration of the most recent press, in milliseconds
    pub last_latency: Option<Millis>,
    /// Number of qualifying key-downs
    pub press_count: u64,
    /// Highest presses-per-second seen for this key
    pub max_cps: f64,
}

/// Lifecycle of one key as seen by the visualizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStatus {
    Untested,
    Released,
    Pressed,
}

/// Aggregate snapshot handed to the view
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyboardState {
    /// Keys currently held down
    pub pressed_keys: BTreeSet<KeyId>,
    /// Keys pressed at least once since the last reset
    pub activated_keys: BTreeSet<KeyId>,
    /// Most recent fresh key-down
    pub last_key_pressed: Option<KeyId>,
    /// Per-key statistics
    pub key_stats: BTreeMap<KeyId, KeyStats>,
    /// Maximum CPS observed across all keys since the last reset
    pub global_max_cps: f64,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pressed(&self, key: &KeyId) -> bool {
        self.pressed_keys.contains(key)
    }

    pub fn is_activated(&self, key: &KeyId) -> bool {
        self.activated_keys.contains(key)
    }

    pub fn key_status(&self, key: &KeyId) -> KeyStatus {
        if self.is_pressed(key) {
            KeyStatus::Pressed
        } else if self.is_activated(key) {
            KeyStatus::Released
        } else {
            KeyStatus::Untested
        }
    }

    pub fn stats(&self, key: &KeyId) -> Option<&KeyStats> {
        self.key_stats.get(key)
    }

    /// Number of distinct keys pressed since the last reset
    pub fn activated_count(&self) -> usize {
        self.activated_keys.len()
    }

    /// Total qualifying key-downs across all keys
    pub fn total_presses(&self) -> u64 {
        self.key_stats.values().map(|s| s.press_count).sum()
    }

    /// Mean of every recorded hold latency.
    ///
    /// Returns `0.0` when no key has a latency sample yet; callers that need
    /// to tell that apart from a real zero should check `latency_samples`.
    pub fn average_latency(&self) -> f64 {
        let samples = self.latency_samples();
        if samples == 0 {
            return 0.0;
        }
        let sum: f64 = self.key_stats.values().filter_map(|s| s.last_latency).sum();
        sum / samples as f64
    }

    /// Number of keys with a recorded hold latency
    pub fn latency_samples(&self) -> usize {
        self.key_stats
            .values()
            .filter(|s| s.last_latency.is_some())
            .count()
    }

    pub fn clear(&mut self) {
        self.pressed_keys.clear();
        self.activated_keys.clear();
        self.last_key_pressed = None;
        self.key_stats.clear();
        self.global_max_cps = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_latencies(latencies: &[(&str, Option<f64>)]) -> KeyboardState {
        let mut state = KeyboardState::new();
        for (code, latency) in latencies {
            let id = KeyId::from(*code);
            state.activated_keys.insert(id.clone());
            state.key_stats.insert(
                id,
                KeyStats {
                    last_latency: *latency,
                    press_count: 1,
                    max_cps: 0.0,
                },
            );
        }
        state
    }

    #[test]
    fn average_latency_without_samples_is_zero() {
        assert_eq!(KeyboardState::new().average_latency(), 0.0);

        let state = with_latencies(&[("KeyA", None)]);
        assert_eq!(state.average_latency(), 0.0);
        assert_eq!(state.latency_samples(), 0);
    }

    #[test]
    fn average_latency_is_arithmetic_mean() {
        let state = with_latencies(&[("KeyA", Some(80.0)), ("KeyB", Some(120.0))]);
        assert_eq!(state.average_latency(), 100.0);
    }

    #[test]
    fn average_latency_skips_keys_without_samples() {
        let state = with_latencies(&[
            ("KeyA", Some(80.0)),
            ("KeyB", None),
            ("KeyC", Some(120.0)),
        ]);
        assert_eq!(state.average_latency(), 100.0);
        assert_eq!(state.latency_samples(), 2);
    }

    #[test]
    fn key_status_follows_sets() {
        let mut state = KeyboardState::new();
        let a = KeyId::from("KeyA");
        assert_eq!(state.key_status(&a), KeyStatus::Untested);

        state.activated_keys.insert(a.clone());
        assert_eq!(state.key_status(&a), KeyStatus::Released);

        state.pressed_keys.insert(a.clone());
        assert_eq!(state.key_status(&a), KeyStatus::Pressed);
    }

    #[test]
    fn clear_empties_everything() {
        let mut state = with_latencies(&[("KeyA", Some(10.0))]);
        state.pressed_keys.insert(KeyId::from("KeyA"));
        state.last_key_pressed = Some(KeyId::from("KeyA"));
        state.global_max_cps = 7.5;

        state.clear();
        assert_eq!(state, KeyboardState::default());
    }
}
