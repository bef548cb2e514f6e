//! Key-event to metrics engine
//!
//! Turns a serialized stream of key-down / key-up events into a
//! [`KeyboardState`]. Every input is accepted; anomalous timing degrades to a
//! well-defined state transition instead of an error.

use super::{KeyEvent, KeyEventType, KeyId, KeyboardState, Millis};
use crate::feedback::{ClickFeedback, Silent};
use std::collections::HashMap;

/// Outcome of a key-down
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyDown {
    /// The key was already held; OS auto-repeat, state untouched
    Repeat,
    /// A fresh physical press and the CPS it produced
    Press { cps: f64 },
}

/// Owns the timestamp tables and the snapshot they feed
pub struct MetricsEngine {
    state: KeyboardState,
    /// Most recent unreleased key-down per key
    down_times: HashMap<KeyId, Millis>,
    /// Previous key-down per key, kept across releases for CPS
    last_down_times: HashMap<KeyId, Millis>,
    feedback: Box<dyn ClickFeedback>,
    muted: bool,
}

impl MetricsEngine {
    pub fn new(feedback: Box<dyn ClickFeedback>) -> Self {
        Self {
            state: KeyboardState::new(),
            down_times: HashMap::new(),
            last_down_times: HashMap::new(),
            feedback,
            muted: false,
        }
    }

    /// Engine without any audible feedback
    pub fn silent() -> Self {
        Self::new(Box::new(Silent))
    }

    pub fn state(&self) -> &KeyboardState {
        &self.state
    }

    /// Owned copy of the current state
    pub fn snapshot(&self) -> KeyboardState {
        self.state.clone()
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Dispatch a press or release event
    pub fn process_event(&mut self, event: &KeyEvent) {
        match event.event_type {
            KeyEventType::Press => {
                self.on_key_down(&event.key, event.timestamp_ms);
            }
            KeyEventType::Release => {
                self.on_key_up(&event.key, event.timestamp_ms);
            }
        }
    }

    pub fn on_key_down(&mut self, id: &KeyId, now: Millis) -> KeyDown {
        if self.state.pressed_keys.contains(id) {
            log::trace!("{} auto-repeat suppressed", id);
            return KeyDown::Repeat;
        }

        self.state.pressed_keys.insert(id.clone());
        self.state.activated_keys.insert(id.clone());
        self.down_times.insert(id.clone(), now);

        let cps = match self.last_down_times.insert(id.clone(), now) {
            Some(last) if now - last > 0.0 => 1000.0 / (now - last),
            _ => 0.0,
        };

        let stats = self.state.key_stats.entry(id.clone()).or_default();
        stats.press_count += 1;
        stats.max_cps = stats.max_cps.max(cps);

        self.state.last_key_pressed = Some(id.clone());
        self.state.global_max_cps = self.state.global_max_cps.max(cps);

        log::trace!("{} down at {:.3}ms, {:.2} CPS", id, now, cps);
        self.fire_feedback();

        KeyDown::Press { cps }
    }

    /// Returns the hold latency recorded by this release, if any
    pub fn on_key_up(&mut self, id: &KeyId, now: Millis) -> Option<Millis> {
        self.state.pressed_keys.remove(id);

        let Some(down) = self.down_times.remove(id) else {
            log::trace!("{} released without a recorded press", id);
            return None;
        };

        // Not clamped: a non-monotonic host clock shows up as a negative hold.
        let latency = now - down;
        self.state.key_stats.entry(id.clone()).or_default().last_latency = Some(latency);

        log::trace!("{} held for {:.3}ms", id, latency);
        Some(latency)
    }

    /// Held keys cannot be observed once input focus is gone
    pub fn on_focus_lost(&mut self) {
        if !self.state.pressed_keys.is_empty() {
            log::debug!(
                "focus lost, releasing {} held key(s)",
                self.state.pressed_keys.len()
            );
        }
        self.state.pressed_keys.clear();
    }

    pub fn reset(&mut self) {
        log::debug!(
            "reset after {} activated key(s)",
            self.state.activated_count()
        );
        self.down_times.clear();
        self.last_down_times.clear();
        self.state.clear();
    }

    fn fire_feedback(&mut self) {
        if self.muted {
            return;
        }
        if let Err(e) = self.feedback.click() {
            log::debug!("click feedback failed: {}", e);
        }
    }
}

impl Default for MetricsEngine {
    fn default() -> Self {
        Self::silent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::FeedbackError;
    use std::cell::Cell;
    use std::io;
    use std::rc::Rc;

    fn key(code: &str) -> KeyId {
        KeyId::from(code)
    }

    /// Counts clicks and optionally fails every one of them
    struct CountingFeedback {
        clicks: Rc<Cell<u32>>,
        fail: bool,
    }

    impl ClickFeedback for CountingFeedback {
        fn click(&mut self) -> Result<(), FeedbackError> {
            self.clicks.set(self.clicks.get() + 1);
            if self.fail {
                Err(io::Error::new(io::ErrorKind::Other, "no audio device").into())
            } else {
                Ok(())
            }
        }
    }

    fn counting_engine(fail: bool) -> (MetricsEngine, Rc<Cell<u32>>) {
        let clicks = Rc::new(Cell::new(0));
        let engine = MetricsEngine::new(Box::new(CountingFeedback {
            clicks: clicks.clone(),
            fail,
        }));
        (engine, clicks)
    }

    fn assert_subset_invariants(state: &KeyboardState) {
        assert!(state.pressed_keys.is_subset(&state.activated_keys));
        assert!(state.key_stats.keys().all(|k| state.activated_keys.contains(k)));
    }

    #[test]
    fn first_press_has_no_cps() {
        let mut engine = MetricsEngine::silent();
        let a = key("KeyA");

        assert_eq!(engine.on_key_down(&a, 100.0), KeyDown::Press { cps: 0.0 });

        let state = engine.state();
        assert!(state.is_pressed(&a));
        assert!(state.is_activated(&a));
        assert_eq!(state.last_key_pressed, Some(a.clone()));
        let stats = state.stats(&a).unwrap();
        assert_eq!(stats.press_count, 1);
        assert_eq!(stats.max_cps, 0.0);
        assert_eq!(stats.last_latency, None);
        assert_eq!(state.global_max_cps, 0.0);
    }

    #[test]
    fn hold_latency_is_down_to_up() {
        let mut engine = MetricsEngine::silent();
        let a = key("KeyA");

        engine.on_key_down(&a, 100.0);
        assert_eq!(engine.on_key_up(&a, 180.0), Some(80.0));

        let state = engine.state();
        assert_eq!(state.stats(&a).unwrap().last_latency, Some(80.0));
        assert!(!state.is_pressed(&a));
        assert!(state.is_activated(&a));
    }

    #[test]
    fn cps_from_inter_press_interval() {
        let mut engine = MetricsEngine::silent();
        let a = key("KeyA");

        engine.on_key_down(&a, 0.0);
        engine.on_key_up(&a, 10.0);
        assert_eq!(engine.on_key_down(&a, 200.0), KeyDown::Press { cps: 5.0 });

        let state = engine.state();
        assert!(state.stats(&a).unwrap().max_cps >= 5.0);
        assert!(state.global_max_cps >= 5.0);
        assert_eq!(state.stats(&a).unwrap().press_count, 2);
    }

    #[test]
    fn max_cps_keeps_the_peak() {
        let mut engine = MetricsEngine::silent();
        let a = key("KeyA");

        for (down, up) in [(0.0, 10.0), (100.0, 110.0), (600.0, 610.0)] {
            engine.on_key_down(&a, down);
            engine.on_key_up(&a, up);
        }

        let stats = engine.state().stats(&a).unwrap();
        assert_eq!(stats.max_cps, 10.0);
        assert_eq!(engine.state().global_max_cps, 10.0);
    }

    #[test]
    fn global_max_spans_keys() {
        let mut engine = MetricsEngine::silent();
        let a = key("KeyA");
        let b = key("KeyB");

        engine.on_key_down(&a, 0.0);
        engine.on_key_up(&a, 5.0);
        engine.on_key_down(&a, 500.0);
        engine.on_key_up(&a, 505.0);

        engine.on_key_down(&b, 0.0);
        engine.on_key_up(&b, 5.0);
        engine.on_key_down(&b, 125.0);

        let state = engine.state();
        assert_eq!(state.stats(&a).unwrap().max_cps, 2.0);
        assert_eq!(state.stats(&b).unwrap().max_cps, 8.0);
        assert_eq!(state.global_max_cps, 8.0);
    }

    #[test]
    fn auto_repeat_leaves_state_identical() {
        let mut engine = MetricsEngine::silent();
        let a = key("KeyA");

        engine.on_key_down(&a, 100.0);
        let before = engine.snapshot();

        assert_eq!(engine.on_key_down(&a, 130.0), KeyDown::Repeat);
        assert_eq!(engine.on_key_down(&a, 160.0), KeyDown::Repeat);
        assert_eq!(engine.snapshot(), before);

        // Repeats must not move the press timestamp either.
        assert_eq!(engine.on_key_up(&a, 180.0), Some(80.0));
    }

    #[test]
    fn non_positive_interval_clamps_cps() {
        let mut engine = MetricsEngine::silent();
        let a = key("KeyA");

        engine.on_key_down(&a, 50.0);
        engine.on_key_up(&a, 60.0);
        assert_eq!(engine.on_key_down(&a, 50.0), KeyDown::Press { cps: 0.0 });
        engine.on_key_up(&a, 70.0);
        assert_eq!(engine.on_key_down(&a, 20.0), KeyDown::Press { cps: 0.0 });

        let state = engine.state();
        assert_eq!(state.stats(&a).unwrap().max_cps, 0.0);
        assert_eq!(state.global_max_cps, 0.0);
        assert_eq!(state.stats(&a).unwrap().press_count, 3);
    }

    #[test]
    fn negative_latency_is_stored_as_is() {
        let mut engine = MetricsEngine::silent();
        let a = key("KeyA");

        engine.on_key_down(&a, 100.0);
        assert_eq!(engine.on_key_up(&a, 90.0), Some(-10.0));
        assert_eq!(engine.state().stats(&a).unwrap().last_latency, Some(-10.0));
    }

    #[test]
    fn zero_timestamp_counts_as_a_recorded_press() {
        let mut engine = MetricsEngine::silent();
        let a = key("KeyA");

        engine.on_key_down(&a, 0.0);
        assert_eq!(engine.on_key_up(&a, 0.0), Some(0.0));
        assert_eq!(engine.state().stats(&a).unwrap().last_latency, Some(0.0));
    }

    #[test]
    fn unknown_key_up_is_tolerated() {
        let mut engine = MetricsEngine::silent();
        let z = key("KeyZ");

        assert_eq!(engine.on_key_up(&z, 42.0), None);

        let state = engine.state();
        assert!(state.stats(&z).is_none());
        assert!(!state.is_activated(&z));
        assert_eq!(*state, KeyboardState::default());
    }

    #[test]
    fn second_key_up_keeps_previous_latency() {
        let mut engine = MetricsEngine::silent();
        let a = key("KeyA");

        engine.on_key_down(&a, 100.0);
        engine.on_key_up(&a, 150.0);
        assert_eq!(engine.on_key_up(&a, 400.0), None);
        assert_eq!(engine.state().stats(&a).unwrap().last_latency, Some(50.0));
    }

    #[test]
    fn key_up_does_not_touch_counts_or_cps() {
        let mut engine = MetricsEngine::silent();
        let a = key("KeyA");

        engine.on_key_down(&a, 0.0);
        engine.on_key_up(&a, 10.0);
        engine.on_key_down(&a, 250.0);
        let before = engine.state().stats(&a).cloned().unwrap();

        engine.on_key_up(&a, 300.0);
        let after = engine.state().stats(&a).cloned().unwrap();
        assert_eq!(after.press_count, before.press_count);
        assert_eq!(after.max_cps, before.max_cps);
        assert_eq!(engine.state().global_max_cps, 4.0);
    }

    #[test]
    fn focus_lost_clears_only_pressed_keys() {
        let mut engine = MetricsEngine::silent();
        let a = key("KeyA");
        let b = key("KeyB");

        engine.on_key_down(&b, 0.0);
        engine.on_key_up(&b, 20.0);
        engine.on_key_down(&a, 30.0);
        let before = engine.snapshot();

        engine.on_focus_lost();

        let state = engine.state();
        assert!(state.pressed_keys.is_empty());
        assert_eq!(state.activated_keys, before.activated_keys);
        assert_eq!(state.key_stats, before.key_stats);
        assert_eq!(state.global_max_cps, before.global_max_cps);
        assert_eq!(state.last_key_pressed, before.last_key_pressed);
    }

    #[test]
    fn key_up_after_focus_lost_still_records_latency() {
        let mut engine = MetricsEngine::silent();
        let a = key("KeyA");

        engine.on_key_down(&a, 100.0);
        engine.on_focus_lost();
        assert_eq!(engine.on_key_up(&a, 160.0), Some(60.0));
    }

    #[test]
    fn press_after_focus_lost_is_fresh() {
        let mut engine = MetricsEngine::silent();
        let a = key("KeyA");

        engine.on_key_down(&a, 0.0);
        engine.on_focus_lost();
        assert_eq!(engine.on_key_down(&a, 100.0), KeyDown::Press { cps: 10.0 });
        assert_eq!(engine.state().stats(&a).unwrap().press_count, 2);
    }

    #[test]
    fn reset_clears_everything() {
        let mut engine = MetricsEngine::silent();
        let a = key("KeyA");

        engine.on_key_down(&a, 0.0);
        engine.on_key_up(&a, 10.0);
        engine.on_key_down(&a, 100.0);

        engine.reset();
        assert_eq!(*engine.state(), KeyboardState::default());

        engine.reset();
        assert_eq!(*engine.state(), KeyboardState::default());
    }

    #[test]
    fn reset_forgets_previous_presses() {
        let mut engine = MetricsEngine::silent();
        let a = key("KeyA");

        engine.on_key_down(&a, 0.0);
        engine.reset();

        // No interval survives the reset, so the next press is a first press.
        assert_eq!(engine.on_key_down(&a, 100.0), KeyDown::Press { cps: 0.0 });
        assert_eq!(engine.state().stats(&a).unwrap().press_count, 1);
    }

    #[test]
    fn reset_drops_pending_down_times() {
        let mut engine = MetricsEngine::silent();
        let a = key("KeyA");

        engine.on_key_down(&a, 0.0);
        engine.reset();
        assert_eq!(engine.on_key_up(&a, 50.0), None);
        assert!(engine.state().stats(&a).is_none());
    }

    #[test]
    fn subset_invariants_hold_over_mixed_sequence() {
        let mut engine = MetricsEngine::silent();
        let keys = [key("KeyA"), key("KeyB"), key("Space")];
        let mut t = 0.0;

        for round in 0..20 {
            let k = &keys[round % keys.len()];
            t += 7.0;
            engine.on_key_down(k, t);
            assert_subset_invariants(engine.state());
            if round % 3 == 0 {
                engine.on_key_down(k, t + 1.0);
                assert_subset_invariants(engine.state());
            }
            if round % 4 == 0 {
                engine.on_focus_lost();
                assert_subset_invariants(engine.state());
            }
            t += 3.0;
            engine.on_key_up(k, t);
            assert_subset_invariants(engine.state());
            if round == 12 {
                engine.reset();
                assert_subset_invariants(engine.state());
            }
        }
    }

    #[test]
    fn global_max_matches_per_key_max() {
        let mut engine = MetricsEngine::silent();
        let timings = [("KeyA", 0.0), ("KeyB", 3.0), ("KeyA", 40.0), ("KeyB", 90.0), ("KeyA", 70.0)];

        for (code, t) in timings {
            let id = key(code);
            engine.on_key_down(&id, t);
            engine.on_key_up(&id, t + 1.0);
        }

        let state = engine.state();
        let per_key_max = state
            .key_stats
            .values()
            .map(|s| s.max_cps)
            .fold(0.0, f64::max);
        assert_eq!(state.global_max_cps, per_key_max);
    }

    #[test]
    fn feedback_fires_once_per_fresh_press() {
        let (mut engine, clicks) = counting_engine(false);
        let a = key("KeyA");

        engine.on_key_down(&a, 0.0);
        engine.on_key_down(&a, 10.0);
        engine.on_key_up(&a, 20.0);
        engine.on_key_down(&a, 30.0);
        assert_eq!(clicks.get(), 2);
    }

    #[test]
    fn feedback_failure_does_not_affect_state() {
        let (mut failing, clicks) = counting_engine(true);
        let mut silent = MetricsEngine::silent();
        let a = key("KeyA");

        for engine in [&mut failing, &mut silent] {
            engine.on_key_down(&a, 0.0);
            engine.on_key_up(&a, 10.0);
            engine.on_key_down(&a, 200.0);
        }

        assert_eq!(clicks.get(), 2);
        assert_eq!(failing.snapshot(), silent.snapshot());
    }

    #[test]
    fn muted_engine_still_measures() {
        let (mut engine, clicks) = counting_engine(false);
        engine.set_muted(true);
        let a = key("KeyA");

        engine.on_key_down(&a, 0.0);
        engine.on_key_up(&a, 10.0);
        assert_eq!(clicks.get(), 0);
        assert_eq!(engine.state().stats(&a).unwrap().press_count, 1);
    }

    #[test]
    fn instances_are_independent() {
        let mut first = MetricsEngine::silent();
        let mut second = MetricsEngine::silent();
        let a = key("KeyA");

        first.on_key_down(&a, 0.0);
        first.on_key_up(&a, 10.0);
        assert_eq!(second.on_key_down(&a, 100.0), KeyDown::Press { cps: 0.0 });
        assert_eq!(first.state().stats(&a).unwrap().press_count, 1);
    }

    #[test]
    fn process_event_dispatches_by_type() {
        let mut engine = MetricsEngine::silent();
        engine.process_event(&KeyEvent::press("KeyA", 100.0));
        engine.process_event(&KeyEvent::release("KeyA", 180.0));

        let a = key("KeyA");
        assert_eq!(engine.state().stats(&a).unwrap().last_latency, Some(80.0));
    }
}
