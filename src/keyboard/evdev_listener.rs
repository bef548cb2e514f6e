//! Raw evdev-based keyboard listener for Linux
//!
//! Reads kernel key events straight from `/dev/input/event*`. Unlike the
//! polling listener this sees every transition. Kernel auto-repeat is
//! dropped here since held keys stay visible after the terminal loses focus.

use super::{KeyEvent, KeyEventType, KeyId, Millis, SessionClock};
use nix::libc;
use std::fs::{self, File};
use std::io::{self, Read};
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Error type for evdev operations
#[derive(Debug, Error)]
pub enum EvdevError {
    /// No keyboard devices found
    #[error("No keyboard devices found")]
    NoDevices,
    /// Permission denied accessing device
    #[error("Permission denied accessing {0}")]
    PermissionDenied(String),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Device enumeration failed
    #[error("Device enumeration failed: {0}")]
    EnumerationFailed(String),
}

/// A raw input event from the kernel
#[repr(C)]
#[derive(Debug, Clone, Copy)]
struct InputEvent {
    tv_sec: i64,
    tv_usec: i64,
    event_type: u16,
    code: u16,
    value: i32,
}

const EV_KEY: u16 = 0x01;
const INPUT_EVENT_SIZE: usize = std::mem::size_of::<InputEvent>();

/// Kernel key event values
const KEY_RELEASE: i32 = 0;
const KEY_PRESS: i32 = 1;
const KEY_REPEAT: i32 = 2;

/// Map a kernel key value to an event type; repeats are not physical presses
fn event_type_for(value: i32) -> Option<KeyEventType> {
    match value {
        KEY_PRESS => Some(KeyEventType::Press),
        KEY_RELEASE => Some(KeyEventType::Release),
        KEY_REPEAT => None,
        _ => None,
    }
}

/// Place a kernel event on the session clock by how long ago it happened.
/// Event times use the kernel's realtime clock.
fn session_time(now: Millis, wall_now_ms: Option<f64>, event: &InputEvent) -> Millis {
    match wall_now_ms {
        Some(wall_now) => {
            let event_ms = event.tv_sec as f64 * 1000.0 + event.tv_usec as f64 / 1000.0;
            now - (wall_now - event_ms).max(0.0)
        }
        None => now,
    }
}

/// Find all keyboard input devices
fn find_keyboard_devices() -> Result<Vec<PathBuf>, EvdevError> {
    let input_dir = Path::new("/dev/input");
    if !input_dir.exists() {
        return Err(EvdevError::EnumerationFailed(
            "/dev/input does not exist".to_string(),
        ));
    }

    let keyboards: Vec<PathBuf> = fs::read_dir(input_dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("event"))
        })
        .filter(|path| is_keyboard_device(path))
        .collect();

    if keyboards.is_empty() {
        return Err(EvdevError::NoDevices);
    }

    Ok(keyboards)
}

/// Check if a device is a keyboard by examining /sys/class/input
fn is_keyboard_device(device_path: &Path) -> bool {
    let Some(name) = device_path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };

    let caps_path = format!("/sys/class/input/{}/device/capabilities/key", name);
    if let Ok(caps) = fs::read_to_string(&caps_path) {
        return key_capability_bits(&caps) > 50;
    }

    let name_path = format!("/sys/class/input/{}/device/name", name);
    if let Ok(dev_name) = fs::read_to_string(&name_path) {
        let dev_name = dev_name.to_lowercase();
        return dev_name.contains("keyboard") || dev_name.contains("kbd");
    }
    false
}

/// Count the keys advertised in a sysfs key capability bitmap
fn key_capability_bits(caps: &str) -> u32 {
    caps.split_whitespace()
        .filter_map(|hex| u64::from_str_radix(hex, 16).ok())
        .map(|n| n.count_ones())
        .sum()
}

/// Evdev-based keyboard listener for raw scancode detection
pub struct EvdevListener {
    devices: Vec<File>,
    device_paths: Vec<PathBuf>,
    clock: SessionClock,
    event_tx: mpsc::Sender<KeyEvent>,
    buffer: Vec<u8>,
}

impl EvdevListener {
    /// Create a new evdev listener
    pub fn new(clock: SessionClock, event_tx: mpsc::Sender<KeyEvent>) -> Result<Self, EvdevError> {
        let mut devices = Vec::new();
        let mut device_paths = Vec::new();

        for path in find_keyboard_devices()? {
            match File::open(&path) {
                Ok(file) => {
                    let fd = file.as_raw_fd();
                    // SAFETY: fd is a valid descriptor owned by `file` for this scope.
                    unsafe {
                        let flags = libc::fcntl(fd, libc::F_GETFL);
                        libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK);
                    }
                    devices.push(file);
                    device_paths.push(path);
                }
                Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                    log::warn!("skipping {}: permission denied", path.display());
                    continue;
                }
                Err(e) => return Err(EvdevError::Io(e)),
            }
        }

        if devices.is_empty() {
            return Err(EvdevError::PermissionDenied(
                "any keyboard device. Try running with sudo or add user to 'input' group".to_string(),
            ));
        }

        log::info!("evdev listener reading {} device(s)", devices.len());

        Ok(Self {
            devices,
            device_paths,
            clock,
            event_tx,
            buffer: vec![0u8; INPUT_EVENT_SIZE * 64],
        })
    }

    /// Try to create an evdev listener, return None if not available
    pub fn try_new(clock: SessionClock, event_tx: mpsc::Sender<KeyEvent>) -> Option<Self> {
        match Self::new(clock, event_tx) {
            Ok(listener) => Some(listener),
            Err(e) => {
                log::warn!("evdev unavailable: {}", e);
                None
            }
        }
    }

    /// Get the number of connected devices
    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    /// Get device paths
    pub fn device_paths(&self) -> &[PathBuf] {
        &self.device_paths
    }

    /// Poll for keyboard events
    /// Returns the number of events generated
    pub fn poll(&mut self) -> usize {
        let now = self.clock.now_ms();
        let wall_now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .ok()
            .map(|d| d.as_secs_f64() * 1000.0);
        let mut event_count = 0;

        for (device, path) in self.devices.iter_mut().zip(&self.device_paths) {
            loop {
                match device.read(&mut self.buffer) {
                    Ok(bytes_read) if bytes_read >= INPUT_EVENT_SIZE => {
                        for chunk in self.buffer[..bytes_read].chunks_exact(INPUT_EVENT_SIZE) {
                            // SAFETY: chunk is exactly one kernel `input_event` worth of bytes.
                            let input_event: InputEvent =
                                unsafe { std::ptr::read_unaligned(chunk.as_ptr() as *const InputEvent) };

                            if input_event.event_type != EV_KEY {
                                continue;
                            }
                            let Some(event_type) = event_type_for(input_event.value) else {
                                continue;
                            };

                            let event = KeyEvent::new(
                                KeyId::from_scancode(input_event.code),
                                event_type,
                                session_time(now, wall_now_ms, &input_event),
                            );
                            if self.event_tx.send(event).is_ok() {
                                event_count += 1;
                            }
                        }
                    }
                    Ok(_) => break,
                    Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => break,
                    Err(e) => {
                        log::warn!("read from {} failed: {}", path.display(), e);
                        break;
                    }
                }
            }
        }

        event_count
    }
}

/// Get a status message about evdev availability
pub fn evdev_status() -> String {
    match find_keyboard_devices() {
        Ok(devices) => format!("{} keyboard device(s) found", devices.len()),
        Err(EvdevError::NoDevices) => "No keyboard devices found".to_string(),
        Err(EvdevError::PermissionDenied(_)) => {
            "Permission denied - run with sudo or add user to 'input' group".to_string()
        }
        Err(e) => format!("Error: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::MetricsEngine;

    #[test]
    fn kernel_values_map_to_event_types() {
        assert_eq!(event_type_for(KEY_PRESS), Some(KeyEventType::Press));
        assert_eq!(event_type_for(KEY_REPEAT), None);
        assert_eq!(event_type_for(KEY_RELEASE), Some(KeyEventType::Release));
        assert_eq!(event_type_for(7), None);
    }

    #[test]
    fn held_key_repeats_after_focus_lost_are_not_presses() {
        let mut engine = MetricsEngine::silent();
        let a = KeyId::from_scancode(30);
        let feed = |engine: &mut MetricsEngine, value: i32, t: f64| {
            if let Some(event_type) = event_type_for(value) {
                engine.process_event(&KeyEvent::new(KeyId::from_scancode(30), event_type, t));
            }
        };

        feed(&mut engine, KEY_PRESS, 0.0);
        engine.on_focus_lost();
        feed(&mut engine, KEY_REPEAT, 500.0);
        feed(&mut engine, KEY_REPEAT, 533.0);
        feed(&mut engine, KEY_RELEASE, 600.0);

        let stats = engine.state().stats(&a).unwrap();
        assert_eq!(stats.press_count, 1);
        assert_eq!(stats.max_cps, 0.0);
        assert_eq!(stats.last_latency, Some(600.0));
    }

    fn key_event_at(tv_sec: i64, tv_usec: i64) -> InputEvent {
        InputEvent {
            tv_sec,
            tv_usec,
            event_type: EV_KEY,
            code: 30,
            value: KEY_PRESS,
        }
    }

    #[test]
    fn kernel_time_is_shifted_onto_session_clock() {
        let event = key_event_at(1_000, 250_000);
        let wall_now = 1_000_300.0;
        assert_eq!(session_time(500.0, Some(wall_now), &event), 450.0);
    }

    #[test]
    fn future_kernel_time_is_treated_as_now() {
        let event = key_event_at(2_000, 0);
        assert_eq!(session_time(500.0, Some(1_000_000.0), &event), 500.0);
        assert_eq!(session_time(500.0, None, &event), 500.0);
    }

    #[test]
    fn capability_bitmap_counts_keys() {
        assert_eq!(key_capability_bits("0"), 0);
        assert_eq!(key_capability_bits("3 ff"), 10);
        assert_eq!(key_capability_bits("zz 1"), 1);
    }

    #[test]
    fn evdev_status_never_empty() {
        let status = evdev_status();
        assert!(!status.is_empty());
    }
}
