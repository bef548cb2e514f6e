//! KeyPulse - terminal keyboard tester
//!
//! Draws a virtual keyboard, highlights keys as they go down and up, and
//! measures per-key hold latency and presses per second.

pub mod config;
pub mod feedback;
pub mod keyboard;
pub mod report;
pub mod summary;
pub mod ui;
pub mod utils;

pub use config::Config;
