//! Audible click cue fired on every fresh key press

use std::io::{self, Write};
use thiserror::Error;

/// Error raised by a feedback backend
#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Something that can play a short click
pub trait ClickFeedback {
    fn click(&mut self) -> Result<(), FeedbackError>;
}

/// Rings the terminal bell
pub struct TerminalBell<W: Write> {
    out: W,
}

impl TerminalBell<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> TerminalBell<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> ClickFeedback for TerminalBell<W> {
    fn click(&mut self) -> Result<(), FeedbackError> {
        self.out.write_all(b"\x07")?;
        self.out.flush()?;
        Ok(())
    }
}

/// Feedback sink that does nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl ClickFeedback for Silent {
    fn click(&mut self) -> Result<(), FeedbackError> {
        Ok(())
    }
}
