//! Completion chime.
//!
//! Playback is fire-and-forget: the controller logs a failed notification and
//! moves on.

use std::io::Write;

use thiserror::Error;

use crate::focus::SessionType;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("notification output failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("notification backend unavailable: {0}")]
    Unavailable(String),
}

/// Signals the end of a session to the user.
pub trait Notifier: Send {
    fn session_finished(&self, session_type: SessionType) -> Result<(), NotifyError>;
}

/// Rings the terminal bell on stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct BellNotifier;

impl Notifier for BellNotifier {
    fn session_finished(&self, _session_type: SessionType) -> Result<(), NotifyError> {
        let mut err = std::io::stderr().lock();
        err.write_all(b"\x07")?;
        err.flush()?;
        Ok(())
    }
}

/// Does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn session_finished(&self, _session_type: SessionType) -> Result<(), NotifyError> {
        Ok(())
    }
}
