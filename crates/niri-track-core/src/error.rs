use thiserror::Error;

/// Failures talking to the window manager.
///
/// `NotRunning` means the session has no supported compositor at all and is
/// treated as a silent no-op by callers; everything else is a real failure.
#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("Not running under a supported window manager: {0}")]
    NotRunning(String),

    #[error("Window manager protocol error: {0}")]
    Protocol(String),

    #[error("Window manager rejected request: {0}")]
    Compositor(String),

    #[error("Window manager I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AdapterError {
    pub fn is_not_running(&self) -> bool {
        matches!(self, AdapterError::NotRunning(_))
    }
}
