//! Top-level errors. Exit codes follow sysexits.h where one fits.

use std::io;

use niri_track_core::AdapterError;
use niri_track_ipc::ClientError;
use niri_track_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Adapter(#[from] AdapterError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Native messaging failed: {0}")]
    Messaging(ClientError),

    #[error("Failed to spawn {command}: {source}")]
    Spawn { command: String, source: io::Error },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::NotRunning(_)
            | ClientError::Compositor(_)
            | ClientError::UnexpectedReply { .. } => AppError::Adapter(err.into()),
            other => AppError::Messaging(other),
        }
    }
}

impl AppError {
    /// Running outside niri is not a failure for a background hook.
    pub fn is_not_running(&self) -> bool {
        matches!(self, AppError::Adapter(e) if e.is_not_running())
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Adapter(AdapterError::NotRunning(_)) => 0,
            AppError::Adapter(_) => 1,
            AppError::Store(_) => 73,        // EX_CANTCREAT
            AppError::Messaging(_) => 76,    // EX_PROTOCOL
            AppError::Spawn { .. } => 71,    // EX_OSERR
            AppError::Io(_) => 74,           // EX_IOERR
        }
    }

    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            AppError::Store(e) => Some(e.suggestion()),
            AppError::Spawn { .. } => Some("Set TERMINAL to an installed terminal emulator"),
            AppError::Adapter(AdapterError::Protocol(_)) => {
                Some("The niri version may be unsupported; run with NIRI_DEBUG=debug")
            }
            _ => None,
        }
    }
}
