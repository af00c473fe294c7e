use niri_track_core::AdapterError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("niri is not running: {0}")]
    NotRunning(String),

    #[error("Failed to talk to niri: {0}")]
    ConnectionFailed(#[from] std::io::Error),

    #[error("Failed to encode or decode message: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("niri returned an error: {0}")]
    Compositor(String),

    #[error("Unexpected reply from niri: expected {expected}")]
    UnexpectedReply { expected: &'static str },

    #[error("Message of {0} bytes exceeds the native messaging limit")]
    FrameTooLarge(usize),
}

impl From<ClientError> for AdapterError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::NotRunning(msg) => AdapterError::NotRunning(msg),
            ClientError::ConnectionFailed(e) => AdapterError::Io(e),
            ClientError::Compositor(msg) => AdapterError::Compositor(msg),
            other @ (ClientError::SerializationFailed(_)
            | ClientError::UnexpectedReply { .. }
            | ClientError::FrameTooLarge(_)) => AdapterError::Protocol(other.to_string()),
        }
    }
}
