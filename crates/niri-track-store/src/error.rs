use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Boot identity unavailable at {}: {source}", path.display())]
    BootId { path: PathBuf, source: io::Error },

    #[error("Failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to lock {}: {source}", path.display())]
    Lock { path: PathBuf, source: io::Error },

    #[error("Failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("Failed to serialize store: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    pub fn suggestion(&self) -> &'static str {
        match self {
            StoreError::BootId { .. } => {
                "Check that XDG_RUNTIME_DIR points to a writable directory"
            }
            StoreError::Read { .. } | StoreError::Lock { .. } | StoreError::Write { .. } => {
                "Check that the state directory (NIRI_TRACK_STATE_DIR) is writable"
            }
            StoreError::Serialize(_) => "This is a bug; please report it",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_path() {
        let err = StoreError::Lock {
            path: PathBuf::from("/state/positions.lock"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(
            err.to_string(),
            "Failed to lock /state/positions.lock: denied"
        );
        assert!(err.suggestion().contains("NIRI_TRACK_STATE_DIR"));
    }
}
