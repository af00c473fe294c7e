use std::path::{Path, PathBuf};

use tracing::warn;

use niri_track_core::url_matcher::IdentitiesFile;

use crate::error::StoreError;
use crate::file_lock::FileLockProvider;
use crate::file_lock::LockProvider;
use crate::store::read_existing;
use crate::store::write_json_atomic;

pub const IDENTITIES_FILE: &str = "librewolf-identities.json";
pub const IDENTITIES_LOCK_FILE: &str = "librewolf-identities.lock";

/// Persisted browser window identities, next to the position store.
#[derive(Debug)]
pub struct IdentityStore<L: LockProvider = FileLockProvider> {
    path: PathBuf,
    lock: L,
}

impl IdentityStore<FileLockProvider> {
    pub fn open(state_dir: &Path) -> Self {
        Self {
            path: state_dir.join(IDENTITIES_FILE),
            lock: FileLockProvider::new(state_dir.join(IDENTITIES_LOCK_FILE)),
        }
    }
}

impl<L: LockProvider> IdentityStore<L> {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or malformed files read as an empty identity set; a file
    /// that cannot be read is an error.
    pub fn load(&self) -> Result<IdentitiesFile, StoreError> {
        let Some(contents) = read_existing(&self.path)? else {
            return Ok(IdentitiesFile::default());
        };
        Ok(serde_json::from_str(&contents).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "corrupt identities");
            IdentitiesFile::default()
        }))
    }

    pub fn save(&self, file: &IdentitiesFile) -> Result<(), StoreError> {
        write_json_atomic(&self.path, file)
    }

    /// Locked load, mutate, save.
    pub fn update<T>(&self, f: impl FnOnce(&mut IdentitiesFile) -> T) -> Result<T, StoreError> {
        let _guard = self.lock.acquire()?;
        let mut file = self.load()?;
        let out = f(&mut file);
        self.save(&file)?;
        Ok(out)
    }
}
