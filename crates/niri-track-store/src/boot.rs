use std::fs;
use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::info;
use uuid::Uuid;

use crate::error::StoreError;
use crate::file_lock::LockFile;

pub const BOOT_ID_FILE: &str = "niri-tracker-boot";
pub const BOOT_ID_LOCK_FILE: &str = "niri-tracker-boot.lock";

/// Identifier of the current boot, kept in the runtime directory.
///
/// The runtime directory is cleared on reboot, so the first caller after a
/// boot mints a fresh id and every later caller reads the same one. Minting
/// happens under a sibling lock and the id is renamed into place, so the
/// file is never seen half written.
#[derive(Debug, Clone)]
pub struct BootIdentity {
    path: PathBuf,
}

impl BootIdentity {
    pub fn new(runtime_dir: &Path) -> Self {
        Self {
            path: runtime_dir.join(BOOT_ID_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self) -> Result<String, StoreError> {
        if let Some(id) = self.read()? {
            return Ok(id);
        }

        let lock_path = self.path.with_file_name(BOOT_ID_LOCK_FILE);
        let _lock = LockFile::acquire(&lock_path)?;
        // Another process may have minted the id while we waited.
        if let Some(id) = self.read()? {
            return Ok(id);
        }

        let id = Uuid::new_v4().to_string();
        self.write(&id).map_err(|source| self.error(source))?;
        info!(boot_id = %id, "new boot identity");
        Ok(id)
    }

    /// The stored id; `None` when the file is missing or blank.
    fn read(&self) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let id = contents.trim();
                Ok((!id.is_empty()).then(|| id.to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.error(e)),
        }
    }

    fn write(&self, id: &str) -> io::Result<()> {
        let dir = self.path.parent().unwrap_or(Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(id.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    fn error(&self, source: io::Error) -> StoreError {
        StoreError::BootId {
            path: self.path.clone(),
            source,
        }
    }
}
