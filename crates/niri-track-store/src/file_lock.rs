//! Cross-process serialization of store read-modify-write cycles.
//!
//! Uses `flock(2)` advisory locking on a sibling lock file. The lock blocks
//! until available and is released when the guard drops or the holding
//! process dies.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::error::StoreError;

/// Source of the exclusive lock wrapped around every store mutation.
pub trait LockProvider {
    type Guard;

    fn acquire(&self) -> Result<Self::Guard, StoreError>;
}

/// A held lock file that releases on drop.
#[derive(Debug)]
pub struct LockFile {
    file: File,
}

impl LockFile {
    /// Block until an exclusive lock on `lock_path` is held.
    ///
    /// Creates the lock file and its parent directory when missing. The PID
    /// of the holder is written into the file for debugging.
    pub fn acquire(lock_path: &Path) -> Result<Self, StoreError> {
        let lock_err = |source: io::Error| StoreError::Lock {
            path: lock_path.to_path_buf(),
            source,
        };

        if let Some(parent) = lock_path.parent() {
            std::fs::create_dir_all(parent).map_err(lock_err)?;
        }

        let mut lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(lock_path)
            .map_err(lock_err)?;

        let fd = lock_file.as_raw_fd();
        loop {
            // SAFETY: flock is safe to call with a valid file descriptor
            let result = unsafe { libc::flock(fd, libc::LOCK_EX) };
            if result == 0 {
                break;
            }
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(lock_err(err));
            }
        }
        trace!(path = %lock_path.display(), "store lock acquired");

        lock_file.set_len(0).map_err(lock_err)?;
        writeln!(lock_file, "{}", std::process::id()).map_err(lock_err)?;

        Ok(Self { file: lock_file })
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        // SAFETY: the descriptor stays valid until `file` is dropped after this
        unsafe {
            libc::flock(self.file.as_raw_fd(), libc::LOCK_UN);
        }
    }
}

/// `flock`-based provider used by the real store.
#[derive(Debug, Clone)]
pub struct FileLockProvider {
    path: PathBuf,
}

impl FileLockProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LockProvider for FileLockProvider {
    type Guard = LockFile;

    fn acquire(&self) -> Result<LockFile, StoreError> {
        LockFile::acquire(&self.path)
    }
}

/// Provider for single-process use, where no other writer exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLock;

impl LockProvider for NoLock {
    type Guard = ();

    fn acquire(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
