//! Durable, locked position store.
//!
//! Business logic never touches the backing file directly: every access goes
//! through [`PositionStore::update`] or [`PositionStore::read`], which run a
//! whole load-modify-save cycle inside one lock scope.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use niri_track_core::App;
use niri_track_core::PositionEntry;
use niri_track_core::SavedPosition;
use niri_track_core::StoreState;
use niri_track_core::WindowId;
use niri_track_core::WorkspaceId;
use niri_track_core::current_handles;
use niri_track_core::find_predecessors;
use niri_track_core::lookup_latest_position;
use niri_track_core::prune;
use niri_track_core::reindex;
use niri_track_core::upsert;

use crate::error::StoreError;
use crate::file_lock::FileLockProvider;
use crate::file_lock::LockProvider;

pub const POSITIONS_FILE: &str = "positions.json";
pub const POSITIONS_LOCK_FILE: &str = "positions.lock";

/// What the placement engine needs to know about one tracked window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlacementContext {
    pub predecessors: Vec<String>,
    pub handles: HashMap<String, WindowId>,
}

#[derive(Debug)]
pub struct PositionStore<L: LockProvider = FileLockProvider> {
    path: PathBuf,
    lock: L,
}

impl PositionStore<FileLockProvider> {
    /// Store at `<state_dir>/positions.json`, locked through a sibling file.
    pub fn open(state_dir: &Path) -> Self {
        Self::with_lock_provider(
            state_dir.join(POSITIONS_FILE),
            FileLockProvider::new(state_dir.join(POSITIONS_LOCK_FILE)),
        )
    }
}

impl<L: LockProvider> PositionStore<L> {
    pub fn with_lock_provider(path: impl Into<PathBuf>, lock: L) -> Self {
        Self {
            path: path.into(),
            lock,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the store. A missing or unparsable file is an empty store; a
    /// file that cannot be read is an error, so it is never overwritten.
    pub fn load(&self) -> Result<StoreState, StoreError> {
        let Some(contents) = read_existing(&self.path)? else {
            return Ok(StoreState::empty());
        };
        match serde_json::from_str(&contents) {
            Ok(state) => Ok(state),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "corrupt store, starting empty");
                Ok(StoreState::empty())
            }
        }
    }

    /// Replaces the file atomically; readers see the old or the new state.
    pub fn save(&self, state: &StoreState) -> Result<(), StoreError> {
        write_json_atomic(&self.path, state)
    }

    /// Runs `f` while holding the store lock.
    pub fn with_lock<T>(
        &self,
        f: impl FnOnce() -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let _guard = self.lock.acquire()?;
        f()
    }

    /// Locked load, mutate, save.
    pub fn update<T>(&self, f: impl FnOnce(&mut StoreState) -> T) -> Result<T, StoreError> {
        self.with_lock(|| {
            let mut state = self.load()?;
            let out = f(&mut state);
            self.save(&state)?;
            Ok(out)
        })
    }

    /// Locked load for a consistent read.
    pub fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> Result<T, StoreError> {
        self.with_lock(|| Ok(f(&self.load()?)))
    }

    pub fn upsert_entries(
        &self,
        boot_id: &str,
        app: App,
        workspace_id: WorkspaceId,
        entries: Vec<PositionEntry>,
    ) -> Result<(), StoreError> {
        let count = entries.len();
        self.update(|state| upsert(state, boot_id, app, workspace_id, entries, Utc::now()))?;
        debug!(%app, workspace_id, count, "upserted entries");
        Ok(())
    }

    /// Drops every snapshot dominated by `boot_id`'s; saves only on change.
    pub fn prune_dominated(&self, boot_id: &str) -> Result<Vec<String>, StoreError> {
        self.with_lock(|| {
            let mut state = self.load()?;
            let removed = prune(&mut state, boot_id);
            if !removed.is_empty() {
                self.save(&state)?;
                info!(count = removed.len(), "pruned dominated boots");
            }
            Ok(removed)
        })
    }

    /// Rewrites `boot_id`'s indices in `workspace_id` from live columns;
    /// saves only on change.
    pub fn refresh_columns(
        &self,
        boot_id: &str,
        workspace_id: WorkspaceId,
        columns: &HashMap<WindowId, u32>,
    ) -> Result<usize, StoreError> {
        self.with_lock(|| {
            let mut state = self.load()?;
            let changed = reindex(&mut state, boot_id, workspace_id, columns, Utc::now());
            if changed > 0 {
                self.save(&state)?;
                debug!(workspace_id, changed, "refreshed columns");
            }
            Ok(changed)
        })
    }

    pub fn lookup_latest_position(
        &self,
        stable_id: &str,
    ) -> Result<Option<SavedPosition>, StoreError> {
        self.read(|state| lookup_latest_position(state, stable_id))
    }

    pub fn placement_context(
        &self,
        boot_id: &str,
        stable_id: &str,
        app: App,
        workspace_id: WorkspaceId,
    ) -> Result<PlacementContext, StoreError> {
        self.read(|state| PlacementContext {
            predecessors: find_predecessors(state, stable_id, app, workspace_id),
            handles: current_handles(state, boot_id),
        })
    }
}

/// Contents of `path`, or `None` when it does not exist.
pub(crate) fn read_existing(path: &Path) -> Result<Option<String>, StoreError> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(StoreError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Serializes `value` as pretty JSON into a temp file next to `path`, then
/// renames it over `path`.
pub(crate) fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let write_err = |source: io::Error| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(write_err)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    serde_json::to_writer_pretty(&mut tmp, value)?;
    tmp.write_all(b"\n").map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
