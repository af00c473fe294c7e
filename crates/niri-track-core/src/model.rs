//! Boot-keyed position model.
//!
//! A [`StoreState`] maps boot ids to [`BootSnapshot`]s. Each snapshot holds,
//! per workspace, the ordered entries observed during that boot. Entries are
//! keyed by a stable id (`"app:identity"`) that survives application
//! restarts, while `window_id` is only meaningful inside the boot that
//! recorded it.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::window::WindowId;
use crate::window::WorkspaceId;

pub const STORE_VERSION: u32 = 1;

/// Application namespaces that write into the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum App {
    /// tmux sessions running in a terminal window.
    Tmux,
    /// mosh sessions started through `moshen`.
    Mosh,
    /// Librewolf browser windows.
    Librewolf,
}

impl App {
    pub const ALL: [App; 3] = [App::Tmux, App::Mosh, App::Librewolf];

    pub fn as_str(&self) -> &'static str {
        match self {
            App::Tmux => "tmux",
            App::Mosh => "mosh",
            App::Librewolf => "librewolf",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        App::ALL.into_iter().find(|app| app.as_str() == tag)
    }

    /// Builds the namespaced stable id for an identity of this app.
    pub fn stable_id(&self, identity: &str) -> String {
        format!("{}:{}", self.as_str(), identity)
    }
}

impl fmt::Display for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One window observed in one workspace during one boot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionEntry {
    #[serde(rename = "id")]
    pub stable_id: String,
    pub index: i64,
    pub window_id: WindowId,
    pub width: u8,
}

impl PositionEntry {
    pub fn new(stable_id: impl Into<String>, index: i64, window_id: WindowId, width: u8) -> Self {
        Self {
            stable_id: stable_id.into(),
            index,
            window_id,
            width,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootSnapshot {
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub apps: BTreeSet<String>,
    #[serde(default)]
    pub workspaces: BTreeMap<WorkspaceId, Vec<PositionEntry>>,
}

impl BootSnapshot {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            updated_at: now,
            apps: BTreeSet::new(),
            workspaces: BTreeMap::new(),
        }
    }

    pub fn has_app(&self, app: App) -> bool {
        self.apps.contains(app.as_str())
    }

    /// Finds the workspace and entry holding `stable_id`, if any.
    pub fn find(&self, stable_id: &str) -> Option<(WorkspaceId, &PositionEntry)> {
        self.workspaces.iter().find_map(|(ws, entries)| {
            entries
                .iter()
                .find(|e| e.stable_id == stable_id)
                .map(|e| (*ws, e))
        })
    }

    pub fn entry_count(&self) -> usize {
        self.workspaces.values().map(Vec::len).sum()
    }
}

/// Whole contents of the positions file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreState {
    pub version: u32,
    #[serde(default)]
    pub boots: BTreeMap<String, BootSnapshot>,
}

impl Default for StoreState {
    fn default() -> Self {
        Self::empty()
    }
}

impl StoreState {
    pub fn empty() -> Self {
        Self {
            version: STORE_VERSION,
            boots: BTreeMap::new(),
        }
    }

    pub fn boot(&self, boot_id: &str) -> Option<&BootSnapshot> {
        self.boots.get(boot_id)
    }
}

/// Last known workspace and width for a stable id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedPosition {
    pub workspace_id: WorkspaceId,
    pub width: u8,
    pub index: i64,
}

/// Width of a tile as a percentage of its output, rounded to the nearest 10.
pub fn width_percent(tile_width: f64, output_width: u32) -> u8 {
    if output_width == 0 || !tile_width.is_finite() || tile_width <= 0.0 {
        return 0;
    }
    let pct = tile_width / f64::from(output_width) * 100.0;
    let rounded = ((pct + 5.0) / 10.0).floor() * 10.0;
    rounded.clamp(0.0, 100.0) as u8
}
