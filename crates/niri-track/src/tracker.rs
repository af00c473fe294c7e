//! Shared state of one tracker invocation.

use std::collections::BTreeMap;
use std::collections::HashMap;

use tracing::debug;
use tracing::info;
use tracing::warn;

use niri_track_core::AdapterError;
use niri_track_core::App;
use niri_track_core::PlacementRequest;
use niri_track_core::Placer;
use niri_track_core::PositionEntry;
use niri_track_core::SavedPosition;
use niri_track_core::Window;
use niri_track_core::WindowId;
use niri_track_core::WindowManager;
use niri_track_core::WorkspaceId;
use niri_track_core::column_of;
use niri_track_core::configure;
use niri_track_core::width_percent;
use niri_track_store::BootIdentity;
use niri_track_store::PositionStore;
use niri_track_store::TrackerConfig;

use crate::error::AppError;

/// Entries collected per workspace before they are written.
pub type WorkspaceEntries = BTreeMap<WorkspaceId, Vec<PositionEntry>>;

/// Output widths by workspace, to turn tile sizes into percentages.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    workspace_outputs: HashMap<WorkspaceId, String>,
    output_widths: HashMap<String, u32>,
}

impl Layout {
    pub fn query<W: WindowManager + ?Sized>(wm: &W) -> Result<Self, AdapterError> {
        let output_widths = wm
            .list_outputs()?
            .into_iter()
            .map(|o| (o.name, o.width))
            .collect();
        let workspace_outputs = wm
            .list_workspaces()?
            .into_iter()
            .filter_map(|ws| Some((ws.id, ws.output?)))
            .collect();
        Ok(Self {
            workspace_outputs,
            output_widths,
        })
    }

    /// `None` when the window's workspace or output is unknown.
    pub fn width_of(&self, window: &Window) -> Option<u8> {
        let output = self.workspace_outputs.get(&window.workspace_id?)?;
        let width = self.output_widths.get(output)?;
        Some(width_percent(window.tile_width, *width))
    }

    /// Entry for a tiled window, or `None` if it cannot be measured.
    pub fn entry_for(&self, stable_id: String, window: &Window) -> Option<(WorkspaceId, PositionEntry)> {
        let workspace_id = window.workspace_id?;
        let column = window.column?;
        let width = self.width_of(window)?;
        Some((
            workspace_id,
            PositionEntry::new(stable_id, i64::from(column), window.id, width),
        ))
    }
}

pub struct Tracker<W> {
    pub wm: W,
    pub store: PositionStore,
    pub boot: BootIdentity,
    pub placer: Placer,
    pub config: TrackerConfig,
}

impl<W: WindowManager> Tracker<W> {
    pub fn new(wm: W, config: TrackerConfig) -> Self {
        Self {
            store: PositionStore::open(&config.state_dir),
            boot: BootIdentity::new(&config.runtime_dir),
            placer: Placer::new(config.spacer_app_id.clone()),
            wm,
            config,
        }
    }

    pub fn boot_id(&self) -> Result<String, AppError> {
        Ok(self.boot.get()?)
    }

    pub fn layout(&self) -> Result<Layout, AppError> {
        Ok(Layout::query(&self.wm)?)
    }

    /// Upserts every workspace list under `app`; returns the entry count.
    pub fn record(&self, app: App, entries: WorkspaceEntries) -> Result<usize, AppError> {
        if entries.is_empty() {
            return Ok(0);
        }
        let boot_id = self.boot_id()?;
        let mut count = 0;
        for (workspace_id, list) in entries {
            count += list.len();
            self.store.upsert_entries(&boot_id, app, workspace_id, list)?;
        }
        Ok(count)
    }

    pub fn prune(&self) -> Result<Vec<String>, AppError> {
        let boot_id = self.boot_id()?;
        Ok(self.store.prune_dominated(&boot_id)?)
    }

    /// Puts a freshly opened window back on its saved workspace, width and
    /// column, then records it.
    ///
    /// Returns the recorded entry, or `None` when the window is not tiled in
    /// the target workspace after the move.
    pub fn restore_window(
        &self,
        app: App,
        stable_id: &str,
        window_id: WindowId,
        saved: SavedPosition,
    ) -> Result<Option<PositionEntry>, AppError> {
        let workspace_id = saved.workspace_id;
        let width = Some(saved.width).filter(|w| *w > 0);
        info!(stable_id, window_id, workspace_id, width = saved.width, "restoring window");
        configure(&self.wm, window_id, Some(workspace_id), width)?;

        let windows = self.wm.list_windows()?;
        let Some(column) = column_of(&windows, window_id, workspace_id) else {
            warn!(stable_id, window_id, workspace_id, "window not tiled after move, skipping placement");
            return Ok(None);
        };

        let boot_id = self.boot_id()?;
        let context = self
            .store
            .placement_context(&boot_id, stable_id, app, workspace_id)?;
        let request = PlacementRequest {
            window_id,
            workspace_id,
            predecessors: &context.predecessors,
            handles: &context.handles,
        };
        let outcome = self.placer.place(&self.wm, &request)?;
        debug!(stable_id, ?outcome, "placement finished");

        let column = outcome.column().unwrap_or(column);
        let entry = PositionEntry::new(stable_id, i64::from(column), window_id, saved.width);
        self.store
            .upsert_entries(&boot_id, app, workspace_id, vec![entry.clone()])?;

        let columns: HashMap<WindowId, u32> = self
            .wm
            .list_windows()?
            .into_iter()
            .filter(|w| w.is_in(workspace_id))
            .filter_map(|w| Some((w.id, w.column?)))
            .collect();
        self.store.refresh_columns(&boot_id, workspace_id, &columns)?;
        Ok(Some(entry))
    }
}
