//! In-memory window manager for testing placement and restoration.
//!
//! Models a scrolling layout: every workspace is an ordered list of
//! single-window columns. Column moves act on the focused window, like the
//! real compositor, and every command is recorded for assertions.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::error::AdapterError;
use crate::ports::WindowManager;
use crate::window::Output;
use crate::window::Window;
use crate::window::WindowId;
use crate::window::Workspace;
use crate::window::WorkspaceId;

#[derive(Debug, Clone)]
struct MockWindow {
    title: String,
    app_id: String,
    pid: Option<u32>,
    workspace_id: WorkspaceId,
    tile_width: f64,
}

#[derive(Debug, Default)]
struct MockState {
    next_id: WindowId,
    windows: HashMap<WindowId, MockWindow>,
    columns: BTreeMap<WorkspaceId, Vec<WindowId>>,
    workspace_outputs: BTreeMap<WorkspaceId, String>,
    outputs: BTreeMap<String, u32>,
    focused: Option<WindowId>,
    calls: Vec<String>,
    not_running: bool,
}

impl MockState {
    fn locate(&self, id: WindowId) -> Option<(WorkspaceId, usize)> {
        self.columns
            .iter()
            .find_map(|(ws, cols)| cols.iter().position(|w| *w == id).map(|pos| (*ws, pos)))
    }

    fn detach(&mut self, id: WindowId) {
        if let Some((ws, pos)) = self.locate(id) {
            if let Some(cols) = self.columns.get_mut(&ws) {
                cols.remove(pos);
            }
        }
    }

    fn output_width(&self, workspace_id: WorkspaceId) -> Option<u32> {
        self.workspace_outputs
            .get(&workspace_id)
            .and_then(|name| self.outputs.get(name))
            .copied()
    }
}

#[derive(Debug, Default)]
pub struct MockWindowManager {
    state: Mutex<MockState>,
}

impl MockWindowManager {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                next_id: 1,
                ..MockState::default()
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn add_output(&self, name: &str, width: u32) {
        self.state().outputs.insert(name.to_string(), width);
    }

    pub fn add_workspace(&self, workspace_id: WorkspaceId, output: &str) {
        let mut state = self.state();
        state
            .workspace_outputs
            .insert(workspace_id, output.to_string());
        state.columns.entry(workspace_id).or_default();
    }

    /// Opens a window in the rightmost column of `workspace_id`.
    pub fn add_window(
        &self,
        workspace_id: WorkspaceId,
        title: &str,
        pid: Option<u32>,
        app_id: &str,
    ) -> WindowId {
        let len = self
            .state()
            .columns
            .get(&workspace_id)
            .map_or(0, Vec::len);
        self.add_window_at(workspace_id, len + 1, title, pid, app_id)
    }

    /// Opens a window at 1-based `column`, shifting later columns right.
    pub fn add_window_at(
        &self,
        workspace_id: WorkspaceId,
        column: usize,
        title: &str,
        pid: Option<u32>,
        app_id: &str,
    ) -> WindowId {
        let mut state = self.state();
        let id = state.next_id;
        state.next_id += 1;
        state.windows.insert(
            id,
            MockWindow {
                title: title.to_string(),
                app_id: app_id.to_string(),
                pid,
                workspace_id,
                tile_width: 1000.0,
            },
        );
        let cols = state.columns.entry(workspace_id).or_default();
        let at = column.saturating_sub(1).min(cols.len());
        cols.insert(at, id);
        id
    }

    pub fn remove_window(&self, id: WindowId) {
        let mut state = self.state();
        state.detach(id);
        state.windows.remove(&id);
        if state.focused == Some(id) {
            state.focused = None;
        }
    }

    pub fn set_tile_width(&self, id: WindowId, tile_width: f64) {
        if let Some(w) = self.state().windows.get_mut(&id) {
            w.tile_width = tile_width;
        }
    }

    /// Window ids of `workspace_id`, left to right.
    pub fn columns(&self, workspace_id: WorkspaceId) -> Vec<WindowId> {
        self.state()
            .columns
            .get(&workspace_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn window_by_pid(&self, pid: u32) -> Option<WindowId> {
        self.state()
            .windows
            .iter()
            .find(|(_, w)| w.pid == Some(pid))
            .map(|(id, _)| *id)
    }

    pub fn workspace_of(&self, id: WindowId) -> Option<WorkspaceId> {
        self.state().locate(id).map(|(ws, _)| ws)
    }

    pub fn focused(&self) -> Option<WindowId> {
        self.state().focused
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn move_count(&self) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|c| c.starts_with("move_column"))
            .count()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// Makes every subsequent call fail as if no compositor were running.
    pub fn fail_with_not_running(&self) {
        self.state().not_running = true;
    }

    fn check(&self, state: &MockState) -> Result<(), AdapterError> {
        if state.not_running {
            return Err(AdapterError::NotRunning("mock compositor offline".into()));
        }
        Ok(())
    }

    fn shift_focused(&self, delta: isize, name: &str) -> Result<(), AdapterError> {
        let mut state = self.state();
        self.check(&state)?;
        state.calls.push(name.to_string());
        let Some(focused) = state.focused else {
            return Ok(());
        };
        let Some((ws, pos)) = state.locate(focused) else {
            return Ok(());
        };
        let Some(cols) = state.columns.get_mut(&ws) else {
            return Ok(());
        };
        let target = pos as isize + delta;
        if target >= 0 && (target as usize) < cols.len() {
            cols.swap(pos, target as usize);
        }
        Ok(())
    }
}

impl WindowManager for MockWindowManager {
    fn list_windows(&self) -> Result<Vec<Window>, AdapterError> {
        let state = self.state();
        self.check(&state)?;
        let mut windows: Vec<Window> = state
            .windows
            .iter()
            .map(|(id, w)| {
                let column = state
                    .locate(*id)
                    .map(|(_, pos)| u32::try_from(pos + 1).unwrap_or(u32::MAX));
                Window {
                    id: *id,
                    title: w.title.clone(),
                    app_id: w.app_id.clone(),
                    pid: w.pid,
                    workspace_id: Some(w.workspace_id),
                    column,
                    tile_width: w.tile_width,
                }
            })
            .collect();
        windows.sort_by_key(|w| w.id);
        Ok(windows)
    }

    fn list_workspaces(&self) -> Result<Vec<Workspace>, AdapterError> {
        let state = self.state();
        self.check(&state)?;
        Ok(state
            .columns
            .keys()
            .enumerate()
            .map(|(i, id)| Workspace {
                id: *id,
                idx: u8::try_from(i + 1).unwrap_or(u8::MAX),
                output: state.workspace_outputs.get(id).cloned(),
            })
            .collect())
    }

    fn list_outputs(&self) -> Result<Vec<Output>, AdapterError> {
        let state = self.state();
        self.check(&state)?;
        Ok(state
            .outputs
            .iter()
            .map(|(name, width)| Output {
                name: name.clone(),
                width: *width,
            })
            .collect())
    }

    fn focus(&self, window_id: WindowId) -> Result<(), AdapterError> {
        let mut state = self.state();
        self.check(&state)?;
        state.calls.push(format!("focus {window_id}"));
        if !state.windows.contains_key(&window_id) {
            return Err(AdapterError::Compositor(format!(
                "window {window_id} not found"
            )));
        }
        state.focused = Some(window_id);
        Ok(())
    }

    fn move_column_left(&self) -> Result<(), AdapterError> {
        self.shift_focused(-1, "move_column_left")
    }

    fn move_column_right(&self) -> Result<(), AdapterError> {
        self.shift_focused(1, "move_column_right")
    }

    fn move_to_workspace(
        &self,
        window_id: WindowId,
        workspace_id: WorkspaceId,
    ) -> Result<(), AdapterError> {
        let mut state = self.state();
        self.check(&state)?;
        state
            .calls
            .push(format!("move_to_workspace {window_id} {workspace_id}"));
        if !state.windows.contains_key(&window_id) {
            return Err(AdapterError::Compositor(format!(
                "window {window_id} not found"
            )));
        }
        if state.locate(window_id).map(|(ws, _)| ws) == Some(workspace_id) {
            return Ok(());
        }
        state.detach(window_id);
        state.columns.entry(workspace_id).or_default().push(window_id);
        if let Some(w) = state.windows.get_mut(&window_id) {
            w.workspace_id = workspace_id;
        }
        Ok(())
    }

    fn set_width(&self, window_id: WindowId, percent: u8) -> Result<(), AdapterError> {
        let mut state = self.state();
        self.check(&state)?;
        state.calls.push(format!("set_width {window_id} {percent}"));
        let output_width = state
            .windows
            .get(&window_id)
            .and_then(|w| state.output_width(w.workspace_id));
        if let (Some(width), Some(w)) = (output_width, state.windows.get_mut(&window_id)) {
            w.tile_width = f64::from(width) * f64::from(percent) / 100.0;
        }
        Ok(())
    }
}
