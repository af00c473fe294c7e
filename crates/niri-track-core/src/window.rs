//! Compositor-side descriptors returned by a [`WindowManager`](crate::WindowManager).

use serde::Deserialize;
use serde::Serialize;

pub type WindowId = u64;
pub type WorkspaceId = u64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Window {
    pub id: WindowId,
    pub title: String,
    pub app_id: String,
    pub pid: Option<u32>,
    pub workspace_id: Option<WorkspaceId>,
    /// 1-based column in the scrolling layout; `None` for floating windows.
    pub column: Option<u32>,
    pub tile_width: f64,
}

impl Window {
    pub fn is_in(&self, workspace_id: WorkspaceId) -> bool {
        self.workspace_id == Some(workspace_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    pub id: WorkspaceId,
    pub idx: u8,
    pub output: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    pub name: String,
    /// Logical width in pixels.
    pub width: u32,
}

/// Current column of `window_id`, provided it sits tiled in `workspace_id`.
pub fn column_of(windows: &[Window], window_id: WindowId, workspace_id: WorkspaceId) -> Option<u32> {
    windows
        .iter()
        .find(|w| w.id == window_id && w.is_in(workspace_id))
        .and_then(|w| w.column)
}
