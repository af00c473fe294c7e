//! JSON shapes of the niri IPC socket.
//!
//! Only the fields the tracker reads are modelled; everything else in a
//! reply is ignored so newer compositor versions keep decoding.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use niri_track_core::Output;
use niri_track_core::Window;
use niri_track_core::Workspace;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Request {
    Windows,
    Workspaces,
    Outputs,
    Action(Action),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Action {
    FocusWindow {
        id: u64,
    },
    MoveColumnLeft {},
    MoveColumnRight {},
    MoveWindowToWorkspace {
        window_id: Option<u64>,
        reference: WorkspaceReference,
        focus: bool,
    },
    SetWindowWidth {
        id: Option<u64>,
        change: SizeChange,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum WorkspaceReference {
    Id(u64),
}

/// Proportions are percentages of the working area.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SizeChange {
    SetProportion(f64),
}

#[derive(Debug, Deserialize)]
pub enum Reply {
    Ok(Response),
    Err(String),
}

#[derive(Debug, Deserialize)]
pub enum Response {
    Handled,
    Windows(Vec<WireWindow>),
    Workspaces(Vec<WireWorkspace>),
    Outputs(BTreeMap<String, WireOutput>),
}

#[derive(Debug, Deserialize)]
pub struct WireWindow {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub app_id: Option<String>,
    #[serde(default)]
    pub pid: Option<i32>,
    #[serde(default)]
    pub workspace_id: Option<u64>,
    #[serde(default)]
    pub layout: Option<WireLayout>,
}

#[derive(Debug, Deserialize)]
pub struct WireLayout {
    /// (column, tile in column), both 1-based; absent when floating.
    #[serde(default)]
    pub pos_in_scrolling_layout: Option<(u32, u32)>,
    pub tile_size: (f64, f64),
}

#[derive(Debug, Deserialize)]
pub struct WireWorkspace {
    pub id: u64,
    pub idx: u8,
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WireOutput {
    pub name: String,
    /// `None` for disabled outputs.
    #[serde(default)]
    pub logical: Option<WireLogical>,
}

#[derive(Debug, Deserialize)]
pub struct WireLogical {
    pub width: u32,
}

impl From<WireWindow> for Window {
    fn from(w: WireWindow) -> Self {
        let (column, tile_width) = match w.layout {
            Some(layout) => (
                layout.pos_in_scrolling_layout.map(|(col, _)| col),
                layout.tile_size.0,
            ),
            None => (None, 0.0),
        };
        Window {
            id: w.id,
            title: w.title.unwrap_or_default(),
            app_id: w.app_id.unwrap_or_default(),
            pid: w.pid.and_then(|p| u32::try_from(p).ok()),
            workspace_id: w.workspace_id,
            column,
            tile_width,
        }
    }
}

impl From<WireWorkspace> for Workspace {
    fn from(w: WireWorkspace) -> Self {
        Workspace {
            id: w.id,
            idx: w.idx,
            output: w.output,
        }
    }
}

impl WireOutput {
    pub fn into_output(self) -> Option<Output> {
        self.logical.map(|logical| Output {
            name: self.name,
            width: logical.width,
        })
    }
}
