use crate::error::AdapterError;
use crate::window::Output;
use crate::window::Window;
use crate::window::WindowId;
use crate::window::Workspace;
use crate::window::WorkspaceId;

/// Query/command boundary into the compositor.
///
/// All calls are synchronous round trips. Column moves act on the focused
/// window, so callers focus first.
pub trait WindowManager {
    fn list_windows(&self) -> Result<Vec<Window>, AdapterError>;

    fn list_workspaces(&self) -> Result<Vec<Workspace>, AdapterError>;

    fn list_outputs(&self) -> Result<Vec<Output>, AdapterError>;

    fn focus(&self, window_id: WindowId) -> Result<(), AdapterError>;

    fn move_column_left(&self) -> Result<(), AdapterError>;

    fn move_column_right(&self) -> Result<(), AdapterError>;

    fn move_to_workspace(
        &self,
        window_id: WindowId,
        workspace_id: WorkspaceId,
    ) -> Result<(), AdapterError>;

    /// Sets the window width as a percentage of its output.
    fn set_width(&self, window_id: WindowId, percent: u8) -> Result<(), AdapterError>;
}

impl<T: WindowManager + ?Sized> WindowManager for &T {
    fn list_windows(&self) -> Result<Vec<Window>, AdapterError> {
        (**self).list_windows()
    }

    fn list_workspaces(&self) -> Result<Vec<Workspace>, AdapterError> {
        (**self).list_workspaces()
    }

    fn list_outputs(&self) -> Result<Vec<Output>, AdapterError> {
        (**self).list_outputs()
    }

    fn focus(&self, window_id: WindowId) -> Result<(), AdapterError> {
        (**self).focus(window_id)
    }

    fn move_column_left(&self) -> Result<(), AdapterError> {
        (**self).move_column_left()
    }

    fn move_column_right(&self) -> Result<(), AdapterError> {
        (**self).move_column_right()
    }

    fn move_to_workspace(
        &self,
        window_id: WindowId,
        workspace_id: WorkspaceId,
    ) -> Result<(), AdapterError> {
        (**self).move_to_workspace(window_id, workspace_id)
    }

    fn set_width(&self, window_id: WindowId, percent: u8) -> Result<(), AdapterError> {
        (**self).set_width(window_id, percent)
    }
}

/// Moves a window to a workspace and resizes it, skipping unset parts.
pub fn configure<W: WindowManager + ?Sized>(
    wm: &W,
    window_id: WindowId,
    workspace_id: Option<WorkspaceId>,
    width: Option<u8>,
) -> Result<(), AdapterError> {
    if let Some(workspace_id) = workspace_id {
        wm.move_to_workspace(window_id, workspace_id)?;
    }
    if let Some(width) = width {
        wm.set_width(window_id, width)?;
    }
    Ok(())
}
