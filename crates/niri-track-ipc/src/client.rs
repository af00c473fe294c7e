use std::io::BufRead;
use std::io::BufReader;
use std::io::Write;
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use tracing::trace;

use niri_track_core::AdapterError;
use niri_track_core::Output;
use niri_track_core::Window;
use niri_track_core::WindowId;
use niri_track_core::WindowManager;
use niri_track_core::Workspace;
use niri_track_core::WorkspaceId;

use crate::error::ClientError;
use crate::wire::Action;
use crate::wire::Reply;
use crate::wire::Request;
use crate::wire::Response;
use crate::wire::SizeChange;
use crate::wire::WireOutput;
use crate::wire::WorkspaceReference;

pub const SOCKET_ENV: &str = "NIRI_SOCKET";

const READ_TIMEOUT: Duration = Duration::from_secs(5);
const WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Synchronous client for the niri IPC socket.
///
/// Every request opens its own connection, sends one JSON line and reads
/// one JSON line back.
#[derive(Debug, Clone)]
pub struct NiriClient {
    socket: Option<PathBuf>,
}

impl NiriClient {
    /// Client for the socket named by `$NIRI_SOCKET`. Outside a niri session
    /// every request fails with [`ClientError::NotRunning`].
    pub fn from_env() -> Self {
        Self {
            socket: std::env::var_os(SOCKET_ENV)
                .filter(|path| !path.is_empty())
                .map(PathBuf::from),
        }
    }

    pub fn new(socket: impl Into<PathBuf>) -> Self {
        Self {
            socket: Some(socket.into()),
        }
    }

    pub fn socket_path(&self) -> Option<&Path> {
        self.socket.as_deref()
    }

    pub fn call(&self, request: &Request) -> Result<Response, ClientError> {
        let socket = self
            .socket
            .as_deref()
            .ok_or_else(|| ClientError::NotRunning(format!("{SOCKET_ENV} not set")))?;
        let mut stream = UnixStream::connect(socket).map_err(|e| {
            ClientError::NotRunning(format!("cannot connect to {}: {e}", socket.display()))
        })?;
        stream.set_read_timeout(Some(READ_TIMEOUT))?;
        stream.set_write_timeout(Some(WRITE_TIMEOUT))?;

        let request_json = serde_json::to_string(request)?;
        trace!(request = %request_json, "niri request");
        writeln!(stream, "{}", request_json)?;
        stream.flush()?;

        let mut reader = BufReader::new(&stream);
        let mut reply_line = String::new();
        reader.read_line(&mut reply_line)?;
        trace!(reply = %reply_line.trim_end(), "niri reply");

        match serde_json::from_str(&reply_line)? {
            Reply::Ok(response) => Ok(response),
            Reply::Err(message) => Err(ClientError::Compositor(message)),
        }
    }

    fn action(&self, action: Action) -> Result<(), ClientError> {
        match self.call(&Request::Action(action))? {
            Response::Handled => Ok(()),
            _ => Err(ClientError::UnexpectedReply { expected: "Handled" }),
        }
    }
}

impl WindowManager for NiriClient {
    fn list_windows(&self) -> Result<Vec<Window>, AdapterError> {
        match self.call(&Request::Windows)? {
            Response::Windows(windows) => Ok(windows.into_iter().map(Window::from).collect()),
            _ => Err(ClientError::UnexpectedReply { expected: "Windows" }.into()),
        }
    }

    fn list_workspaces(&self) -> Result<Vec<Workspace>, AdapterError> {
        match self.call(&Request::Workspaces)? {
            Response::Workspaces(workspaces) => {
                Ok(workspaces.into_iter().map(Workspace::from).collect())
            }
            _ => Err(ClientError::UnexpectedReply { expected: "Workspaces" }.into()),
        }
    }

    fn list_outputs(&self) -> Result<Vec<Output>, AdapterError> {
        match self.call(&Request::Outputs)? {
            Response::Outputs(outputs) => Ok(outputs
                .into_values()
                .filter_map(WireOutput::into_output)
                .collect()),
            _ => Err(ClientError::UnexpectedReply { expected: "Outputs" }.into()),
        }
    }

    fn focus(&self, window_id: WindowId) -> Result<(), AdapterError> {
        Ok(self.action(Action::FocusWindow { id: window_id })?)
    }

    fn move_column_left(&self) -> Result<(), AdapterError> {
        Ok(self.action(Action::MoveColumnLeft {})?)
    }

    fn move_column_right(&self) -> Result<(), AdapterError> {
        Ok(self.action(Action::MoveColumnRight {})?)
    }

    fn move_to_workspace(
        &self,
        window_id: WindowId,
        workspace_id: WorkspaceId,
    ) -> Result<(), AdapterError> {
        Ok(self.action(Action::MoveWindowToWorkspace {
            window_id: Some(window_id),
            reference: WorkspaceReference::Id(workspace_id),
            focus: false,
        })?)
    }

    fn set_width(&self, window_id: WindowId, percent: u8) -> Result<(), AdapterError> {
        Ok(self.action(Action::SetWindowWidth {
            id: Some(window_id),
            change: SizeChange::SetProportion(f64::from(percent)),
        })?)
    }
}
