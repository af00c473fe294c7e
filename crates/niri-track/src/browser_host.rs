//! Native messaging host for the browser extension.
//!
//! The extension reports its windows with their tab URLs. Each window gets
//! a restart-stable identity from [`UrlMatcher`] and is matched to a niri
//! window by title.

use std::collections::HashSet;
use std::io::Read;
use std::io::Write;

use tracing::debug;
use tracing::info;
use tracing::warn;

use niri_track_core::App;
use niri_track_core::Window;
use niri_track_core::WindowId;
use niri_track_core::WindowManager;
use niri_track_core::url_matcher::UrlMatcher;
use niri_track_ipc::BrowserWindow;
use niri_track_ipc::HostRequest;
use niri_track_ipc::HostResponse;
use niri_track_ipc::native_messaging::read_message;
use niri_track_ipc::native_messaging::write_message;
use niri_track_store::IdentityStore;

use crate::error::AppError;
use crate::tracker::Tracker;
use crate::tracker::WorkspaceEntries;

pub const ACTION_PING: &str = "ping";
pub const ACTION_STORE: &str = "store_mappings_batch";
pub const ACTION_RESTORE: &str = "restore_workspaces";

pub struct BrowserHost<W> {
    tracker: Tracker<W>,
    identities: IdentityStore,
}

impl<W: WindowManager> BrowserHost<W> {
    pub fn new(tracker: Tracker<W>) -> Self {
        let identities = IdentityStore::open(&tracker.config.state_dir);
        Self {
            tracker,
            identities,
        }
    }

    pub fn tracker(&self) -> &Tracker<W> {
        &self.tracker
    }

    /// Answers messages until the browser closes stdin.
    pub fn run<R: Read, O: Write>(&self, input: &mut R, output: &mut O) -> Result<(), AppError> {
        info!("native messaging host started");
        while let Some(request) = read_message::<_, HostRequest>(input)? {
            let response = self.handle_message(request);
            write_message(output, &response)?;
        }
        info!("browser closed the connection");
        Ok(())
    }

    pub fn handle_message(&self, request: HostRequest) -> HostResponse {
        let HostRequest {
            action,
            request_id,
            windows,
        } = request;
        debug!(action = ?action, windows = windows.len(), "message");

        let result = match action.as_deref() {
            Some(ACTION_PING) => return HostResponse::ok(request_id),
            Some(ACTION_STORE) => self
                .handle_store(windows)
                .map(|n| HostResponse::stored(request_id.clone(), n)),
            Some(ACTION_RESTORE) => self
                .handle_restore(windows)
                .map(|n| HostResponse::moved(request_id.clone(), n)),
            other => {
                let name = other.unwrap_or("<none>");
                return HostResponse::error(request_id, format!("Unknown action: {name}"));
            }
        };

        result.unwrap_or_else(|e| {
            warn!(error = %e, "request failed");
            HostResponse::error(request_id, e.to_string())
        })
    }

    /// Records the current position of every reported window that niri
    /// shows; returns how many were stored.
    pub fn handle_store(&self, windows: Vec<BrowserWindow>) -> Result<usize, AppError> {
        let tracker = &self.tracker;
        let layout = tracker.layout()?;
        let live = self.browser_windows()?;
        let identified = self.identify(windows)?;

        let mut matched = HashSet::new();
        let mut entries = WorkspaceEntries::new();
        for (window, uuid) in identified {
            let stable_id = App::Librewolf.stable_id(&uuid);
            let Some(niri_window) = find_by_title(&live, &window.window_title, &matched) else {
                warn!(%stable_id, title = %window.window_title, "no niri window with this title");
                continue;
            };
            matched.insert(niri_window.id);

            match layout.entry_for(stable_id.clone(), niri_window) {
                Some((workspace_id, entry)) => {
                    debug!(%stable_id, window_id = niri_window.id, workspace_id, index = entry.index, "observed");
                    entries.entry(workspace_id).or_default().push(entry);
                }
                None => warn!(%stable_id, window_id = niri_window.id, "window not tiled or output unknown"),
            }
        }

        let stored = tracker.record(App::Librewolf, entries)?;
        if stored > 0 {
            tracker.prune()?;
        }
        info!(stored, "stored browser windows");
        Ok(stored)
    }

    /// Moves every reported window with a saved position back to it;
    /// returns how many were moved.
    pub fn handle_restore(&self, windows: Vec<BrowserWindow>) -> Result<usize, AppError> {
        let tracker = &self.tracker;
        let live = self.browser_windows()?;
        let identified = self.identify(windows)?;

        let mut matched = HashSet::new();
        let mut moved = 0;
        let mut placed = 0;
        for (window, uuid) in identified {
            let stable_id = App::Librewolf.stable_id(&uuid);
            let Some(saved) = tracker.store.lookup_latest_position(&stable_id)? else {
                debug!(%stable_id, "no saved position");
                continue;
            };
            let Some(niri_window) = find_by_title(&live, &window.window_title, &matched) else {
                warn!(%stable_id, title = %window.window_title, "no niri window with this title");
                continue;
            };
            matched.insert(niri_window.id);

            if tracker
                .restore_window(App::Librewolf, &stable_id, niri_window.id, saved)?
                .is_some()
            {
                placed += 1;
            }
            moved += 1;
        }

        if placed > 0 {
            tracker.prune()?;
        }
        info!(moved, placed, "restored browser windows");
        Ok(moved)
    }

    fn browser_windows(&self) -> Result<Vec<Window>, AppError> {
        let app_id = self.tracker.config.browser_app_id.to_lowercase();
        Ok(self
            .tracker
            .wm
            .list_windows()?
            .into_iter()
            .filter(|w| w.app_id.to_lowercase().contains(&app_id))
            .collect())
    }

    /// Pairs each window with its identity, matching windows with the most
    /// tabs first.
    fn identify(&self, mut windows: Vec<BrowserWindow>) -> Result<Vec<(BrowserWindow, String)>, AppError> {
        windows.sort_by_key(|w| std::cmp::Reverse(w.tabs.len()));
        let identified = self.identities.update(|file| {
            let mut matcher = UrlMatcher::from_file(std::mem::take(file));
            let uuids: Vec<String> = windows
                .iter()
                .map(|w| matcher.match_or_create(&w.urls()))
                .collect();
            *file = matcher.into_file();
            uuids
        })?;
        Ok(windows.into_iter().zip(identified).collect())
    }
}

/// First unclaimed window whose title equals `title`, else one whose title
/// starts with it (browsers may append their name).
fn find_by_title<'a>(
    windows: &'a [Window],
    title: &str,
    claimed: &HashSet<WindowId>,
) -> Option<&'a Window> {
    if title.is_empty() {
        return None;
    }
    let free = || windows.iter().filter(|w| !claimed.contains(&w.id));
    free()
        .find(|w| w.title == title)
        .or_else(|| free().find(|w| w.title.starts_with(title)))
}
