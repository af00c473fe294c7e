//! Recording where terminal sessions currently sit.

use std::collections::HashMap;

use tracing::debug;
use tracing::info;

use niri_track_core::App;
use niri_track_core::WindowManager;
use niri_track_core::identify::identify_mosh;
use niri_track_core::identify::identify_tmux;

use crate::error::AppError;
use crate::process::ProcessTable;
use crate::tracker::Tracker;
use crate::tracker::WorkspaceEntries;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackReport {
    pub tmux: usize,
    pub mosh: usize,
    pub pruned: usize,
}

/// Scans terminal windows for tmux and mosh sessions and records them.
///
/// `tmux_clients` maps client ttys to session names. A tmux client whose tty
/// is unknown falls back to the `-t` target on its command line.
pub fn track_terminals<W, P>(
    tracker: &Tracker<W>,
    procs: &P,
    tmux_clients: &HashMap<String, String>,
) -> Result<TrackReport, AppError>
where
    W: WindowManager,
    P: ProcessTable + ?Sized,
{
    let layout = tracker.layout()?;
    let terminal_app_id = tracker.config.terminal_app_id.as_str();

    let mut tmux = WorkspaceEntries::new();
    let mut mosh = WorkspaceEntries::new();

    for window in tracker.wm.list_windows()? {
        if window.app_id != terminal_app_id {
            continue;
        }
        let Some(pid) = window.pid else {
            continue;
        };

        for child in procs.children(pid) {
            let found = if child.info.is_tmux_client() {
                procs
                    .tty(child.pid)
                    .and_then(|tty| tmux_clients.get(&tty).cloned())
                    .or_else(|| identify_tmux(&child.info))
                    .map(|session| (App::Tmux, session))
            } else {
                identify_mosh(&child.info).map(|identity| (App::Mosh, identity))
            };
            let Some((app, identity)) = found else {
                continue;
            };

            let stable_id = app.stable_id(&identity);
            match layout.entry_for(stable_id.clone(), &window) {
                Some((workspace_id, entry)) => {
                    debug!(%stable_id, window_id = window.id, workspace_id, index = entry.index, "observed");
                    let target = if app == App::Tmux { &mut tmux } else { &mut mosh };
                    target.entry(workspace_id).or_default().push(entry);
                }
                None => debug!(%stable_id, window_id = window.id, "not tiled, skipping"),
            }
            break;
        }
    }

    let report = TrackReport {
        tmux: tracker.record(App::Tmux, tmux)?,
        mosh: tracker.record(App::Mosh, mosh)?,
        pruned: tracker.prune()?.len(),
    };
    info!(tmux = report.tmux, mosh = report.mosh, pruned = report.pruned, "tracked terminals");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::tests::FakeProcesses;
    use crate::tracker::tests::{WS, config, mock_wm};
    use tempfile::TempDir;

    #[test]
    fn test_tracks_tmux_and_mosh_windows() {
        let dir = TempDir::new().unwrap();
        let wm = mock_wm();
        let tracker = Tracker::new(&wm, config(&dir));

        let t1 = wm.add_window(WS, "tmux", Some(100), "Alacritty");
        let m1 = wm.add_window(WS, "mosh", Some(200), "Alacritty");
        wm.add_window(WS, "browser", Some(300), "librewolf");
        wm.add_window(2, "plain shell", Some(400), "Alacritty");

        let mut procs = FakeProcesses::default();
        procs.add_child(100, 101, "tmux: client", &["tmux", "attach"]);
        procs.ttys.insert(101, "/dev/pts/7".into());
        procs.add_child(200, 201, "moshen", &["bash", "/home/u/bin/moshen", "box", "irc"]);
        procs.add_child(400, 401, "zsh", &["-zsh"]);
        let clients = HashMap::from([("/dev/pts/7".to_string(), "work".to_string())]);

        let report = track_terminals(&tracker, &procs, &clients).unwrap();

        assert_eq!(report, TrackReport { tmux: 1, mosh: 1, pruned: 0 });
        let state = tracker.store.load().unwrap();
        let boot = state.boot(&tracker.boot_id().unwrap()).unwrap();
        let (ws, tmux) = boot.find("tmux:work").unwrap();
        assert_eq!((ws, tmux.window_id, tmux.index, tmux.width), (WS, t1, 1, 50));
        let (_, mosh) = boot.find("mosh:box:irc").unwrap();
        assert_eq!((mosh.window_id, mosh.index), (m1, 2));
        assert!(boot.has_app(App::Tmux) && boot.has_app(App::Mosh));
    }

    #[test]
    fn test_tmux_without_known_tty_uses_target_flag() {
        let dir = TempDir::new().unwrap();
        let wm = mock_wm();
        let tracker = Tracker::new(&wm, config(&dir));
        wm.add_window(WS, "tmux", Some(100), "Alacritty");

        let mut procs = FakeProcesses::default();
        procs.add_child(100, 101, "tmux: client", &["tmux", "attach-session", "-t", "notes"]);

        let report = track_terminals(&tracker, &procs, &HashMap::new()).unwrap();

        assert_eq!(report.tmux, 1);
        assert!(tracker.store.load().unwrap().boots.values().any(|b| b.find("tmux:notes").is_some()));
    }

    #[test]
    fn test_no_sessions_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let wm = mock_wm();
        let tracker = Tracker::new(&wm, config(&dir));
        wm.add_window(WS, "shell", Some(100), "Alacritty");

        let report = track_terminals(&tracker, &FakeProcesses::default(), &HashMap::new()).unwrap();

        assert_eq!(report, TrackReport::default());
        assert!(!tracker.store.path().exists());
    }

    #[test]
    fn test_not_running_propagates() {
        let dir = TempDir::new().unwrap();
        let wm = mock_wm();
        wm.fail_with_not_running();
        let tracker = Tracker::new(&wm, config(&dir));

        let err = track_terminals(&tracker, &FakeProcesses::default(), &HashMap::new()).unwrap_err();
        assert!(err.is_not_running());
    }
}
