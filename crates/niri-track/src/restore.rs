//! Re-opening terminal sessions where they used to be.

use std::process::Child;
use std::process::Command;
use std::process::Stdio;
use std::sync::Mutex;

use tracing::info;
use tracing::warn;

use niri_track_core::App;
use niri_track_core::Sleeper;
use niri_track_core::WaitOutcome;
use niri_track_core::WindowManager;
use niri_track_core::identify::is_ide_session;
use niri_track_core::wait_for_window;

use crate::error::AppError;
use crate::mosh::MoshSession;
use crate::tmux;
use crate::tracker::Tracker;

/// Opens a terminal window running a command; returns the terminal's pid.
pub trait Spawner {
    fn spawn(&self, command: &[String]) -> Result<u32, AppError>;
}

/// Runs `<terminal> -e <command>`.
#[derive(Debug)]
pub struct TerminalSpawner {
    terminal: String,
    children: Mutex<Vec<Child>>,
}

impl TerminalSpawner {
    pub fn new(terminal: impl Into<String>) -> Self {
        Self {
            terminal: terminal.into(),
            children: Mutex::new(Vec::new()),
        }
    }
}

impl Spawner for TerminalSpawner {
    fn spawn(&self, command: &[String]) -> Result<u32, AppError> {
        let child = Command::new(&self.terminal)
            .arg("-e")
            .args(command)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| AppError::Spawn {
                command: self.terminal.clone(),
                source,
            })?;
        let pid = child.id();
        // Terminals outlive this process; keep the handles so nothing is
        // reaped or killed early.
        self.children
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(child);
        Ok(pid)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub spawned: usize,
    pub placed: usize,
    pub timed_out: usize,
}

/// Attaches every detached tmux session in its own terminal.
pub fn restore_tmux<W, S, Z>(
    tracker: &Tracker<W>,
    spawner: &S,
    sleeper: &Z,
    sessions: &[String],
) -> Result<RestoreReport, AppError>
where
    W: WindowManager,
    S: Spawner + ?Sized,
    Z: Sleeper + ?Sized,
{
    // Fail before spawning anything when niri is not reachable.
    tracker.wm.list_workspaces()?;

    let mut report = RestoreReport::default();
    for session in sessions {
        if is_ide_session(session) {
            continue;
        }
        restore_one(
            tracker,
            spawner,
            sleeper,
            App::Tmux,
            session,
            &tmux::attach_command(session),
            &mut report,
        )?;
    }
    finish(tracker, App::Tmux, report)
}

/// Re-opens every saved mosh session behind a confirmation prompt.
pub fn restore_mosh<W, S, Z>(
    tracker: &Tracker<W>,
    spawner: &S,
    sleeper: &Z,
    sessions: &[MoshSession],
) -> Result<RestoreReport, AppError>
where
    W: WindowManager,
    S: Spawner + ?Sized,
    Z: Sleeper + ?Sized,
{
    tracker.wm.list_workspaces()?;

    let mut report = RestoreReport::default();
    for session in sessions {
        restore_one(
            tracker,
            spawner,
            sleeper,
            App::Mosh,
            &session.identity(),
            &session.connect_command(),
            &mut report,
        )?;
    }
    finish(tracker, App::Mosh, report)
}

fn restore_one<W, S, Z>(
    tracker: &Tracker<W>,
    spawner: &S,
    sleeper: &Z,
    app: App,
    identity: &str,
    command: &[String],
    report: &mut RestoreReport,
) -> Result<(), AppError>
where
    W: WindowManager,
    S: Spawner + ?Sized,
    Z: Sleeper + ?Sized,
{
    let stable_id = app.stable_id(identity);
    let saved = tracker.store.lookup_latest_position(&stable_id)?;
    let pid = spawner.spawn(command)?;
    report.spawned += 1;

    let Some(saved) = saved else {
        info!(%stable_id, pid, "no saved position, leaving window where it opened");
        return Ok(());
    };

    match wait_for_window(&tracker.wm, sleeper, pid, tracker.config.poll_schedule())? {
        WaitOutcome::Found(window_id) => {
            if tracker
                .restore_window(app, &stable_id, window_id, saved)?
                .is_some()
            {
                report.placed += 1;
            }
        }
        WaitOutcome::TimedOut => {
            warn!(%stable_id, pid, "window did not appear in time");
            report.timed_out += 1;
        }
    }
    Ok(())
}

fn finish<W: WindowManager>(
    tracker: &Tracker<W>,
    app: App,
    report: RestoreReport,
) -> Result<RestoreReport, AppError> {
    if report.placed > 0 {
        tracker.prune()?;
    }
    info!(
        %app,
        spawned = report.spawned,
        placed = report.placed,
        timed_out = report.timed_out,
        "restore finished"
    );
    Ok(report)
}
