use std::io::Write;

use tracing::debug;

use niri_track_core::RealSleeper;
use niri_track_ipc::NiriClient;
use niri_track_store::BootIdentity;
use niri_track_store::PositionStore;
use niri_track_store::TrackerConfig;

use crate::browser_host::BrowserHost;
use crate::commands::RestoreTarget;
use crate::error::AppError;
use crate::mosh;
use crate::process::ProcFs;
use crate::restore;
use crate::restore::TerminalSpawner;
use crate::tmux;
use crate::track;
use crate::tracker::Tracker;

pub type HandlerResult = Result<(), AppError>;

/// Log file of the native messaging host, relative to the state directory.
pub const BROWSER_HOST_LOG: &str = "librewolf-host.log";

pub fn handle_track(config: TrackerConfig) -> HandlerResult {
    let tracker = Tracker::new(NiriClient::from_env(), config);
    let clients = tmux::client_sessions();
    debug!(clients = clients.len(), "tmux clients");
    track::track_terminals(&tracker, &ProcFs::default(), &clients)?;
    Ok(())
}

pub fn handle_restore(config: TrackerConfig, target: RestoreTarget) -> HandlerResult {
    let spawner = TerminalSpawner::new(config.terminal.clone());
    let tracker = Tracker::new(NiriClient::from_env(), config);
    match target {
        RestoreTarget::Tmux => {
            let sessions = tmux::detached_sessions();
            restore::restore_tmux(&tracker, &spawner, &RealSleeper, &sessions)?;
        }
        RestoreTarget::Mosh => {
            let sessions = mosh::read_sessions(&tracker.config.moshen_sessions);
            restore::restore_mosh(&tracker, &spawner, &RealSleeper, &sessions)?;
        }
    }
    Ok(())
}

/// Serves the browser until it closes stdin. Works without niri: every
/// request then gets an error response instead of the host exiting.
pub fn handle_browser_host(config: TrackerConfig) -> HandlerResult {
    let host = BrowserHost::new(Tracker::new(NiriClient::from_env(), config));
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    host.run(&mut stdin.lock(), &mut stdout.lock())
}

pub fn handle_prune<O: Write>(config: &TrackerConfig, out: &mut O) -> HandlerResult {
    let boot_id = BootIdentity::new(&config.runtime_dir).get()?;
    let removed = PositionStore::open(&config.state_dir).prune_dominated(&boot_id)?;
    for id in &removed {
        writeln!(out, "removed {id}")?;
    }
    writeln!(out, "{} snapshot(s) pruned", removed.len())?;
    Ok(())
}

pub fn handle_show<O: Write>(config: &TrackerConfig, out: &mut O) -> HandlerResult {
    let state = PositionStore::open(&config.state_dir).load()?;
    let json = serde_json::to_string_pretty(&state).map_err(niri_track_store::StoreError::from)?;
    writeln!(out, "{json}")?;
    Ok(())
}
