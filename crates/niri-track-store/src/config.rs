use std::env;
use std::path::PathBuf;
use std::time::Duration;

use niri_track_core::DEFAULT_POLL_INTERVAL;
use niri_track_core::DEFAULT_SPACER_APP_ID;
use niri_track_core::DEFAULT_WAIT_TIMEOUT;
use niri_track_core::PollSchedule;

const DEFAULT_TERMINAL: &str = "alacritty";
const DEFAULT_TERMINAL_APP_ID: &str = "Alacritty";
const DEFAULT_BROWSER_APP_ID: &str = "librewolf";

#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Holds `positions.json`, its lock and the browser identities.
    pub state_dir: PathBuf,
    /// Cleared on reboot; holds the boot identity file.
    pub runtime_dir: PathBuf,
    pub moshen_sessions: PathBuf,
    /// Terminal emulator used to re-spawn sessions.
    pub terminal: String,
    pub terminal_app_id: String,
    pub browser_app_id: String,
    pub spacer_app_id: String,
    pub wait_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl TrackerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| var(key).filter(|v| !v.is_empty());

        let home = var("HOME").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("/"));
        let state_home = var("XDG_STATE_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(".local").join("state"));

        Self {
            state_dir: var("NIRI_TRACK_STATE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| state_home.join("niri")),
            runtime_dir: var("XDG_RUNTIME_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(default_runtime_dir),
            moshen_sessions: state_home.join("moshen").join("sessions"),
            terminal: var("TERMINAL").unwrap_or_else(|| DEFAULT_TERMINAL.to_string()),
            terminal_app_id: var("NIRI_TRACK_TERMINAL_APP_ID")
                .unwrap_or_else(|| DEFAULT_TERMINAL_APP_ID.to_string()),
            browser_app_id: var("NIRI_TRACK_BROWSER_APP_ID")
                .unwrap_or_else(|| DEFAULT_BROWSER_APP_ID.to_string()),
            spacer_app_id: var("NIRI_TRACK_SPACER_APP_ID")
                .unwrap_or_else(|| DEFAULT_SPACER_APP_ID.to_string()),
            wait_timeout: var("NIRI_TRACK_WAIT_TIMEOUT_MS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_WAIT_TIMEOUT),
            poll_interval: var("NIRI_TRACK_POLL_MS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_POLL_INTERVAL),
        }
    }

    pub fn poll_schedule(&self) -> PollSchedule {
        PollSchedule::new(self.poll_interval, self.wait_timeout)
    }

    pub fn with_state_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.state_dir = dir.into();
        self
    }

    pub fn with_runtime_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.runtime_dir = dir.into();
        self
    }

    pub fn with_moshen_sessions(mut self, path: impl Into<PathBuf>) -> Self {
        self.moshen_sessions = path.into();
        self
    }

    pub fn with_terminal(mut self, terminal: impl Into<String>) -> Self {
        self.terminal = terminal.into();
        self
    }

    pub fn with_spacer_app_id(mut self, app_id: impl Into<String>) -> Self {
        self.spacer_app_id = app_id.into();
        self
    }

    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

fn default_runtime_dir() -> PathBuf {
    // SAFETY: getuid has no preconditions and cannot fail
    let uid = unsafe { libc::getuid() };
    PathBuf::from(format!("/run/user/{uid}"))
}
