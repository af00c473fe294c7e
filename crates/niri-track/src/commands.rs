use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
pub use clap_complete::Shell;

const LONG_ABOUT: &str = r#"niri-track keeps terminal and browser windows in their niri columns.

Observers record where each window sits (workspace, column, width) into a
shared positions file. After a restart, restorers re-open the windows and
slide each one back next to the windows that used to sit on its left,
including windows of other applications.

IDENTITIES:
    tmux:<session>          tmux session attached in a terminal
    mosh:<host>:<session>   moshen session
    librewolf:<uuid>        browser window, matched by its tab URLs

EXAMPLES:
    # Record terminal positions (run periodically, e.g. from a timer)
    niri-track track

    # After login, re-attach detached tmux sessions in place
    niri-track restore tmux

    # Inspect what has been recorded
    niri-track show

ENVIRONMENT:
    NIRI_SOCKET             niri IPC socket; without it every command is a no-op
    NIRI_TRACK_STATE_DIR    where positions.json lives
    NIRI_DEBUG              1|info|debug raises the log level
    NIRI_TRACK_LOG          write logs to this file instead of stderr"#;

#[derive(Parser)]
#[command(name = "niri-track")]
#[command(author, version)]
#[command(about = "Keep windows in their niri workspace columns across restarts")]
#[command(long_about = LONG_ABOUT)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding positions.json (default: $XDG_STATE_HOME/niri)
    #[arg(long, global = true, env = "NIRI_TRACK_STATE_DIR")]
    pub state_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record the positions of tmux and mosh terminal windows
    Track,

    /// Re-open sessions and move their windows back into place
    Restore {
        #[arg(value_enum)]
        target: RestoreTarget,
    },

    /// Native messaging host for the browser extension (reads stdin)
    #[command(name = "browser-host")]
    BrowserHost {
        /// Manifest path and extension id passed by the browser
        #[arg(hide = true, trailing_var_arg = true, allow_hyphen_values = true)]
        browser_args: Vec<String>,
    },

    /// Drop snapshots of earlier boots that the current one supersedes
    Prune,

    /// Print the recorded positions as JSON
    Show,

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RestoreTarget {
    /// Attach every detached tmux session
    Tmux,
    /// Reconnect every session in the moshen sessions file
    Mosh,
}
