use std::collections::HashMap;
use std::process::Command;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

// "/dev/pts/146: work [152x99 alacritty] (attached,UTF-8)"
static CLIENT_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(/dev/[^:]+):\s+(\S+)").expect("Invalid tmux client regex"));

/// tty path to session name, from `tmux list-clients` output.
pub fn parse_client_sessions(output: &str) -> HashMap<String, String> {
    output
        .lines()
        .filter_map(|line| CLIENT_LINE.captures(line))
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .collect()
}

pub fn parse_session_names(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Attached clients by tty; empty when no tmux server is running.
pub fn client_sessions() -> HashMap<String, String> {
    tmux(&["list-clients"])
        .map(|out| parse_client_sessions(&out))
        .unwrap_or_default()
}

/// Names of sessions with no client attached.
pub fn detached_sessions() -> Vec<String> {
    tmux(&[
        "list-sessions",
        "-F",
        "#{session_name}",
        "-f",
        "#{?#{session_attached},0,1}",
    ])
    .map(|out| parse_session_names(&out))
    .unwrap_or_default()
}

pub fn attach_command(session: &str) -> Vec<String> {
    ["tmux", "attach-session", "-t", session]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn tmux(args: &[&str]) -> Option<String> {
    match Command::new("tmux").args(args).output() {
        Ok(out) if out.status.success() => Some(String::from_utf8_lossy(&out.stdout).into_owned()),
        Ok(out) => {
            debug!(?args, status = %out.status, "tmux returned failure");
            None
        }
        Err(e) => {
            debug!(?args, error = %e, "tmux unavailable");
            None
        }
    }
}
