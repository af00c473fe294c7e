//! Recovering a restart-stable session identity from a terminal's children.
//!
//! How the process facts are gathered is platform specific and lives in the
//! binary; everything here is a pure function of [`ProcessInfo`].

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    /// Short process name (`comm`).
    pub command: String,
    /// Full argument vector, including `argv[0]`.
    pub arguments: Vec<String>,
}

impl ProcessInfo {
    pub fn new(command: impl Into<String>, arguments: Vec<String>) -> Self {
        Self {
            command: command.into(),
            arguments,
        }
    }

    pub fn is_tmux_client(&self) -> bool {
        self.command.starts_with("tmux")
    }
}

const DEFAULT_MOSH_SESSION: &str = "main";

/// Session name targeted by a tmux client command line (`-t <session>`).
pub fn identify_tmux(proc: &ProcessInfo) -> Option<String> {
    if !proc.is_tmux_client() {
        return None;
    }
    proc.arguments
        .windows(2)
        .find(|pair| pair[0] == "-t")
        .map(|pair| pair[1].clone())
        .or_else(|| {
            proc.arguments
                .iter()
                .find_map(|arg| arg.strip_prefix("-t").filter(|s| !s.is_empty()))
                .map(str::to_string)
        })
}

/// `host:session` of a `moshen` wrapper, which may run under an interpreter.
pub fn identify_mosh(proc: &ProcessInfo) -> Option<String> {
    if proc.command != "moshen" {
        return None;
    }
    let script = proc
        .arguments
        .iter()
        .position(|arg| arg == "moshen" || arg.ends_with("/moshen"))?;

    let host = proc.arguments.get(script + 1)?;
    let session = proc
        .arguments
        .get(script + 2)
        .map_or(DEFAULT_MOSH_SESSION, String::as_str);
    Some(format!("{host}:{session}"))
}

/// IDE-embedded terminals name their tmux sessions with a 7-char hex hash.
pub fn is_ide_session(name: &str) -> bool {
    name.len() == 7 && name.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
