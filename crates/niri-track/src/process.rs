//! Process facts read from procfs.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use niri_track_core::identify::ProcessInfo;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildProcess {
    pub pid: u32,
    pub info: ProcessInfo,
}

/// Read-only view of the running processes.
pub trait ProcessTable {
    /// Direct children of `pid`, lowest pid first.
    fn children(&self, pid: u32) -> Vec<ChildProcess>;

    /// Terminal device behind the process's stdin, e.g. `/dev/pts/4`.
    fn tty(&self, pid: u32) -> Option<String>;
}

#[derive(Debug, Clone)]
pub struct ProcFs {
    root: PathBuf,
}

impl Default for ProcFs {
    fn default() -> Self {
        Self::new("/proc")
    }
}

impl ProcFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn info(&self, pid: u32) -> Option<ProcessInfo> {
        let dir = self.root.join(pid.to_string());
        let command = fs::read_to_string(dir.join("comm")).ok()?;
        let command = command.trim_end_matches('\n');
        if command.is_empty() {
            return None;
        }
        let arguments = fs::read(dir.join("cmdline"))
            .map(|raw| parse_cmdline(&raw))
            .unwrap_or_default();
        Some(ProcessInfo::new(command, arguments))
    }
}

impl ProcessTable for ProcFs {
    fn children(&self, pid: u32) -> Vec<ChildProcess> {
        let Ok(entries) = fs::read_dir(&self.root) else {
            return Vec::new();
        };
        let mut pids: Vec<u32> = entries
            .filter_map(Result::ok)
            .filter_map(|e| e.file_name().to_str()?.parse::<u32>().ok())
            .filter(|child| parent_of(&self.root, *child) == Some(pid))
            .collect();
        pids.sort_unstable();

        pids.into_iter()
            .filter_map(|pid| Some(ChildProcess { pid, info: self.info(pid)? }))
            .collect()
    }

    fn tty(&self, pid: u32) -> Option<String> {
        let link = fs::read_link(self.root.join(pid.to_string()).join("fd").join("0")).ok()?;
        Some(link.to_string_lossy().into_owned())
    }
}

fn parent_of(root: &Path, pid: u32) -> Option<u32> {
    let stat = fs::read_to_string(root.join(pid.to_string()).join("stat")).ok()?;
    parse_stat_ppid(&stat)
}

/// Parent pid from a `/proc/<pid>/stat` line. The command field may hold
/// spaces and parentheses, so parsing starts after its last `)`.
pub fn parse_stat_ppid(stat: &str) -> Option<u32> {
    let rest = &stat[stat.rfind(')')? + 1..];
    let mut fields = rest.split_whitespace();
    let _state = fields.next()?;
    fields.next()?.parse().ok()
}

pub fn parse_cmdline(raw: &[u8]) -> Vec<String> {
    raw.split(|b| *b == 0)
        .filter(|arg| !arg.is_empty())
        .map(|arg| String::from_utf8_lossy(arg).into_owned())
        .collect()
}
