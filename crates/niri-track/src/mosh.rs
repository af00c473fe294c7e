//! Saved `moshen` sessions.
//!
//! The sessions file holds one `base64(host):base64(session)` pair per line.

use std::fs;
use std::io;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoshSession {
    pub host: String,
    pub session: String,
}

impl MoshSession {
    /// Identity as recovered from a running `moshen` process.
    pub fn identity(&self) -> String {
        format!("{}:{}", self.host, self.session)
    }

    /// Terminal command that asks before connecting, so authentication can
    /// happen when the user gets to the window.
    pub fn connect_command(&self) -> Vec<String> {
        vec![
            "bash".to_string(),
            "-c".to_string(),
            r#"read -p "Press enter to connect to $1" && exec moshen "$1" "$2""#.to_string(),
            "--".to_string(),
            self.host.clone(),
            self.session.clone(),
        ]
    }
}

/// Lines that fail to decode are skipped.
pub fn parse_sessions(contents: &str) -> Vec<MoshSession> {
    contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let mut parts = line.trim().split(':');
            let host = decode(parts.next()?)?;
            let session = decode(parts.next()?)?;
            Some(MoshSession { host, session })
        })
        .collect()
}

pub fn read_sessions(path: &Path) -> Vec<MoshSession> {
    match fs::read_to_string(path) {
        Ok(contents) => parse_sessions(&contents),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no moshen sessions file");
            Vec::new()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "unreadable moshen sessions file");
            Vec::new()
        }
    }
}

fn decode(field: &str) -> Option<String> {
    let bytes = STANDARD.decode(field).ok()?;
    let text = String::from_utf8(bytes).ok()?;
    Some(text.trim().to_string())
}
