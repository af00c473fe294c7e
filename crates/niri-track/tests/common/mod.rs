#![allow(dead_code)]

use std::path::Path;

use assert_cmd::Command;
use tempfile::TempDir;

pub fn niri_track_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("niri-track"))
}

/// A command isolated from the user's niri session and state.
pub fn isolated_cmd(dir: &TempDir) -> Command {
    let mut cmd = niri_track_cmd();
    cmd.env_remove("NIRI_SOCKET")
        .env_remove("RUST_LOG")
        .env_remove("NIRI_DEBUG")
        .env_remove("NIRI_TRACK_LOG")
        .env("NIRI_TRACK_STATE_DIR", dir.path().join("state"))
        .env("XDG_RUNTIME_DIR", dir.path().join("run"))
        .env("XDG_STATE_HOME", dir.path().join("xdg-state"))
        .env("HOME", dir.path());
    cmd
}

pub fn write_boot_id(dir: &TempDir, id: &str) {
    let run = dir.path().join("run");
    std::fs::create_dir_all(&run).unwrap();
    std::fs::write(run.join("niri-tracker-boot"), id).unwrap();
}

pub fn write_positions(dir: &TempDir, json: &str) {
    let state = dir.path().join("state");
    std::fs::create_dir_all(&state).unwrap();
    std::fs::write(state.join("positions.json"), json).unwrap();
}

pub fn read_positions(dir: &TempDir) -> serde_json::Value {
    let raw = std::fs::read(dir.path().join("state").join("positions.json")).unwrap();
    serde_json::from_slice(&raw).unwrap()
}

/// Frames a JSON value for native messaging.
pub fn frame(value: &serde_json::Value) -> Vec<u8> {
    let body = serde_json::to_vec(value).unwrap();
    let mut out = (body.len() as u32).to_ne_bytes().to_vec();
    out.extend(body);
    out
}

/// Splits native messaging output into JSON values.
pub fn unframe(mut bytes: &[u8]) -> Vec<serde_json::Value> {
    let mut out = Vec::new();
    while bytes.len() >= 4 {
        let len = u32::from_ne_bytes(bytes[..4].try_into().unwrap()) as usize;
        out.push(serde_json::from_slice(&bytes[4..4 + len]).unwrap());
        bytes = &bytes[4 + len..];
    }
    out
}

pub fn exists(path: &Path) -> bool {
    path.exists()
}
