//! Browser native messaging: each message is a 4-byte native-endian length
//! followed by that many bytes of UTF-8 JSON.

use std::io;
use std::io::Read;
use std::io::Write;

use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ClientError;

/// Largest message a host may send to the browser.
pub const MAX_OUTGOING_FRAME: usize = 1024 * 1024;

/// Largest message accepted from the browser; checked before allocating.
pub const MAX_INCOMING_FRAME: usize = 64 * 1024 * 1024;

/// Reads one frame; `None` on a clean EOF before the length prefix.
pub fn read_frame<R: Read>(reader: &mut R) -> Result<Option<Vec<u8>>, ClientError> {
    let mut len_buf = [0u8; 4];
    let mut filled = 0;
    while filled < len_buf.len() {
        match reader.read(&mut len_buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into()),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }

    let len = u32::from_ne_bytes(len_buf) as usize;
    if len > MAX_INCOMING_FRAME {
        return Err(ClientError::FrameTooLarge(len));
    }
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload)?;
    Ok(Some(payload))
}

pub fn write_frame<W: Write>(writer: &mut W, payload: &[u8]) -> Result<(), ClientError> {
    if payload.len() > MAX_OUTGOING_FRAME {
        return Err(ClientError::FrameTooLarge(payload.len()));
    }
    let len = payload.len() as u32;
    writer.write_all(&len.to_ne_bytes())?;
    writer.write_all(payload)?;
    writer.flush()?;
    Ok(())
}

pub fn read_message<R: Read, T: DeserializeOwned>(
    reader: &mut R,
) -> Result<Option<T>, ClientError> {
    match read_frame(reader)? {
        Some(payload) => Ok(Some(serde_json::from_slice(&payload)?)),
        None => Ok(None),
    }
}

pub fn write_message<W: Write, T: Serialize>(writer: &mut W, message: &T) -> Result<(), ClientError> {
    let payload = serde_json::to_vec(message)?;
    write_frame(writer, &payload)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrowserTab {
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrowserWindow {
    #[serde(default)]
    pub window_title: String,
    #[serde(default)]
    pub tabs: Vec<BrowserTab>,
}

impl BrowserWindow {
    pub fn urls(&self) -> Vec<String> {
        self.tabs.iter().map(|t| t.url.clone()).collect()
    }
}

/// A request from the browser extension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostRequest {
    #[serde(default)]
    pub action: Option<String>,
    /// Echoed back untouched.
    #[serde(default)]
    pub request_id: Option<Value>,
    #[serde(default)]
    pub windows: Vec<BrowserWindow>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostResponse {
    pub success: bool,
    pub request_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stored_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moved_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HostResponse {
    pub fn ok(request_id: Option<Value>) -> Self {
        Self {
            success: true,
            request_id,
            ..Self::default()
        }
    }

    pub fn stored(request_id: Option<Value>, count: usize) -> Self {
        Self {
            stored_count: Some(count),
            ..Self::ok(request_id)
        }
    }

    pub fn moved(request_id: Option<Value>, count: usize) -> Self {
        Self {
            moved_count: Some(count),
            ..Self::ok(request_id)
        }
    }

    pub fn error(request_id: Option<Value>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            request_id,
            error: Some(error.into()),
            ..Self::default()
        }
    }
}
