#![deny(clippy::all)]

mod client;
mod error;
pub mod native_messaging;
pub mod wire;

pub use client::NiriClient;
pub use client::SOCKET_ENV;
pub use error::ClientError;
pub use native_messaging::BrowserTab;
pub use native_messaging::BrowserWindow;
pub use native_messaging::HostRequest;
pub use native_messaging::HostResponse;

pub type Result<T> = std::result::Result<T, ClientError>;
