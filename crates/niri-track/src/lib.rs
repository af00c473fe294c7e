#![deny(clippy::all)]

pub mod browser_host;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod mosh;
pub mod process;
pub mod restore;
pub mod telemetry;
pub mod tmux;
pub mod track;
pub mod tracker;

pub use browser_host::BrowserHost;
pub use error::AppError;
pub use handlers::HandlerResult;
pub use tracker::Tracker;
