#![deny(clippy::all)]

mod error;
pub mod identify;
mod mock_wm;
mod model;
mod placement;
mod ports;
mod predecessors;
mod retention;
mod sleeper;
mod upsert;
pub mod url_matcher;
mod wait;
mod window;

pub use error::AdapterError;
pub use mock_wm::MockWindowManager;
pub use model::App;
pub use model::BootSnapshot;
pub use model::PositionEntry;
pub use model::STORE_VERSION;
pub use model::SavedPosition;
pub use model::StoreState;
pub use model::width_percent;
pub use placement::DEFAULT_SPACER_APP_ID;
pub use placement::PlacementOutcome;
pub use placement::PlacementRequest;
pub use placement::Placer;
pub use placement::SPACER_ID;
pub use ports::WindowManager;
pub use ports::configure;
pub use predecessors::current_handles;
pub use predecessors::find_predecessors;
pub use predecessors::lookup_latest_position;
pub use retention::dominates;
pub use retention::prune;
pub use sleeper::MockSleeper;
pub use sleeper::RealSleeper;
pub use sleeper::Sleeper;
pub use upsert::reindex;
pub use upsert::upsert;
pub use wait::DEFAULT_POLL_INTERVAL;
pub use wait::DEFAULT_WAIT_TIMEOUT;
pub use wait::PollSchedule;
pub use wait::WaitOutcome;
pub use wait::wait_for_window;
pub use window::Output;
pub use window::Window;
pub use window::WindowId;
pub use window::Workspace;
pub use window::WorkspaceId;
pub use window::column_of;
