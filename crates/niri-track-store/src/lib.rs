#![deny(clippy::all)]

mod boot;
mod config;
mod error;
mod file_lock;
mod identities;
mod store;

pub use boot::BOOT_ID_FILE;
pub use boot::BOOT_ID_LOCK_FILE;
pub use boot::BootIdentity;
pub use config::TrackerConfig;
pub use error::StoreError;
pub use file_lock::FileLockProvider;
pub use file_lock::LockFile;
pub use file_lock::LockProvider;
pub use file_lock::NoLock;
pub use identities::IDENTITIES_FILE;
pub use identities::IdentityStore;
pub use store::POSITIONS_FILE;
pub use store::POSITIONS_LOCK_FILE;
pub use store::PlacementContext;
pub use store::PositionStore;
