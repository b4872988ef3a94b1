mod actions;
mod binding;
mod migrate;
mod store;

use thiserror::Error;

pub use crate::actions::{default_actions, default_bindings, OutputAction};
pub use crate::binding::Binding;
pub use crate::store::ProfileStore;

/// Error type for profile storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No per-user data directory is available on this host.
    #[error("No user data directory available")]
    NoDataDir,
    /// Filesystem access failed.
    #[error("Profile I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// A profile could not be encoded for writing.
    #[error("Profile encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenient result alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
