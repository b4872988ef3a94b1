mod backend;
mod events;
mod rank;
mod runtime;
mod service;
mod types;

use thiserror::Error;

pub use crate::backend::{
    DeviceHandle, HostBackend, NullBackend, PadAxis, PadButton, PadKind,
};
pub use crate::events::Subscription;
pub use crate::runtime::{MIN_FLUSH_INTERVAL, POLL_INTERVAL};
pub use crate::service::CaptureService;
pub use crate::types::{
    CaptureConfig, DeviceDescriptor, InputClass, PhysicalInput,
    QueuedSnapshot, Signal, Snapshot,
};

/// Error type for capture service operations.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Failed to initialize the hardware polling backend.
    #[error("Backend init failed: {0}")]
    BackendInit(String),
    /// A candidate device could not be opened.
    #[error("Device open failed: {0}")]
    DeviceOpen(String),
}

/// Convenient result alias for capture operations.
pub type Result<T> = std::result::Result<T, CaptureError>;
