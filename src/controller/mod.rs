//! Lifecycle control over the scan engine.
//!
//! The controller is the single authority over the camera resource: it
//! reacts to the external active flag, to selection changes and to retry
//! requests, and serializes every transition so a start can never overlap a
//! stop. Decode events pass through the dedup gate on their way to the
//! caller.

mod lifecycle;
mod state;
mod surface;

pub use lifecycle::{ScanCallbacks, ScanController};
pub use state::LifecycleState;
pub use surface::{ErrorSurface, SurfacedError};
