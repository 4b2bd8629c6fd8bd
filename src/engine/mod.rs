//! Capture+decode session lifecycle.
//!
//! The engine binds at most one capture loop to one device at a time.
//! `start` acquires the device and spawns the loop; `stop` signals it and
//! joins, so the device handle is fully released and no decode callback can
//! run after `stop` resolves.

mod scanner;
mod session;

pub use scanner::{ScanEngine, StartError, StopError};
pub use session::{DecodeCallback, FrameMissCallback, ScanSession};
