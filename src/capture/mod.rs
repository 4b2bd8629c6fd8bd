//! Device acquisition and frame delivery.
//!
//! This module provides the trait seam between the scan engine and camera
//! hardware. The backend hands out exclusively-held devices; a device hands
//! out frames until released. Frames are grayscale byte buffers, which is
//! all the decoder needs.

mod backend;
mod config;
mod frame;

#[cfg(feature = "camera")]
mod nokhwa;

pub use backend::{
    CaptureBackend, CaptureDevice, CaptureError, HandleEvent, HandleLedger, MockBackend,
};
pub use config::{ConfigError, ExporterConfig, FileConfig, ScanConfig};
pub use frame::Frame;

#[cfg(feature = "camera")]
pub use self::nokhwa::NokhwaBackend;
