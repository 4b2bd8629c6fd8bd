//! Ticket Scan Library
//!
//! Live video-based code scanning for ticket check-in. Acquires a camera
//! device, continuously analyzes frames for a QR/barcode, and reports each
//! physical presentation of a code to the caller exactly once, while
//! tolerating enumeration failures, permission denial and rapid device
//! switching.
//!
//! # Architecture
//!
//! The system follows an explicit data flow:
//!
//! ```text
//! device (registry/selector) → capture → decode → gate → caller
//!                                  ↑                ↑
//!                          controller (lifecycle, errors)
//! ```
//!
//! # Design Principles
//!
//! - **One session**: at most one capture loop holds a device at any
//!   instant; replacing a session tears the old one down first
//! - **Serialized transitions**: starts and stops queue, they never race
//! - **Cooldown over dedup**: after a forwarded scan, *all* decodes are
//!   dropped for the window, preventing rapid-fire duplicate submissions
//! - **Degrade, never crash**: capture failures become a retryable error
//!   state, frame misses are silent
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use ticket_scan::{
//!     capture::{MockBackend, ScanConfig},
//!     decode::QrDecoder,
//!     controller::{ScanCallbacks, ScanController},
//!     device::{CameraDevice, MockRegistry},
//! };
//!
//! # async fn run() {
//! let registry = Arc::new(MockRegistry::new(vec![
//!     CameraDevice::new("0", "Back Camera"),
//! ]));
//! let backend = Arc::new(MockBackend::new());
//! let decoder = Arc::new(QrDecoder::new());
//!
//! let callbacks = ScanCallbacks::new(|value| {
//!     println!("scanned: {value}");
//! });
//!
//! let controller = ScanController::new(
//!     registry,
//!     backend,
//!     decoder,
//!     ScanConfig::default(),
//!     callbacks,
//! );
//!
//! controller.set_active(true).await;
//! // ... decoded values arrive in the callback ...
//! controller.set_active(false).await;
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod capture;
pub mod controller;
pub mod decode;
pub mod device;
pub mod engine;
pub mod gate;
pub mod metrics;

// Re-export commonly used types at crate root
pub use capture::{CaptureBackend, CaptureDevice, CaptureError, Frame, MockBackend, ScanConfig};
pub use controller::{LifecycleState, ScanCallbacks, ScanController, SurfacedError};
pub use decode::{DecodeEvent, Decoder, QrDecoder, RegionOfInterest};
pub use device::{CameraDevice, CameraSelector, DeviceRegistry, EnumerationError, MockRegistry};
pub use engine::{ScanEngine, ScanSession, StartError, StopError};
pub use gate::DedupGate;
pub use metrics::{ScanStats, StatsSnapshot};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
