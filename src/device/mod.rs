//! Camera device enumeration and selection.
//!
//! The registry answers "which cameras exist" exactly once per mount; the
//! selector is pure logic over that answer. Neither talks to the capture
//! layer directly.

mod registry;
mod selector;

pub use registry::{CameraDevice, DeviceRegistry, EnumerationError, MockRegistry};
pub use selector::CameraSelector;

#[cfg(feature = "camera")]
pub use registry::NokhwaRegistry;
