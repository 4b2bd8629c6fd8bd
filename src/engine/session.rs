//! Session descriptor and callback types.

use crate::capture::ScanConfig;
use crate::decode::DecodeEvent;
use std::time::Instant;

/// Callback invoked for every recognized frame.
pub type DecodeCallback = Box<dyn FnMut(DecodeEvent) + Send>;

/// Callback invoked for every frame without a recognizable code.
///
/// High-frequency and non-fatal; callers are expected to ignore it.
pub type FrameMissCallback = Box<dyn FnMut() + Send>;

/// Descriptor of one exclusive binding of the decode loop to a device.
#[derive(Debug, Clone)]
pub struct ScanSession {
    /// Id of the bound device.
    pub device_id: String,
    /// Frame-processing configuration the session runs with.
    pub config: ScanConfig,
    /// When the session was started.
    pub started_at: Instant,
}

impl ScanSession {
    pub(crate) fn new(device_id: String, config: ScanConfig) -> Self {
        Self {
            device_id,
            config,
            started_at: Instant::now(),
        }
    }
}
