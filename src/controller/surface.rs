//! Externally observable error state.

use crate::device::EnumerationError;
use crate::engine::StartError;
use thiserror::Error;

/// The most recent capture-layer failure, shaped for presentation.
///
/// `recoverable` only affects how a host renders the failure; every
/// surfaced error is retryable through the same recovery action.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct SurfacedError {
    /// Human-readable failure description.
    pub message: String,
    /// Whether retrying is likely to help (presentation hint only).
    pub recoverable: bool,
}

impl SurfacedError {
    /// Shapes a device enumeration failure.
    pub fn enumeration(err: &EnumerationError) -> Self {
        Self {
            message: err.to_string(),
            recoverable: false,
        }
    }

    /// Shapes a session start failure.
    pub fn start(err: &StartError) -> Self {
        Self {
            message: err.to_string(),
            recoverable: true,
        }
    }
}

/// Single overwritable slot holding the most recent surfaced error.
#[derive(Debug, Default)]
pub struct ErrorSurface {
    current: Option<SurfacedError>,
}

impl ErrorSurface {
    /// Records a failure, overwriting any previous one.
    pub fn record(&mut self, error: SurfacedError) {
        self.current = Some(error);
    }

    /// Clears the slot (successful recovery).
    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Returns the most recent failure, if any.
    pub fn current(&self) -> Option<&SurfacedError> {
        self.current.as_ref()
    }
}
