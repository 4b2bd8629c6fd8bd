//! Video input device enumeration.
//!
//! The registry is a trait so tests and the demo binary can run against a
//! fixed device list while the `camera` feature queries real hardware.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single enumerated video input device.
///
/// The id is opaque and stable for the lifetime of the enumeration; the
/// label is whatever human-readable name the platform reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraDevice {
    /// Opaque platform device identifier.
    pub id: String,
    /// Human-readable device label.
    pub label: String,
}

impl CameraDevice {
    /// Creates a device descriptor from id and label.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Errors raised when the device listing itself fails.
///
/// An empty device list is not an error; it is a valid enumeration result.
#[derive(Debug, Clone, Error)]
pub enum EnumerationError {
    #[error("camera subsystem unavailable: {0}")]
    Unavailable(String),
    #[error("device query failed: {0}")]
    QueryFailed(String),
}

/// Trait for enumerating available camera devices.
///
/// Invoked once when the controller is constructed; there is no hot-plug
/// polling. Re-invocation only happens through an explicit retry.
pub trait DeviceRegistry: Send + Sync {
    /// Queries the platform for available video input devices.
    ///
    /// Returns the devices in platform order. An empty vector means no
    /// cameras are attached and must be distinguished from `Err`.
    fn list_cameras(&self) -> Result<Vec<CameraDevice>, EnumerationError>;
}

/// Mock registry serving a fixed device list, or a fixed failure.
#[derive(Debug, Default)]
pub struct MockRegistry {
    devices: Vec<CameraDevice>,
    failure: Option<String>,
}

impl MockRegistry {
    /// Creates a registry that reports the given devices.
    pub fn new(devices: Vec<CameraDevice>) -> Self {
        Self {
            devices,
            failure: None,
        }
    }

    /// Creates a registry that reports no devices.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a registry whose enumeration always fails.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            devices: Vec::new(),
            failure: Some(message.into()),
        }
    }
}

impl DeviceRegistry for MockRegistry {
    fn list_cameras(&self) -> Result<Vec<CameraDevice>, EnumerationError> {
        if let Some(msg) = &self.failure {
            return Err(EnumerationError::Unavailable(msg.clone()));
        }
        tracing::debug!(count = self.devices.len(), "MockRegistry enumerated");
        Ok(self.devices.clone())
    }
}

/// Registry backed by the `nokhwa` platform query.
#[cfg(feature = "camera")]
#[derive(Debug, Default)]
pub struct NokhwaRegistry;

#[cfg(feature = "camera")]
impl DeviceRegistry for NokhwaRegistry {
    fn list_cameras(&self) -> Result<Vec<CameraDevice>, EnumerationError> {
        use nokhwa::utils::ApiBackend;

        let infos = nokhwa::query(ApiBackend::Auto)
            .map_err(|e| EnumerationError::QueryFailed(e.to_string()))?;

        let devices = infos
            .iter()
            .map(|info| CameraDevice::new(info.index().to_string(), info.human_name()))
            .collect::<Vec<_>>();

        tracing::info!(count = devices.len(), "Enumerated video input devices");
        Ok(devices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_registry_lists_devices() {
        let registry = MockRegistry::new(vec![
            CameraDevice::new("0", "Front Camera"),
            CameraDevice::new("1", "Back Camera"),
        ]);

        let devices = registry.list_cameras().unwrap();
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].id, "0");
        assert_eq!(devices[1].label, "Back Camera");
    }

    #[test]
    fn test_empty_is_not_an_error() {
        let registry = MockRegistry::empty();
        assert!(registry.list_cameras().unwrap().is_empty());
    }

    #[test]
    fn test_failing_registry() {
        let registry = MockRegistry::failing("no media API");
        assert!(matches!(
            registry.list_cameras(),
            Err(EnumerationError::Unavailable(_))
        ));
    }
}
