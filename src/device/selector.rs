//! Active camera selection.
//!
//! Pure logic over an enumeration result. The default pick prefers a
//! rear-facing device because check-in stations point the back camera at
//! the patron's ticket.

use super::CameraDevice;

/// Tracks which enumerated device is currently selected.
#[derive(Debug, Clone, Default)]
pub struct CameraSelector {
    devices: Vec<CameraDevice>,
    current: Option<usize>,
}

impl CameraSelector {
    /// Builds a selector over an enumeration result and applies the default
    /// selection heuristic.
    ///
    /// Default: the first device whose label contains "back" or "rear"
    /// (case-insensitive), else the first device, else no selection.
    pub fn from_devices(devices: Vec<CameraDevice>) -> Self {
        let current = default_index(&devices);
        Self { devices, current }
    }

    /// Replaces the device list (explicit re-enumeration) and reapplies the
    /// default selection heuristic.
    pub fn replace_devices(&mut self, devices: Vec<CameraDevice>) {
        self.current = default_index(&devices);
        self.devices = devices;
    }

    /// Returns the currently selected device, if any.
    pub fn selected(&self) -> Option<&CameraDevice> {
        self.current.map(|i| &self.devices[i])
    }

    /// Returns all enumerated devices in platform order.
    pub fn devices(&self) -> &[CameraDevice] {
        &self.devices
    }

    /// Returns true when cycling to another device is possible.
    pub fn can_switch(&self) -> bool {
        self.devices.len() > 1
    }

    /// Selects the next device in enumeration order, wrapping around.
    ///
    /// No-op when fewer than two devices exist. Returns true if the
    /// selection changed.
    pub fn switch_to_next(&mut self) -> bool {
        if !self.can_switch() {
            return false;
        }
        let current = self.current.unwrap_or(0);
        let next = (current + 1) % self.devices.len();
        self.current = Some(next);
        tracing::info!(label = %self.devices[next].label, "Switched selected camera");
        true
    }
}

fn default_index(devices: &[CameraDevice]) -> Option<usize> {
    if devices.is_empty() {
        return None;
    }
    let rear = devices.iter().position(|d| {
        let label = d.label.to_lowercase();
        label.contains("back") || label.contains("rear")
    });
    Some(rear.unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_cameras() -> Vec<CameraDevice> {
        vec![
            CameraDevice::new("0", "Front Camera"),
            CameraDevice::new("1", "Back Camera"),
        ]
    }

    #[test]
    fn test_prefers_back_camera() {
        let selector = CameraSelector::from_devices(two_cameras());
        assert_eq!(selector.selected().unwrap().id, "1");
    }

    #[test]
    fn test_rear_label_case_insensitive() {
        let selector = CameraSelector::from_devices(vec![
            CameraDevice::new("0", "Integrated Webcam"),
            CameraDevice::new("1", "REAR facing"),
        ]);
        assert_eq!(selector.selected().unwrap().id, "1");
    }

    #[test]
    fn test_falls_back_to_first_device() {
        let selector = CameraSelector::from_devices(vec![
            CameraDevice::new("a", "Webcam A"),
            CameraDevice::new("b", "Webcam B"),
        ]);
        assert_eq!(selector.selected().unwrap().id, "a");
    }

    #[test]
    fn test_no_devices_no_selection() {
        let selector = CameraSelector::from_devices(Vec::new());
        assert!(selector.selected().is_none());
        assert!(!selector.can_switch());
    }

    #[test]
    fn test_switch_cycles_and_wraps() {
        let mut selector = CameraSelector::from_devices(two_cameras());
        assert_eq!(selector.selected().unwrap().id, "1");

        assert!(selector.switch_to_next());
        assert_eq!(selector.selected().unwrap().id, "0");

        assert!(selector.switch_to_next());
        assert_eq!(selector.selected().unwrap().id, "1");
    }

    #[test]
    fn test_switch_noop_with_single_device() {
        let mut selector =
            CameraSelector::from_devices(vec![CameraDevice::new("0", "Only Camera")]);
        assert!(!selector.switch_to_next());
        assert_eq!(selector.selected().unwrap().id, "0");
    }

    #[test]
    fn test_replace_devices_reselects() {
        let mut selector = CameraSelector::from_devices(Vec::new());
        assert!(selector.selected().is_none());

        selector.replace_devices(two_cameras());
        assert_eq!(selector.selected().unwrap().id, "1");
    }
}
