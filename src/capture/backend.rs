//! Capture backend abstraction.
//!
//! The backend owns device acquisition; an acquired device hands out frames
//! until released. Acquisition is exclusive: holding two devices open at
//! once is a bug in the caller, and the mock backend's ledger exists to
//! catch exactly that in tests.

use super::{Frame, ScanConfig};
use crate::device::CameraDevice;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors that can occur at the capture layer.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("permission denied for device {0}")]
    PermissionDenied(String),
    #[error("device busy: {0}")]
    DeviceBusy(String),
    #[error("device not found: {0}")]
    DeviceNotFound(String),
    #[error("failed to open device: {0}")]
    OpenFailed(String),
    #[error("failed to read frame: {0}")]
    FrameFailed(String),
    #[error("failed to release device: {0}")]
    ReleaseFailed(String),
}

/// An exclusively-held, streaming capture device.
#[async_trait]
pub trait CaptureDevice: Send {
    /// Delivers the next frame.
    async fn next_frame(&mut self) -> Result<Frame, CaptureError>;

    /// Releases the underlying device handle.
    ///
    /// After release the device must not be used again; the handle must be
    /// fully returned to the platform before this resolves.
    async fn release(&mut self) -> Result<(), CaptureError>;
}

/// Factory for acquiring capture devices.
#[async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Acquires the named device exclusively.
    ///
    /// On failure no handle is held; the caller owns nothing to clean up.
    async fn open(
        &self,
        device: &CameraDevice,
        config: &ScanConfig,
    ) -> Result<Box<dyn CaptureDevice>, CaptureError>;
}

/// Acquisition/release event recorded by the mock ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleEvent {
    /// A device handle was acquired.
    Opened(String),
    /// A device handle was released.
    Released(String),
}

/// Accounting of mock device handles.
///
/// Tracks every open/release and the peak number of concurrently held
/// handles, so tests can assert the single-session invariant.
#[derive(Debug, Default)]
pub struct HandleLedger {
    events: Mutex<Vec<HandleEvent>>,
    open: AtomicUsize,
    max_open: AtomicUsize,
}

impl HandleLedger {
    fn opened(&self, id: &str) {
        let now_open = self.open.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_open.fetch_max(now_open, Ordering::SeqCst);
        self.events
            .lock()
            .unwrap()
            .push(HandleEvent::Opened(id.to_string()));
    }

    fn released(&self, id: &str) {
        self.open.fetch_sub(1, Ordering::SeqCst);
        self.events
            .lock()
            .unwrap()
            .push(HandleEvent::Released(id.to_string()));
    }

    /// Returns the number of handles currently held.
    pub fn currently_open(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    /// Returns the peak number of concurrently held handles.
    pub fn max_concurrent(&self) -> usize {
        self.max_open.load(Ordering::SeqCst)
    }

    /// Returns the recorded open/release events in order.
    pub fn events(&self) -> Vec<HandleEvent> {
        self.events.lock().unwrap().clone()
    }
}

/// Mock backend producing synthetic frames, with scriptable failures.
#[derive(Debug)]
pub struct MockBackend {
    ledger: Arc<HandleLedger>,
    scripted_failures: Mutex<VecDeque<CaptureError>>,
    frame_width: u32,
    frame_height: u32,
}

impl MockBackend {
    /// Creates a mock backend with 640x480 synthetic frames.
    pub fn new() -> Self {
        Self {
            ledger: Arc::new(HandleLedger::default()),
            scripted_failures: Mutex::new(VecDeque::new()),
            frame_width: 640,
            frame_height: 480,
        }
    }

    /// Queues a failure for the next `open` call. Failures are consumed in
    /// order; once the queue is empty, opens succeed again.
    pub fn fail_next_open(&self, error: CaptureError) {
        self.scripted_failures.lock().unwrap().push_back(error);
    }

    /// Returns the handle ledger for assertions.
    pub fn ledger(&self) -> Arc<HandleLedger> {
        Arc::clone(&self.ledger)
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CaptureBackend for MockBackend {
    async fn open(
        &self,
        device: &CameraDevice,
        config: &ScanConfig,
    ) -> Result<Box<dyn CaptureDevice>, CaptureError> {
        if let Some(err) = self.scripted_failures.lock().unwrap().pop_front() {
            tracing::debug!(device = %device.id, "MockBackend scripted open failure");
            return Err(err);
        }
        config
            .validate()
            .map_err(|e| CaptureError::OpenFailed(e.to_string()))?;

        self.ledger.opened(&device.id);
        tracing::info!(device = %device.id, "MockBackend opened device");

        Ok(Box::new(MockCaptureDevice {
            device_id: device.id.clone(),
            ledger: Arc::clone(&self.ledger),
            width: self.frame_width,
            height: self.frame_height,
            sequence: 0,
            released: false,
        }))
    }
}

/// Mock device generating a deterministic synthetic pixel pattern.
#[derive(Debug)]
struct MockCaptureDevice {
    device_id: String,
    ledger: Arc<HandleLedger>,
    width: u32,
    height: u32,
    sequence: u64,
    released: bool,
}

#[async_trait]
impl CaptureDevice for MockCaptureDevice {
    async fn next_frame(&mut self) -> Result<Frame, CaptureError> {
        if self.released {
            return Err(CaptureError::FrameFailed("device released".into()));
        }
        // Yield so the mock has the same suspension shape as real capture.
        tokio::task::yield_now().await;

        let pixel_count = (self.width * self.height) as usize;
        let pixels: Vec<u8> = (0..pixel_count)
            .map(|i| ((i as u64 ^ self.sequence) % 256) as u8)
            .collect();

        self.sequence += 1;
        Ok(Frame::new(pixels, self.width, self.height, self.sequence))
    }

    async fn release(&mut self) -> Result<(), CaptureError> {
        if !self.released {
            self.released = true;
            self.ledger.released(&self.device_id);
            tracing::info!(device = %self.device_id, "MockBackend released device");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device() -> CameraDevice {
        CameraDevice::new("0", "Mock Camera")
    }

    #[tokio::test]
    async fn test_open_capture_release() {
        let backend = MockBackend::new();
        let ledger = backend.ledger();

        let mut dev = backend.open(&device(), &ScanConfig::default()).await.unwrap();
        assert_eq!(ledger.currently_open(), 1);

        let frame = dev.next_frame().await.unwrap();
        assert!(frame.is_valid());
        assert_eq!(frame.sequence(), 1);

        let frame2 = dev.next_frame().await.unwrap();
        assert_eq!(frame2.sequence(), 2);

        dev.release().await.unwrap();
        assert_eq!(ledger.currently_open(), 0);
        assert_eq!(ledger.max_concurrent(), 1);
    }

    #[tokio::test]
    async fn test_scripted_open_failure_holds_nothing() {
        let backend = MockBackend::new();
        backend.fail_next_open(CaptureError::PermissionDenied("0".into()));

        let err = backend
            .open(&device(), &ScanConfig::default())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, CaptureError::PermissionDenied(_)));
        assert_eq!(backend.ledger().currently_open(), 0);

        // Queue drained: the next open succeeds.
        let mut dev = backend.open(&device(), &ScanConfig::default()).await.unwrap();
        dev.release().await.unwrap();
    }

    #[tokio::test]
    async fn test_frame_after_release_fails() {
        let backend = MockBackend::new();
        let mut dev = backend.open(&device(), &ScanConfig::default()).await.unwrap();
        dev.release().await.unwrap();

        assert!(dev.next_frame().await.is_err());
    }

    #[tokio::test]
    async fn test_release_is_idempotent() {
        let backend = MockBackend::new();
        let ledger = backend.ledger();

        let mut dev = backend.open(&device(), &ScanConfig::default()).await.unwrap();
        dev.release().await.unwrap();
        dev.release().await.unwrap();

        assert_eq!(ledger.currently_open(), 0);
        assert_eq!(
            ledger.events(),
            vec![
                HandleEvent::Opened("0".into()),
                HandleEvent::Released("0".into())
            ]
        );
    }
}
