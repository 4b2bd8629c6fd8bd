//! The lifecycle controller.

use super::{ErrorSurface, LifecycleState, SurfacedError};
use crate::capture::{CaptureBackend, ScanConfig};
use crate::decode::Decoder;
use crate::device::{CameraDevice, CameraSelector, DeviceRegistry};
use crate::engine::{DecodeCallback, FrameMissCallback, ScanEngine};
use crate::gate::DedupGate;
use crate::metrics::ScanStats;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::{watch, Mutex};

/// Caller-supplied sinks.
pub struct ScanCallbacks {
    /// Receives each forwarded decoded value, verbatim.
    pub on_scan: Box<dyn FnMut(String) + Send>,
    /// Receives surfaced failures (optional).
    pub on_error: Option<Box<dyn FnMut(&SurfacedError) + Send>>,
}

impl ScanCallbacks {
    /// Builds callbacks with only a scan sink.
    pub fn new(on_scan: impl FnMut(String) + Send + 'static) -> Self {
        Self {
            on_scan: Box::new(on_scan),
            on_error: None,
        }
    }

    /// Adds an error sink.
    pub fn with_on_error(mut self, on_error: impl FnMut(&SurfacedError) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(on_error));
        self
    }
}

struct Inner {
    registry: Arc<dyn DeviceRegistry>,
    selector: CameraSelector,
    engine: ScanEngine,
    gate: Arc<StdMutex<DedupGate>>,
    on_scan: Arc<StdMutex<Box<dyn FnMut(String) + Send>>>,
    on_error: Option<Box<dyn FnMut(&SurfacedError) + Send>>,
    surface: ErrorSurface,
    active: bool,
    state_tx: watch::Sender<LifecycleState>,
    stats: Arc<ScanStats>,
}

/// Drives the scan engine from the external active flag, the camera
/// selection and the retry action.
///
/// Every transition runs under one internal lock: a request arriving while
/// another transition is in flight queues behind it instead of racing it.
/// In particular, deactivating immediately after an unresolved start waits
/// for the start to settle and then stops, so the device can never stay
/// bound against the caller's intent.
pub struct ScanController {
    inner: Arc<Mutex<Inner>>,
    state_rx: watch::Receiver<LifecycleState>,
    stats: Arc<ScanStats>,
}

impl ScanController {
    /// Builds a controller and enumerates devices once (mount).
    ///
    /// An enumeration failure does not fail construction: it parks the
    /// controller in the error state, from which `retry` re-enumerates.
    pub fn new(
        registry: Arc<dyn DeviceRegistry>,
        backend: Arc<dyn CaptureBackend>,
        decoder: Arc<dyn Decoder>,
        config: ScanConfig,
        callbacks: ScanCallbacks,
    ) -> Self {
        let stats = Arc::new(ScanStats::new());
        Self::with_stats(registry, backend, decoder, config, callbacks, stats)
    }

    /// Builds a controller recording into an externally owned counter set.
    pub fn with_stats(
        registry: Arc<dyn DeviceRegistry>,
        backend: Arc<dyn CaptureBackend>,
        decoder: Arc<dyn Decoder>,
        config: ScanConfig,
        callbacks: ScanCallbacks,
        stats: Arc<ScanStats>,
    ) -> Self {
        let (state_tx, state_rx) = watch::channel(LifecycleState::Idle);
        let mut surface = ErrorSurface::default();
        let mut on_error = callbacks.on_error;

        let selector = match registry.list_cameras() {
            Ok(devices) => {
                tracing::info!(count = devices.len(), "Cameras enumerated");
                CameraSelector::from_devices(devices)
            }
            Err(e) => {
                tracing::error!(error = %e, "Device enumeration failed");
                let surfaced = SurfacedError::enumeration(&e);
                if let Some(cb) = on_error.as_mut() {
                    cb(&surfaced);
                }
                surface.record(surfaced);
                let _ = state_tx.send(LifecycleState::Error);
                CameraSelector::from_devices(Vec::new())
            }
        };

        let gate = Arc::new(StdMutex::new(DedupGate::new(config.cooldown())));
        let engine = ScanEngine::new(backend, decoder, config, Arc::clone(&stats));

        let inner = Inner {
            registry,
            selector,
            engine,
            gate,
            on_scan: Arc::new(StdMutex::new(callbacks.on_scan)),
            on_error,
            surface,
            active: false,
            state_tx,
            stats: Arc::clone(&stats),
        };

        Self {
            inner: Arc::new(Mutex::new(inner)),
            state_rx,
            stats,
        }
    }

    /// Sets the desired on/off state.
    ///
    /// Turning on starts a session on the selected device; turning off
    /// stops the session and releases the device. Redundant calls are
    /// no-ops.
    pub async fn set_active(&self, active: bool) {
        let mut inner = self.inner.lock().await;
        if inner.active == active {
            return;
        }
        inner.active = active;
        if active {
            inner.start_selected().await;
        } else {
            inner.stop_session().await;
        }
    }

    /// Cycles the selection to the next enumerated device.
    ///
    /// No-op with fewer than two devices. While running, the old session is
    /// fully torn down before the new device is started.
    pub async fn switch_camera(&self) {
        let mut inner = self.inner.lock().await;
        if !inner.selector.switch_to_next() {
            return;
        }
        if inner.engine.is_running() {
            inner.stop_session().await;
            inner.start_selected().await;
        }
    }

    /// Clears the error state and attempts to scan again.
    ///
    /// Re-enumerates first when the device set is empty (mount-time
    /// enumeration failure). Retry asserts the active flag itself: it is
    /// the user saying "try the camera again", not a passive wait.
    pub async fn retry(&self) {
        let mut inner = self.inner.lock().await;
        inner.surface.clear();

        if inner.selector.devices().is_empty() {
            match inner.registry.list_cameras() {
                Ok(devices) => {
                    tracing::info!(count = devices.len(), "Cameras re-enumerated");
                    inner.selector.replace_devices(devices);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Device re-enumeration failed");
                    let surfaced = SurfacedError::enumeration(&e);
                    inner.report_error(surfaced);
                    inner.set_state(LifecycleState::Error);
                    return;
                }
            }
        }

        inner.active = true;
        inner.start_selected().await;
    }

    /// Tears the controller down (unmount): stops any session and releases
    /// the device. Idempotent.
    pub async fn shutdown(&self) {
        let mut inner = self.inner.lock().await;
        inner.active = false;
        inner.stop_session().await;
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        *self.state_rx.borrow()
    }

    /// Returns a watcher over lifecycle state changes.
    pub fn watch_state(&self) -> watch::Receiver<LifecycleState> {
        self.state_rx.clone()
    }

    /// Returns true while a capture session is bound.
    pub async fn is_scanning(&self) -> bool {
        self.inner.lock().await.engine.is_running()
    }

    /// Returns the enumerated devices.
    pub async fn cameras(&self) -> Vec<CameraDevice> {
        self.inner.lock().await.selector.devices().to_vec()
    }

    /// Returns the currently selected device, if any.
    pub async fn selected_camera(&self) -> Option<CameraDevice> {
        self.inner.lock().await.selector.selected().cloned()
    }

    /// Returns true when a switch-camera affordance makes sense (two or
    /// more devices).
    pub async fn can_switch_camera(&self) -> bool {
        self.inner.lock().await.selector.can_switch()
    }

    /// Returns the most recent surfaced error, if any.
    pub async fn last_error(&self) -> Option<SurfacedError> {
        self.inner.lock().await.surface.current().cloned()
    }

    /// Returns the shared scan counters.
    pub fn stats(&self) -> Arc<ScanStats> {
        Arc::clone(&self.stats)
    }
}

impl Inner {
    fn set_state(&self, state: LifecycleState) {
        let _ = self.state_tx.send(state);
    }

    fn report_error(&mut self, error: SurfacedError) {
        if let Some(cb) = self.on_error.as_mut() {
            cb(&error);
        }
        self.surface.record(error);
    }

    /// Starts a session on the selected device, feeding decodes through the
    /// gate into the caller's scan sink.
    async fn start_selected(&mut self) {
        let Some(device) = self.selector.selected().cloned() else {
            tracing::info!("No camera available; start skipped");
            self.set_state(LifecycleState::Idle);
            return;
        };

        self.set_state(LifecycleState::Starting);

        // Fresh session, fresh window: a stale suppression must never block
        // detection after a restart.
        self.gate.lock().unwrap().reset();

        let gate = Arc::clone(&self.gate);
        let on_scan = Arc::clone(&self.on_scan);
        let stats = Arc::clone(&self.stats);

        let on_decode: DecodeCallback = Box::new(move |event| {
            let forward = gate.lock().unwrap().offer(&event.value, event.timestamp);
            if forward {
                stats.record_forwarded();
                tracing::info!(value = %event.value, "Scan forwarded");
                let mut sink = on_scan.lock().unwrap();
                (*sink)(event.value);
            } else {
                stats.record_suppressed();
                tracing::trace!(value = %event.value, "Scan suppressed");
            }
        });
        let on_frame_miss: FrameMissCallback = Box::new(|| {});

        match self.engine.start(&device, on_decode, on_frame_miss).await {
            Ok(()) => self.set_state(LifecycleState::Running),
            Err(e) => {
                tracing::error!(error = %e, device = %device.id, "Session start failed");
                let surfaced = SurfacedError::start(&e);
                self.report_error(surfaced);
                self.set_state(LifecycleState::Error);
            }
        }
    }

    /// Stops the bound session, swallowing release failures.
    async fn stop_session(&mut self) {
        if self.engine.is_running() {
            self.set_state(LifecycleState::Stopping);
            if let Err(e) = self.engine.stop().await {
                // Best-effort: forward progress beats a clean release.
                tracing::warn!(error = %e, "Session stop failed");
            }
            self.gate.lock().unwrap().reset();
            self.set_state(LifecycleState::Idle);
        } else if *self.state_tx.borrow() != LifecycleState::Error {
            self.set_state(LifecycleState::Idle);
        }
    }
}
