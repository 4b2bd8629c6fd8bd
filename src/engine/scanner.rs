//! The scan engine.

use super::{DecodeCallback, FrameMissCallback, ScanSession};
use crate::capture::{CaptureBackend, CaptureError, ScanConfig};
use crate::decode::{DecodeEvent, Decoder, RegionOfInterest};
use crate::device::CameraDevice;
use crate::metrics::ScanStats;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Session start failures.
///
/// Acquisition failed; no session exists and no handle is held. Calling
/// `stop` afterwards is safe and a no-op.
#[derive(Debug, Error)]
pub enum StartError {
    #[error("failed to acquire device {device}: {source}")]
    Acquisition {
        device: String,
        #[source]
        source: CaptureError,
    },
}

/// Session stop failures.
///
/// Stop is best-effort: the session is gone either way, these only report
/// what happened to the handle on the way out.
#[derive(Debug, Error)]
pub enum StopError {
    #[error("failed to release device {device}: {source}")]
    Release {
        device: String,
        #[source]
        source: CaptureError,
    },
    #[error("capture task for device {0} panicked")]
    TaskPanicked(String),
}

struct ActiveSession {
    session: ScanSession,
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<Result<(), CaptureError>>,
}

/// Owns the lifecycle of a single capture+decode session.
///
/// At most one session exists at any instant; `start` tears down a
/// still-bound prior session before acquiring the new device.
pub struct ScanEngine {
    backend: Arc<dyn CaptureBackend>,
    decoder: Arc<dyn Decoder>,
    config: ScanConfig,
    stats: Arc<ScanStats>,
    active: Option<ActiveSession>,
}

impl ScanEngine {
    /// Creates an engine over the given backend and decoder.
    pub fn new(
        backend: Arc<dyn CaptureBackend>,
        decoder: Arc<dyn Decoder>,
        config: ScanConfig,
        stats: Arc<ScanStats>,
    ) -> Self {
        Self {
            backend,
            decoder,
            config,
            stats,
            active: None,
        }
    }

    /// Returns true while a session is bound.
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Returns the current session descriptor, if any.
    pub fn session(&self) -> Option<&ScanSession> {
        self.active.as_ref().map(|a| &a.session)
    }

    /// Acquires `device` exclusively and starts the capture+decode loop.
    ///
    /// If a prior session is still bound it is stopped first (best-effort),
    /// so at most one capture loop exists system-wide. On failure no
    /// partially-initialized session remains.
    pub async fn start(
        &mut self,
        device: &CameraDevice,
        mut on_decode: DecodeCallback,
        mut on_frame_miss: FrameMissCallback,
    ) -> Result<(), StartError> {
        if self.active.is_some() {
            if let Err(e) = self.stop().await {
                tracing::warn!(error = %e, "Stop before restart failed");
            }
        }

        let mut capture =
            self.backend
                .open(device, &self.config)
                .await
                .map_err(|source| {
                    self.stats.record_start_failure();
                    StartError::Acquisition {
                        device: device.id.clone(),
                        source,
                    }
                })?;

        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let decoder = Arc::clone(&self.decoder);
        let stats = Arc::clone(&self.stats);
        let interval = self.config.frame_interval();
        let roi_size = self.config.roi_size;
        let aspect_ratio = self.config.aspect_ratio;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => break,
                    _ = ticker.tick() => {
                        match capture.next_frame().await {
                            Ok(frame) => {
                                stats.record_frame();
                                let roi = RegionOfInterest::centered(
                                    frame.width(),
                                    frame.height(),
                                    roi_size,
                                    aspect_ratio,
                                );
                                match decoder.decode(&frame, &roi) {
                                    Some(value) => {
                                        stats.record_hit();
                                        on_decode(DecodeEvent::new(value));
                                    }
                                    None => {
                                        stats.record_miss();
                                        on_frame_miss();
                                    }
                                }
                            }
                            Err(e) => {
                                // A bad frame is a miss, not a session failure.
                                stats.record_miss();
                                tracing::debug!(error = %e, "Frame capture failed");
                                on_frame_miss();
                            }
                        }
                    }
                }
            }

            capture.release().await
        });

        self.stats.record_session_started();
        tracing::info!(device = %device.id, "Scan session started");

        self.active = Some(ActiveSession {
            session: ScanSession::new(device.id.clone(), self.config.clone()),
            shutdown_tx,
            task,
        });
        Ok(())
    }

    /// Stops the current session, if any.
    ///
    /// Idempotent. Resolves only after the capture loop has exited and the
    /// device handle is released; no decode callback runs afterwards.
    pub async fn stop(&mut self) -> Result<(), StopError> {
        let Some(active) = self.active.take() else {
            return Ok(());
        };
        let device_id = active.session.device_id.clone();

        // The task may already be gone if it panicked; join decides.
        let _ = active.shutdown_tx.send(()).await;
        let joined = active.task.await;

        self.stats.record_session_stopped();

        match joined {
            Ok(Ok(())) => {
                tracing::info!(device = %device_id, "Scan session stopped");
                Ok(())
            }
            Ok(Err(source)) => {
                self.stats.record_stop_failure();
                Err(StopError::Release {
                    device: device_id,
                    source,
                })
            }
            Err(_) => {
                self.stats.record_stop_failure();
                Err(StopError::TaskPanicked(device_id))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{HandleEvent, MockBackend};
    use crate::decode::{NeverDecoder, ScriptedDecoder};
    use std::sync::Mutex;
    use std::time::Duration;

    fn device(id: &str) -> CameraDevice {
        CameraDevice::new(id, format!("Camera {id}"))
    }

    fn engine_with(
        backend: Arc<MockBackend>,
        decoder: Arc<dyn Decoder>,
    ) -> (ScanEngine, Arc<ScanStats>) {
        let stats = Arc::new(ScanStats::new());
        let engine = ScanEngine::new(backend, decoder, ScanConfig::default(), Arc::clone(&stats));
        (engine, stats)
    }

    fn collecting_callbacks(sink: Arc<Mutex<Vec<String>>>) -> (DecodeCallback, FrameMissCallback) {
        let on_decode: DecodeCallback = Box::new(move |event: DecodeEvent| {
            sink.lock().unwrap().push(event.value);
        });
        let on_miss: FrameMissCallback = Box::new(|| {});
        (on_decode, on_miss)
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_without_session_is_noop() {
        let backend = Arc::new(MockBackend::new());
        let (mut engine, _) = engine_with(backend, Arc::new(NeverDecoder));

        assert!(engine.stop().await.is_ok());
        assert!(!engine.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_streams_decodes_until_stop() {
        let backend = Arc::new(MockBackend::new());
        let decoder = Arc::new(ScriptedDecoder::from_script(vec![
            Some("T-1".into()),
            None,
            Some("T-2".into()),
        ]));
        let (mut engine, stats) = engine_with(Arc::clone(&backend), decoder);

        let sink = Arc::new(Mutex::new(Vec::new()));
        let (on_decode, on_miss) = collecting_callbacks(Arc::clone(&sink));

        engine.start(&device("0"), on_decode, on_miss).await.unwrap();
        assert!(engine.is_running());
        assert_eq!(engine.session().unwrap().device_id, "0");

        tokio::time::sleep(Duration::from_millis(500)).await;
        engine.stop().await.unwrap();

        assert_eq!(*sink.lock().unwrap(), vec!["T-1", "T-2"]);
        let snap = stats.snapshot();
        assert_eq!(snap.decode_hits, 2);
        assert!(snap.frames_processed >= 3);
        assert_eq!(backend.ledger().currently_open(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_decode_after_stop_resolves() {
        let backend = Arc::new(MockBackend::new());
        let decoder = Arc::new(ScriptedDecoder::cycling(vec![Some("T".into())]));
        let (mut engine, _) = engine_with(backend, decoder);

        let sink = Arc::new(Mutex::new(Vec::new()));
        let (on_decode, on_miss) = collecting_callbacks(Arc::clone(&sink));

        engine.start(&device("0"), on_decode, on_miss).await.unwrap();
        tokio::time::sleep(Duration::from_millis(250)).await;
        engine.stop().await.unwrap();

        let delivered = sink.lock().unwrap().len();
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(sink.lock().unwrap().len(), delivered);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_start_replaces_first_session() {
        let backend = Arc::new(MockBackend::new());
        let decoder = Arc::new(NeverDecoder);
        let (mut engine, _) = engine_with(Arc::clone(&backend), decoder);

        let sink = Arc::new(Mutex::new(Vec::new()));
        let (on_decode, on_miss) = collecting_callbacks(Arc::clone(&sink));
        engine.start(&device("a"), on_decode, on_miss).await.unwrap();

        let (on_decode, on_miss) = collecting_callbacks(sink);
        engine.start(&device("b"), on_decode, on_miss).await.unwrap();

        assert_eq!(engine.session().unwrap().device_id, "b");

        let ledger = backend.ledger();
        assert_eq!(ledger.max_concurrent(), 1);
        assert_eq!(
            ledger.events(),
            vec![
                HandleEvent::Opened("a".into()),
                HandleEvent::Released("a".into()),
                HandleEvent::Opened("b".into()),
            ]
        );

        engine.stop().await.unwrap();
        assert_eq!(ledger.currently_open(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_start_leaves_no_session() {
        let backend = Arc::new(MockBackend::new());
        backend.fail_next_open(CaptureError::PermissionDenied("0".into()));
        let (mut engine, stats) = engine_with(Arc::clone(&backend), Arc::new(NeverDecoder));

        let sink = Arc::new(Mutex::new(Vec::new()));
        let (on_decode, on_miss) = collecting_callbacks(sink);

        let err = engine
            .start(&device("0"), on_decode, on_miss)
            .await
            .unwrap_err();
        assert!(matches!(err, StartError::Acquisition { .. }));
        assert!(!engine.is_running());
        assert_eq!(stats.snapshot().start_failures, 1);

        // Stop after a failed start stays safe.
        assert!(engine.stop().await.is_ok());
        assert_eq!(backend.ledger().currently_open(), 0);
    }
}
