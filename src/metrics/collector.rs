//! Metrics collection and registry.

use super::StatsSnapshot;
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// Prometheus metrics registry for scan monitoring.
pub struct MetricsRegistry {
    registry: Registry,

    // Frame pipeline
    frames_total: IntCounter,
    decode_hits_total: IntCounter,
    frame_misses_total: IntCounter,

    // Gate
    forwarded_total: IntCounter,
    suppressed_total: IntCounter,

    // Session lifecycle
    sessions_started_total: IntCounter,
    sessions_stopped_total: IntCounter,
    start_failures_total: IntCounter,
    stop_failures_total: IntCounter,
    session_active: IntGauge,
}

impl MetricsRegistry {
    /// Creates a new metrics registry with all scan metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let frames_total =
            IntCounter::new("ticket_scan_frames_total", "Frames analyzed for a code")?;
        let decode_hits_total = IntCounter::new(
            "ticket_scan_decode_hits_total",
            "Frames with a recognized code",
        )?;
        let frame_misses_total = IntCounter::new(
            "ticket_scan_frame_misses_total",
            "Frames without a recognizable code",
        )?;

        let forwarded_total = IntCounter::new(
            "ticket_scan_forwarded_total",
            "Decoded values forwarded to the caller",
        )?;
        let suppressed_total = IntCounter::new(
            "ticket_scan_suppressed_total",
            "Decodes dropped by the cooldown gate",
        )?;

        let sessions_started_total = IntCounter::new(
            "ticket_scan_sessions_started_total",
            "Capture sessions started",
        )?;
        let sessions_stopped_total = IntCounter::new(
            "ticket_scan_sessions_stopped_total",
            "Capture sessions stopped",
        )?;
        let start_failures_total =
            IntCounter::new("ticket_scan_start_failures_total", "Failed session starts")?;
        let stop_failures_total = IntCounter::new(
            "ticket_scan_stop_failures_total",
            "Swallowed device release failures",
        )?;
        let session_active = IntGauge::new(
            "ticket_scan_session_active",
            "Whether a capture session is bound (1=yes, 0=no)",
        )?;

        registry.register(Box::new(frames_total.clone()))?;
        registry.register(Box::new(decode_hits_total.clone()))?;
        registry.register(Box::new(frame_misses_total.clone()))?;
        registry.register(Box::new(forwarded_total.clone()))?;
        registry.register(Box::new(suppressed_total.clone()))?;
        registry.register(Box::new(sessions_started_total.clone()))?;
        registry.register(Box::new(sessions_stopped_total.clone()))?;
        registry.register(Box::new(start_failures_total.clone()))?;
        registry.register(Box::new(stop_failures_total.clone()))?;
        registry.register(Box::new(session_active.clone()))?;

        Ok(Self {
            registry,
            frames_total,
            decode_hits_total,
            frame_misses_total,
            forwarded_total,
            suppressed_total,
            sessions_started_total,
            sessions_stopped_total,
            start_failures_total,
            stop_failures_total,
            session_active,
        })
    }

    /// Updates all metrics from a counter snapshot.
    ///
    /// Counters are advanced by the delta against their current value, so
    /// repeated updates from the same snapshot are harmless.
    pub fn update(&self, snapshot: &StatsSnapshot) {
        advance(&self.frames_total, snapshot.frames_processed);
        advance(&self.decode_hits_total, snapshot.decode_hits);
        advance(&self.frame_misses_total, snapshot.frame_misses);
        advance(&self.forwarded_total, snapshot.scans_forwarded);
        advance(&self.suppressed_total, snapshot.scans_suppressed);
        advance(&self.sessions_started_total, snapshot.sessions_started);
        advance(&self.sessions_stopped_total, snapshot.sessions_stopped);
        advance(&self.start_failures_total, snapshot.start_failures);
        advance(&self.stop_failures_total, snapshot.stop_failures);

        self.session_active
            .set(if snapshot.session_active { 1 } else { 0 });
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

fn advance(counter: &IntCounter, target: u64) {
    let current = counter.get();
    if target > current {
        counter.inc_by(target - current);
    }
}
