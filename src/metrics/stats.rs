//! Lock-free scan counters.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Shared counter set recording scan activity.
///
/// Cheap enough to bump from the per-frame hot path; readers take
/// snapshots.
#[derive(Debug, Default)]
pub struct ScanStats {
    frames_processed: AtomicU64,
    decode_hits: AtomicU64,
    frame_misses: AtomicU64,
    scans_forwarded: AtomicU64,
    scans_suppressed: AtomicU64,
    sessions_started: AtomicU64,
    sessions_stopped: AtomicU64,
    start_failures: AtomicU64,
    stop_failures: AtomicU64,
    session_active: AtomicBool,
}

impl ScanStats {
    /// Creates a zeroed counter set.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_frame(&self) {
        self.frames_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_hit(&self) {
        self.decode_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.frame_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_forwarded(&self) {
        self.scans_forwarded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_suppressed(&self) {
        self.scans_suppressed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_session_started(&self) {
        self.sessions_started.fetch_add(1, Ordering::Relaxed);
        self.session_active.store(true, Ordering::Relaxed);
    }

    pub(crate) fn record_session_stopped(&self) {
        self.sessions_stopped.fetch_add(1, Ordering::Relaxed);
        self.session_active.store(false, Ordering::Relaxed);
    }

    pub(crate) fn record_start_failure(&self) {
        self.start_failures.fetch_add(1, Ordering::Relaxed);
        self.session_active.store(false, Ordering::Relaxed);
    }

    pub(crate) fn record_stop_failure(&self) {
        self.stop_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Takes a consistent-enough snapshot for export.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            frames_processed: self.frames_processed.load(Ordering::Relaxed),
            decode_hits: self.decode_hits.load(Ordering::Relaxed),
            frame_misses: self.frame_misses.load(Ordering::Relaxed),
            scans_forwarded: self.scans_forwarded.load(Ordering::Relaxed),
            scans_suppressed: self.scans_suppressed.load(Ordering::Relaxed),
            sessions_started: self.sessions_started.load(Ordering::Relaxed),
            sessions_stopped: self.sessions_stopped.load(Ordering::Relaxed),
            start_failures: self.start_failures.load(Ordering::Relaxed),
            stop_failures: self.stop_failures.load(Ordering::Relaxed),
            session_active: self.session_active.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of the scan counters.
#[derive(Debug, Clone, Default)]
pub struct StatsSnapshot {
    /// Frames analyzed.
    pub frames_processed: u64,
    /// Frames with a recognized code.
    pub decode_hits: u64,
    /// Frames without a recognizable code.
    pub frame_misses: u64,
    /// Values forwarded to the caller.
    pub scans_forwarded: u64,
    /// Decodes dropped by the cooldown gate.
    pub scans_suppressed: u64,
    /// Capture sessions started.
    pub sessions_started: u64,
    /// Capture sessions stopped.
    pub sessions_stopped: u64,
    /// Failed session starts.
    pub start_failures: u64,
    /// Swallowed release failures.
    pub stop_failures: u64,
    /// Whether a session is currently bound.
    pub session_active: bool,
}
