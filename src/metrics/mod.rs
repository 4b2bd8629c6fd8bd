//! Scan counters and Prometheus exporter.
//!
//! `ScanStats` is the always-on, lock-free counter set the engine, gate and
//! controller record into. The Prometheus registry maps snapshots of it to
//! exported metrics; the HTTP server behind the `metrics` feature serves
//! them.
//!
//! # Metrics Exposed
//!
//! - `ticket_scan_frames_total` - Frames analyzed
//! - `ticket_scan_decode_hits_total` - Frames with a recognized code
//! - `ticket_scan_frame_misses_total` - Frames without a recognizable code
//! - `ticket_scan_forwarded_total` - Values forwarded to the caller
//! - `ticket_scan_suppressed_total` - Decodes dropped by the cooldown gate
//! - `ticket_scan_sessions_started_total` - Capture sessions started
//! - `ticket_scan_sessions_stopped_total` - Capture sessions stopped
//! - `ticket_scan_start_failures_total` - Failed session starts
//! - `ticket_scan_stop_failures_total` - Swallowed release failures
//! - `ticket_scan_session_active` - Whether a session is bound (1/0)

mod collector;
mod stats;

#[cfg(feature = "metrics")]
mod server;

pub use collector::{MetricsError, MetricsRegistry};
pub use stats::{ScanStats, StatsSnapshot};

#[cfg(feature = "metrics")]
pub use server::{MetricsServer, MetricsServerConfig, ServerError};
