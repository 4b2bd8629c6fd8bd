//! Controller lifecycle states.

use serde::{Deserialize, Serialize};

/// Observable state of the lifecycle controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleState {
    /// No session, active flag off.
    Idle,
    /// A start is in flight.
    Starting,
    /// Session bound, decode events flowing.
    Running,
    /// A stop is in flight.
    Stopping,
    /// The last start/stop attempt (or mount-time enumeration) failed.
    Error,
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}
