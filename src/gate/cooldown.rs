//! Cooldown state machine.

use std::time::{Duration, Instant};

/// Suppression state owned exclusively by the gate.
#[derive(Debug, Clone, Default)]
pub struct CooldownState {
    /// Most recently forwarded value, cleared when the window elapses.
    last_value: Option<String>,
    /// Deadline until which all decodes are dropped.
    suppress_until: Option<Instant>,
}

/// Filters raw decode events so a value is surfaced at most once per
/// cooldown window.
///
/// While the window is open, *every* decode is dropped, not just repeats of
/// the forwarded value. A patron holding two tickets up in quick succession
/// loses the second read for up to the window length; in exchange, holding
/// one card steady cannot rapid-fire duplicate submissions. That trade-off
/// is intentional product behavior.
#[derive(Debug)]
pub struct DedupGate {
    cooldown: Duration,
    state: CooldownState,
}

impl DedupGate {
    /// Creates a gate with the given cooldown window.
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            state: CooldownState::default(),
        }
    }

    /// Offers a decoded value to the gate at time `now`.
    ///
    /// Returns true when the value should be forwarded to the caller.
    pub fn offer(&mut self, value: &str, now: Instant) -> bool {
        if let Some(until) = self.state.suppress_until {
            if now < until {
                return false;
            }
            // Window elapsed: re-arm detection.
            self.state = CooldownState::default();
        }

        if self.state.last_value.as_deref() == Some(value) {
            return false;
        }

        self.state.last_value = Some(value.to_string());
        self.state.suppress_until = Some(now + self.cooldown);
        true
    }

    /// Returns true while the suppression window is open at `now`.
    pub fn is_suppressed(&self, now: Instant) -> bool {
        self.state.suppress_until.is_some_and(|until| now < until)
    }

    /// Clears all suppression state.
    ///
    /// Called when a session starts or is torn down, so a stale window can
    /// never block detection in a fresh session.
    pub fn reset(&mut self) {
        self.state = CooldownState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const COOLDOWN: Duration = Duration::from_millis(2000);

    fn at(origin: Instant, ms: u64) -> Instant {
        origin + Duration::from_millis(ms)
    }

    #[test]
    fn test_first_value_forwards() {
        let mut gate = DedupGate::new(COOLDOWN);
        let t0 = Instant::now();
        assert!(gate.offer("A", t0));
    }

    #[test]
    fn test_lingering_then_repeated_code() {
        // Raw [A@0, A@100, B@500, A@2500] with a 2000ms window forwards
        // exactly [A@0, A@2500].
        let mut gate = DedupGate::new(COOLDOWN);
        let t0 = Instant::now();

        assert!(gate.offer("A", at(t0, 0)));
        assert!(!gate.offer("A", at(t0, 100)));
        assert!(!gate.offer("B", at(t0, 500)));
        assert!(gate.offer("A", at(t0, 2500)));
    }

    #[test]
    fn test_window_suppresses_different_values() {
        let mut gate = DedupGate::new(COOLDOWN);
        let t0 = Instant::now();

        assert!(gate.offer("A", at(t0, 0)));
        assert!(!gate.offer("B", at(t0, 1)));
        assert!(!gate.offer("C", at(t0, 1999)));
    }

    #[test]
    fn test_window_boundary_is_inclusive_reopen() {
        let mut gate = DedupGate::new(COOLDOWN);
        let t0 = Instant::now();

        assert!(gate.offer("A", at(t0, 0)));
        // Exactly at the deadline the window is no longer open.
        assert!(gate.offer("B", at(t0, 2000)));
    }

    #[test]
    fn test_reset_rearms_detection() {
        let mut gate = DedupGate::new(COOLDOWN);
        let t0 = Instant::now();

        assert!(gate.offer("A", at(t0, 0)));
        assert!(!gate.offer("A", at(t0, 50)));

        gate.reset();
        assert!(gate.offer("A", at(t0, 100)));
    }

    #[test]
    fn test_is_suppressed_tracks_window() {
        let mut gate = DedupGate::new(COOLDOWN);
        let t0 = Instant::now();

        assert!(!gate.is_suppressed(at(t0, 0)));
        gate.offer("A", at(t0, 0));
        assert!(gate.is_suppressed(at(t0, 1999)));
        assert!(!gate.is_suppressed(at(t0, 2000)));
    }

    proptest! {
        /// For any event sequence: forwarded count never exceeds raw count,
        /// and no two forwarded events fall within one cooldown window.
        #[test]
        fn prop_forwarding_invariants(
            events in prop::collection::vec((0u64..10_000, 0u8..4), 0..64)
        ) {
            let mut gate = DedupGate::new(COOLDOWN);
            let t0 = Instant::now();

            let mut offsets: Vec<(u64, u8)> = events;
            offsets.sort_by_key(|(ms, _)| *ms);

            let mut forwarded = Vec::new();
            for (ms, code) in &offsets {
                let value = format!("V{code}");
                if gate.offer(&value, at(t0, *ms)) {
                    forwarded.push(*ms);
                }
            }

            prop_assert!(forwarded.len() <= offsets.len());
            for pair in forwarded.windows(2) {
                prop_assert!(pair[1] - pair[0] >= 2000);
            }
        }
    }
}
