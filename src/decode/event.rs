//! Decode event produced per recognized frame.

use std::time::Instant;

/// A successfully decoded value, stamped at recognition time.
///
/// Ephemeral: events flow from the engine through the dedup gate and are
/// dropped; nothing persists them.
#[derive(Debug, Clone)]
pub struct DecodeEvent {
    /// The decoded string, verbatim. No format is assumed.
    pub value: String,
    /// When the decode happened.
    pub timestamp: Instant,
}

impl DecodeEvent {
    /// Creates an event stamped with the current time.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            timestamp: Instant::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_carries_value_verbatim() {
        let event = DecodeEvent::new("TICKET/2024/00042 ");
        assert_eq!(event.value, "TICKET/2024/00042 ");
    }
}
