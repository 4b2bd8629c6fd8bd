//! Dedup/cooldown filtering of the raw decode stream.
//!
//! The engine fires a decode callback at capture rate while a code sits in
//! frame. The gate turns that into a caller-visible stream of at most one
//! forwarded value per cooldown window.

mod cooldown;

pub use cooldown::{CooldownState, DedupGate};
