//! Code detection over captured frames.
//!
//! The actual image-processing lives in an external decoder library; this
//! module only defines the trait seam, the region-of-interest math and the
//! event type a recognized frame produces.

mod decoder;
mod event;
mod roi;

pub use decoder::{Decoder, NeverDecoder, QrDecoder, ScriptedDecoder};
pub use event::DecodeEvent;
pub use roi::RegionOfInterest;
