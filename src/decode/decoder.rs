//! Decoder trait and implementations.
//!
//! Decoding is delegated to an external library treated as a black box.
//! The scripted and never-decoding mocks exist so lifecycle tests control
//! exactly when a "code" appears in frame.

use super::RegionOfInterest;
use crate::capture::Frame;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Attempts to find a machine-readable code inside a frame region.
///
/// Returns the decoded string on success, `None` when the region holds no
/// recognizable code. A `None` is the normal case at capture rate and is
/// never an error.
pub trait Decoder: Send + Sync {
    /// Decodes the region of interest of one frame.
    fn decode(&self, frame: &Frame, roi: &RegionOfInterest) -> Option<String>;
}

/// QR decoder backed by `rqrr`.
#[derive(Debug, Default)]
pub struct QrDecoder;

impl QrDecoder {
    /// Creates a new QR decoder.
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for QrDecoder {
    fn decode(&self, frame: &Frame, roi: &RegionOfInterest) -> Option<String> {
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            roi.width as usize,
            roi.height as usize,
            |x, y| frame.pixel(roi.x + x as u32, roi.y + y as u32),
        );

        for grid in prepared.detect_grids() {
            match grid.decode() {
                Ok((_meta, content)) => return Some(content),
                Err(e) => {
                    // Grid located but not decodable; counts as a miss.
                    tracing::trace!(error = %e, "QR grid decode failed");
                }
            }
        }
        None
    }
}

/// Mock decoder replaying a scripted sequence of results.
#[derive(Debug)]
pub struct ScriptedDecoder {
    script: Mutex<VecDeque<Option<String>>>,
    cycle: bool,
}

impl ScriptedDecoder {
    /// Replays the script once, then reports misses forever.
    pub fn from_script(script: Vec<Option<String>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            cycle: false,
        }
    }

    /// Replays the script in a loop.
    pub fn cycling(script: Vec<Option<String>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            cycle: true,
        }
    }
}

impl Decoder for ScriptedDecoder {
    fn decode(&self, _frame: &Frame, _roi: &RegionOfInterest) -> Option<String> {
        let mut script = self.script.lock().unwrap();
        let next = script.pop_front()?;
        if self.cycle {
            script.push_back(next.clone());
        }
        next
    }
}

/// Mock decoder that never finds a code.
#[derive(Debug, Default)]
pub struct NeverDecoder;

impl Decoder for NeverDecoder {
    fn decode(&self, _frame: &Frame, _roi: &RegionOfInterest) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_frame() -> Frame {
        Frame::new(vec![0u8; 640 * 480], 640, 480, 1)
    }

    fn roi() -> RegionOfInterest {
        RegionOfInterest::centered(640, 480, 250, 1.0)
    }

    #[test]
    fn test_qr_decoder_misses_on_blank_frame() {
        let decoder = QrDecoder::new();
        assert!(decoder.decode(&blank_frame(), &roi()).is_none());
    }

    #[test]
    fn test_qr_decoder_handles_tiny_region() {
        let decoder = QrDecoder::new();
        let frame = Frame::new(vec![128u8; 16], 4, 4, 1);
        let roi = RegionOfInterest::centered(4, 4, 250, 1.0);
        assert!(decoder.decode(&frame, &roi).is_none());
    }

    #[test]
    fn test_scripted_decoder_replays_in_order() {
        let decoder = ScriptedDecoder::from_script(vec![
            Some("A".into()),
            None,
            Some("B".into()),
        ]);

        assert_eq!(decoder.decode(&blank_frame(), &roi()), Some("A".into()));
        assert_eq!(decoder.decode(&blank_frame(), &roi()), None);
        assert_eq!(decoder.decode(&blank_frame(), &roi()), Some("B".into()));
        // Script exhausted: misses from here on.
        assert_eq!(decoder.decode(&blank_frame(), &roi()), None);
    }

    #[test]
    fn test_cycling_decoder_wraps() {
        let decoder = ScriptedDecoder::cycling(vec![Some("A".into()), None]);

        assert_eq!(decoder.decode(&blank_frame(), &roi()), Some("A".into()));
        assert_eq!(decoder.decode(&blank_frame(), &roi()), None);
        assert_eq!(decoder.decode(&blank_frame(), &roi()), Some("A".into()));
    }
}
