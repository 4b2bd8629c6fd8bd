//! Decode region-of-interest math.

/// The sub-area of a frame analyzed for a decodable code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionOfInterest {
    /// Left edge in frame pixels.
    pub x: u32,
    /// Top edge in frame pixels.
    pub y: u32,
    /// Region width in pixels.
    pub width: u32,
    /// Region height in pixels.
    pub height: u32,
}

impl RegionOfInterest {
    /// Computes the centered decode region for a frame.
    ///
    /// `size` is the logical side length; `aspect_ratio` is width/height.
    /// The region is clamped to the frame dimensions, so small frames are
    /// analyzed whole.
    pub fn centered(frame_width: u32, frame_height: u32, size: u32, aspect_ratio: f32) -> Self {
        let width = size.min(frame_width);
        let height = ((f64::from(size) / f64::from(aspect_ratio)).round() as u32)
            .max(1)
            .min(frame_height);

        Self {
            x: (frame_width - width) / 2,
            y: (frame_height - height) / 2,
            width,
            height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_square_region() {
        let roi = RegionOfInterest::centered(640, 480, 250, 1.0);
        assert_eq!(roi.width, 250);
        assert_eq!(roi.height, 250);
        assert_eq!(roi.x, 195);
        assert_eq!(roi.y, 115);
    }

    #[test]
    fn test_region_clamped_to_small_frame() {
        let roi = RegionOfInterest::centered(100, 80, 250, 1.0);
        assert_eq!(roi.width, 100);
        assert_eq!(roi.height, 80);
        assert_eq!(roi.x, 0);
        assert_eq!(roi.y, 0);
    }

    #[test]
    fn test_wide_aspect_ratio() {
        let roi = RegionOfInterest::centered(640, 480, 200, 2.0);
        assert_eq!(roi.width, 200);
        assert_eq!(roi.height, 100);
    }
}
