//! `nokhwa`-backed capture for real camera hardware.
//!
//! Camera I/O in `nokhwa` is blocking, so every hardware call runs under
//! `block_in_place`. Frames are decoded to RGB and reduced to grayscale
//! before leaving this module; the rest of the crate never sees color.

use super::{CaptureBackend, CaptureDevice, CaptureError, Frame, ScanConfig};
use crate::device::CameraDevice;
use async_trait::async_trait;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
};
use nokhwa::Camera;

/// Capture backend for real camera hardware.
#[derive(Debug, Default)]
pub struct NokhwaBackend;

impl NokhwaBackend {
    /// Creates a new hardware capture backend.
    pub fn new() -> Self {
        Self
    }
}

fn camera_index(device: &CameraDevice) -> CameraIndex {
    match device.id.parse::<u32>() {
        Ok(n) => CameraIndex::Index(n),
        Err(_) => CameraIndex::String(device.id.clone()),
    }
}

/// Formats to try, most specific first. Platforms disagree about which
/// format/resolution combinations they accept.
fn format_candidates(config: &ScanConfig) -> Vec<RequestedFormat<'static>> {
    vec![
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new(
            Resolution::new(1280, 720),
            FrameFormat::MJPEG,
            config.fps,
        ))),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new(
            Resolution::new(640, 480),
            FrameFormat::YUYV,
            config.fps,
        ))),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::None),
    ]
}

#[async_trait]
impl CaptureBackend for NokhwaBackend {
    async fn open(
        &self,
        device: &CameraDevice,
        config: &ScanConfig,
    ) -> Result<Box<dyn CaptureDevice>, CaptureError> {
        config
            .validate()
            .map_err(|e| CaptureError::OpenFailed(e.to_string()))?;

        let index = camera_index(device);
        let candidates = format_candidates(config);

        let camera = tokio::task::block_in_place(|| {
            let mut last_error = String::new();
            for requested in candidates {
                match Camera::new(index.clone(), requested) {
                    Ok(cam) => return Ok(cam),
                    Err(e) => last_error = e.to_string(),
                }
            }
            Err(CaptureError::OpenFailed(last_error))
        })?;

        let mut camera = camera;
        tokio::task::block_in_place(|| camera.open_stream())
            .map_err(|e| CaptureError::OpenFailed(e.to_string()))?;

        tracing::info!(
            device = %device.id,
            name = %camera.info().human_name(),
            resolution = ?camera.resolution(),
            "Opened camera stream"
        );

        Ok(Box::new(NokhwaCaptureDevice {
            device_id: device.id.clone(),
            camera: Some(camera),
            sequence: 0,
        }))
    }
}

/// An open `nokhwa` camera stream.
struct NokhwaCaptureDevice {
    device_id: String,
    camera: Option<Camera>,
    sequence: u64,
}

#[async_trait]
impl CaptureDevice for NokhwaCaptureDevice {
    async fn next_frame(&mut self) -> Result<Frame, CaptureError> {
        let camera = self
            .camera
            .as_mut()
            .ok_or_else(|| CaptureError::FrameFailed("device released".into()))?;

        let decoded = tokio::task::block_in_place(|| {
            let buffer = camera
                .frame()
                .map_err(|e| CaptureError::FrameFailed(e.to_string()))?;
            buffer
                .decode_image::<RgbFormat>()
                .map_err(|e| CaptureError::FrameFailed(e.to_string()))
        })?;

        let width = decoded.width();
        let height = decoded.height();
        let rgb = decoded.into_raw();

        // ITU-R BT.601 luma weights.
        let mut gray = Vec::with_capacity((width * height) as usize);
        for chunk in rgb.chunks_exact(3) {
            let luma =
                (u32::from(chunk[0]) * 299 + u32::from(chunk[1]) * 587 + u32::from(chunk[2]) * 114)
                    / 1000;
            gray.push(luma as u8);
        }

        self.sequence += 1;
        Ok(Frame::new(gray, width, height, self.sequence))
    }

    async fn release(&mut self) -> Result<(), CaptureError> {
        if let Some(mut camera) = self.camera.take() {
            tokio::task::block_in_place(|| camera.stop_stream())
                .map_err(|e| CaptureError::ReleaseFailed(e.to_string()))?;
            tracing::info!(device = %self.device_id, "Released camera stream");
        }
        Ok(())
    }
}
