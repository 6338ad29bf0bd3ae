use super::FrameSource;
use crate::error::CaptureError;
use crate::frame::{Channels, Frame};
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;
use std::num::NonZeroUsize;

pub struct WebcamCapture {
    camera: Camera,
    index: u32,
    buffer_limit: Option<NonZeroUsize>,
    streaming: bool,
}

impl WebcamCapture {
    pub fn open(device_index: u32) -> Result<Self, CaptureError> {
        tracing::info!("Opening webcam {}", device_index);

        let unavailable = |e: nokhwa::NokhwaError| CaptureError::DeviceUnavailable {
            index: device_index,
            reason: e.to_string(),
        };

        let index = CameraIndex::Index(device_index);
        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution);

        let mut camera = Camera::new(index, requested).map_err(unavailable)?;
        camera.open_stream().map_err(unavailable)?;

        let resolution = camera.resolution();
        tracing::info!(
            "Webcam {} streaming at {}x{}",
            device_index,
            resolution.width(),
            resolution.height()
        );

        Ok(Self {
            camera,
            index: device_index,
            buffer_limit: None,
            streaming: true,
        })
    }
}

impl FrameSource for WebcamCapture {
    fn pull(&mut self) -> Result<Option<Frame>, CaptureError> {
        if !self.streaming {
            return Ok(None);
        }

        let buffer = match self.camera.frame() {
            Ok(buffer) => buffer,
            Err(e) => {
                tracing::debug!("No frame from webcam {}: {}", self.index, e);
                return Ok(None);
            }
        };

        if buffer.buffer().is_empty() {
            return Ok(None);
        }

        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CaptureError::Decode(e.to_string()))?;

        let (width, height) = (decoded.width(), decoded.height());
        let frame = Frame::from_raw(
            width,
            height,
            Channels::Color,
            width as usize * 3,
            decoded.into_raw(),
        )
        .map_err(|e| CaptureError::Decode(e.to_string()))?;

        Ok(Some(frame))
    }

    fn set_buffer_limit(&mut self, limit: NonZeroUsize) {
        // nokhwa negotiates its own queue depth
        tracing::debug!(
            "Webcam {} backend has no queue-depth control, buffer limit {} recorded only",
            self.index,
            limit
        );
        self.buffer_limit = Some(limit);
    }

    fn buffer_limit(&self) -> Option<NonZeroUsize> {
        self.buffer_limit
    }

    fn close(&mut self) {
        if !self.streaming {
            return;
        }
        self.streaming = false;

        match self.camera.stop_stream() {
            Ok(()) => tracing::info!("Webcam {} closed", self.index),
            Err(e) => tracing::warn!("Failed to stop webcam {} stream: {}", self.index, e),
        }
    }
}

impl Drop for WebcamCapture {
    fn drop(&mut self) {
        self.close();
    }
}
