mod loopback;

pub use loopback::V4L2Output;

use crate::frame::{Channels, Frame};
use anyhow::Result;
use image::{DynamicImage, GrayImage, RgbImage};

/// Anything that can show an annotated frame
pub trait DisplaySink {
    fn show(&mut self, image: &DynamicImage) -> Result<()>;
}

/// Sink for headless runs: frames are converted then dropped
#[derive(Debug, Default)]
pub struct Discard;

impl DisplaySink for Discard {
    fn show(&mut self, _image: &DynamicImage) -> Result<()> {
        Ok(())
    }
}

impl DisplaySink for Box<dyn DisplaySink> {
    fn show(&mut self, image: &DynamicImage) -> Result<()> {
        (**self).show(image)
    }
}

/// Convert a frame into an owned display image.
///
/// Any size mismatch between the frame's geometry and its buffer is logged
/// and reported as no image for this tick.
pub fn to_display_image(frame: &Frame) -> Option<DynamicImage> {
    let (width, height) = frame.dimensions();
    match pack(width, height, frame.channels(), frame.stride(), frame.data()) {
        Ok(image) => Some(image),
        Err(reason) => {
            tracing::warn!("Failed to convert frame for display: {}", reason);
            None
        }
    }
}

/// Copy `height` rows of `stride` bytes into a packed display image.
///
/// The source must hold exactly `stride * height` bytes and the packed
/// copy exactly `width * height * channels`. `Frame::from_raw` upholds
/// both, so only hand-assembled buffers fail here.
fn pack(
    width: u32,
    height: u32,
    channels: Channels,
    stride: usize,
    data: &[u8],
) -> std::result::Result<DynamicImage, String> {
    let elem_size = channels.count() as usize;
    let row_bytes = width as usize * elem_size;

    let source_len = stride * height as usize;
    if stride < row_bytes || data.len() != source_len {
        return Err(format!(
            "buffer of {} bytes does not match {} rows of stride {}",
            data.len(),
            height,
            stride
        ));
    }

    let mut packed = Vec::with_capacity(row_bytes * height as usize);
    if stride > 0 {
        for row in data.chunks_exact(stride) {
            packed.extend_from_slice(&row[..row_bytes]);
        }
    }

    let expected = row_bytes * height as usize;
    if packed.len() != expected {
        return Err(format!(
            "packed {} bytes, expected {}x{}x{} = {}",
            packed.len(),
            width,
            height,
            elem_size,
            expected
        ));
    }

    let image = match channels {
        Channels::Color => RgbImage::from_raw(width, height, packed).map(DynamicImage::ImageRgb8),
        Channels::Gray => GrayImage::from_raw(width, height, packed).map(DynamicImage::ImageLuma8),
    };
    image.ok_or_else(|| "image buffer rejected packed pixels".to_string())
}
