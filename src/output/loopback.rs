use super::DisplaySink;
use crate::frame::luma;
use anyhow::{Context, Result};
use image::{DynamicImage, RgbImage};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use v4l::video::Output;
use v4l::{Device, FourCC};

/// Virtual webcam fed through a v4l2loopback device
pub struct V4L2Output {
    file: File,
    width: u32,
    height: u32,
}

impl V4L2Output {
    pub fn new<P: AsRef<Path>>(device_path: P, width: u32, height: u32) -> Result<Self> {
        let path = device_path.as_ref();
        tracing::info!(
            "Opening v4l2loopback device at {} ({}x{})",
            path.display(),
            width,
            height
        );

        // Loopback devices usually work without an explicit format
        match Device::with_path(path) {
            Ok(device) => {
                let format = v4l::Format::new(width, height, FourCC::new(b"YUYV"));
                if let Err(e) = device.set_format(&format) {
                    tracing::warn!("Could not set YUYV format (may still work): {}", e);
                }
            }
            Err(e) => tracing::warn!("Could not query {}: {}", path.display(), e),
        }

        let file = File::options()
            .write(true)
            .open(path)
            .with_context(|| format!("Failed to open v4l2loopback device at {}", path.display()))?;

        tracing::info!("v4l2loopback device opened successfully");

        Ok(Self {
            file,
            width,
            height,
        })
    }
}

/// Pack RGB rows as full-range YUYV 4:2:2.
///
/// Each horizontal pixel pair shares the chroma of its mean colour; an odd
/// trailing pixel is paired with itself.
fn to_yuyv(rgb: &RgbImage) -> Vec<u8> {
    let (width, height) = rgb.dimensions();
    let row_bytes = width as usize * 3;
    if row_bytes == 0 {
        return Vec::new();
    }
    let mut yuyv = Vec::with_capacity(width.div_ceil(2) as usize * 4 * height as usize);

    for row in rgb.as_raw().chunks_exact(row_bytes) {
        for pair in row.chunks(6) {
            let left = &pair[..3];
            let right = if pair.len() == 6 { &pair[3..] } else { left };

            let mean = |c: usize| (left[c] as f32 + right[c] as f32) / 2.0;
            let (cb, cr) = chroma(mean(0), mean(1), mean(2));

            yuyv.push(luma(left[0], left[1], left[2]));
            yuyv.push(cb);
            yuyv.push(luma(right[0], right[1], right[2]));
            yuyv.push(cr);
        }
    }

    yuyv
}

/// JFIF (full-range BT.601) blue and red difference
fn chroma(r: f32, g: f32, b: f32) -> (u8, u8) {
    let cb = 128.0 - 0.168_736 * r - 0.331_264 * g + 0.5 * b;
    let cr = 128.0 + 0.5 * r - 0.418_688 * g - 0.081_312 * b;
    (
        cb.round().clamp(0.0, 255.0) as u8,
        cr.round().clamp(0.0, 255.0) as u8,
    )
}

impl DisplaySink for V4L2Output {
    fn show(&mut self, image: &DynamicImage) -> Result<()> {
        // Luma frames are expanded to grey RGB
        let mut rgb = image.to_rgb8();
        if rgb.dimensions() != (self.width, self.height) {
            rgb = image::imageops::resize(
                &rgb,
                self.width,
                self.height,
                image::imageops::FilterType::Triangle,
            );
        }

        let yuyv = to_yuyv(&rgb);
        self.file
            .write_all(&yuyv)
            .context("Failed to write frame to v4l2loopback device")?;

        Ok(())
    }
}
