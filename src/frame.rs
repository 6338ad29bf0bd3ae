use crate::error::ProcessingError;
use image::RgbImage;

/// Pixel layout of a [`Frame`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channels {
    /// 1 byte per pixel luminance
    Gray,
    /// 3 bytes per pixel, R G B order
    Color,
}

impl Channels {
    pub fn count(self) -> u8 {
        match self {
            Channels::Gray => 1,
            Channels::Color => 3,
        }
    }
}

/// BT.601 luma of an RGB triple, rounded to the nearest level
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let weighted = 299 * r as u32 + 587 * g as u32 + 114 * b as u32;
    ((weighted + 500) / 1000) as u8
}

/// An owned grid of pixels.
///
/// Rows are `stride` bytes apart; a row may carry padding past
/// `width * channels`. Each pipeline stage produces a fresh `Frame`
/// rather than sharing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: Channels,
    stride: usize,
}

impl Frame {
    /// Wrap a raw buffer, checking that the stride fits a row and that
    /// the buffer holds exactly `stride * height` bytes.
    pub fn from_raw(
        width: u32,
        height: u32,
        channels: Channels,
        stride: usize,
        data: Vec<u8>,
    ) -> Result<Self, ProcessingError> {
        if width == 0 || height == 0 {
            return Err(ProcessingError::EmptyImage);
        }

        let row_bytes = width as usize * channels.count() as usize;
        if stride < row_bytes {
            return Err(ProcessingError::InvalidStride {
                stride,
                width,
                channels: channels.count(),
            });
        }

        let expected = stride * height as usize;
        if data.len() != expected {
            return Err(ProcessingError::BufferSize {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            data,
            width,
            height,
            channels,
            stride,
        })
    }

    pub fn from_rgb(image: RgbImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            data: image.into_raw(),
            width,
            height,
            channels: Channels::Color,
            stride: width as usize * 3,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn channels(&self) -> Channels {
        self.channels
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Copy the visible part of every row into a tightly packed buffer
    fn packed(&self) -> Vec<u8> {
        let row_bytes = self.width as usize * self.channels.count() as usize;
        if row_bytes == self.stride {
            return self.data.clone();
        }

        let mut packed = Vec::with_capacity(row_bytes * self.height as usize);
        for row in self.data.chunks_exact(self.stride) {
            packed.extend_from_slice(&row[..row_bytes]);
        }
        packed
    }

    /// Copy into an `RgbImage`. Fails for grayscale frames.
    pub fn to_rgb_image(&self) -> Result<RgbImage, ProcessingError> {
        if self.channels != Channels::Color {
            return Err(ProcessingError::UnsupportedChannels {
                expected: 3,
                found: self.channels.count(),
            });
        }

        let packed = self.packed();
        let actual = packed.len();
        RgbImage::from_raw(self.width, self.height, packed).ok_or(ProcessingError::BufferSize {
            expected: self.width as usize * self.height as usize * 3,
            actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn luma_uses_bt601_weights() {
        assert_eq!(luma(255, 0, 0), 76);
        assert_eq!(luma(0, 255, 0), 150);
        assert_eq!(luma(0, 0, 255), 29);
        assert_eq!(luma(255, 255, 255), 255);
        assert_eq!(luma(60, 60, 60), 60);
    }

    #[test]
    fn from_raw_rejects_short_stride() {
        let err = Frame::from_raw(4, 2, Channels::Color, 10, vec![0; 20]).unwrap_err();
        assert_eq!(
            err,
            ProcessingError::InvalidStride {
                stride: 10,
                width: 4,
                channels: 3
            }
        );
    }

    #[test]
    fn from_raw_rejects_wrong_length() {
        let err = Frame::from_raw(4, 2, Channels::Gray, 4, vec![0; 7]).unwrap_err();
        assert_eq!(
            err,
            ProcessingError::BufferSize {
                expected: 8,
                actual: 7
            }
        );
    }

    #[test]
    fn from_raw_rejects_empty() {
        let err = Frame::from_raw(0, 2, Channels::Gray, 4, vec![]).unwrap_err();
        assert_eq!(err, ProcessingError::EmptyImage);
    }

    #[test]
    fn padded_rows_are_dropped_when_packing() {
        // 2x2 RGB with 2 bytes of padding per row
        let data = vec![
            1, 2, 3, 4, 5, 6, 0xee, 0xee, //
            7, 8, 9, 10, 11, 12, 0xee, 0xee,
        ];
        let frame = Frame::from_raw(2, 2, Channels::Color, 8, data).unwrap();
        let rgb = frame.to_rgb_image().unwrap();

        assert_eq!(rgb.get_pixel(1, 0), &Rgb([4, 5, 6]));
        assert_eq!(rgb.get_pixel(0, 1), &Rgb([7, 8, 9]));
        assert_eq!(rgb.into_raw().len(), 12);
    }

    #[test]
    fn channel_mismatch_is_reported() {
        let gray = Frame::from_raw(3, 3, Channels::Gray, 3, vec![0; 9]).unwrap();
        assert_eq!(
            gray.to_rgb_image().unwrap_err(),
            ProcessingError::UnsupportedChannels {
                expected: 3,
                found: 1
            }
        );

        let color = Frame::from_rgb(RgbImage::new(3, 3));
        assert_eq!(color.stride(), 9);
        assert_eq!(color.channels().count(), 3);
    }
}
