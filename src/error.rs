use thiserror::Error;

/// Errors raised by a camera frame source
#[derive(Debug, Error)]
pub enum CaptureError {
    /// No device could be opened at the requested index. Fatal at startup.
    #[error("camera {index} unavailable: {reason}")]
    DeviceUnavailable { index: u32, reason: String },

    /// The device produced a buffer that could not be decoded to RGB
    #[error("failed to decode camera frame: {0}")]
    Decode(String),
}

/// Errors raised while processing a single frame.
///
/// These only ever cost the current tick.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProcessingError {
    #[error("unsupported channel count {found} (expected {expected})")]
    UnsupportedChannels { expected: u8, found: u8 },

    #[error("row stride {stride} is shorter than a {width}x{channels} row")]
    InvalidStride {
        stride: usize,
        width: u32,
        channels: u8,
    },

    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("frame has zero width or height")]
    EmptyImage,
}
