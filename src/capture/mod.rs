mod webcam;

pub use webcam::WebcamCapture;

use crate::error::CaptureError;
use crate::frame::Frame;
use std::num::NonZeroUsize;

/// A camera seen as a pull-based sequence of frames
pub trait FrameSource {
    /// Retrieve the most recent frame.
    ///
    /// Returns `Ok(None)` when the device had nothing for this cycle
    /// (warm-up, transient stall, or a closed source).
    fn pull(&mut self) -> Result<Option<Frame>, CaptureError>;

    /// Bound the device's internal frame queue so stale frames are dropped.
    ///
    /// Best-effort: backends without a queue-depth control accept and
    /// ignore the value.
    fn set_buffer_limit(&mut self, limit: NonZeroUsize);

    /// The last limit passed to `set_buffer_limit`, if any
    fn buffer_limit(&self) -> Option<NonZeroUsize>;

    /// Release the device. Calling this more than once is a no-op.
    fn close(&mut self);
}
