mod contours;
mod overlay;
mod preprocess;

pub use contours::{BoundingBox, Contour};

use crate::error::ProcessingError;
use crate::frame::Frame;

/// Working resolution every frame is resized to before detection
pub const WORKING_WIDTH: u32 = 640;
pub const WORKING_HEIGHT: u32 = 480;

/// The dominant foreground region of a frame
#[derive(Debug, Clone, PartialEq)]
pub struct HandRegion {
    pub contour: Contour,
    pub bounding_box: BoundingBox,
    pub area: f64,
}

/// `None` when the frame holds no region of positive area
pub type DetectionResult = Option<HandRegion>;

/// Outcome of one `detect` call: the numeric result plus the resized frame
/// with the winning contour and box drawn on it
#[derive(Debug, Clone)]
pub struct Detection {
    pub hand: DetectionResult,
    pub annotated: Frame,
}

/// Finds the largest foreground blob in a frame.
///
/// Stateless: every call re-derives the result from the frame alone.
pub struct Detector {
    width: u32,
    height: u32,
}

impl Default for Detector {
    fn default() -> Self {
        Self::new(WORKING_WIDTH, WORKING_HEIGHT)
    }
}

impl Detector {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn working_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Run the full pipeline on one colour frame.
    ///
    /// Steps:
    /// 1. Resize to the working resolution
    /// 2. Grayscale
    /// 3. 7x7 Gaussian blur
    /// 4. Otsu binarisation
    /// 5. External contour extraction
    /// 6. Largest-area selection
    /// 7. Bounding box and overlay
    pub fn detect(&self, frame: &Frame) -> Result<Detection, ProcessingError> {
        let _span = tracing::debug_span!("detect").entered();

        let input = frame.to_rgb_image()?;
        let mut resized = preprocess::resize(&input, self.width, self.height);

        let gray = preprocess::grayscale(&resized);
        let blurred = preprocess::blur(&gray);
        let binary = preprocess::binarize(&blurred);

        let mut found = contours::external_contours(&binary);
        tracing::debug!("{} external contours", found.len());

        let hand = match contours::largest(&found) {
            Some((index, area)) => {
                let contour = found.swap_remove(index);
                contour.bounding_box().map(|bounding_box| HandRegion {
                    contour,
                    bounding_box,
                    area,
                })
            }
            None => None,
        };

        if let Some(region) = &hand {
            overlay::draw_contour(&mut resized, &region.contour);
            overlay::draw_box(&mut resized, &region.bounding_box);
        }

        Ok(Detection {
            hand,
            annotated: Frame::from_rgb(resized),
        })
    }
}
