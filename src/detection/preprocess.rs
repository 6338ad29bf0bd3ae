use crate::frame::luma;
use image::{imageops, GrayImage, Luma, RgbImage};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};
use imageproc::filter::separable_filter_equal;

/// Side length of the square blur window
pub const BLUR_KERNEL_SIZE: usize = 7;

/// Resize to the working resolution.
///
/// Frames already at the target size are copied unchanged. Shrinking uses
/// area averaging; anything else falls back to a triangle filter.
pub fn resize(image: &RgbImage, width: u32, height: u32) -> RgbImage {
    let _span = tracing::debug_span!("resize").entered();

    let (src_width, src_height) = image.dimensions();
    if (src_width, src_height) == (width, height) {
        image.clone()
    } else if src_width >= width && src_height >= height {
        imageops::thumbnail(image, width, height)
    } else {
        imageops::resize(image, width, height, imageops::FilterType::Triangle)
    }
}

/// Single-channel BT.601 luminance
pub fn grayscale(image: &RgbImage) -> GrayImage {
    let _span = tracing::debug_span!("grayscale").entered();
    let (width, height) = image.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        let [r, g, b] = image.get_pixel(x, y).0;
        Luma([luma(r, g, b)])
    })
}

/// Normalised 1-D Gaussian taps for a window of `size` pixels.
///
/// Sigma is derived from the window: `0.3 * ((size - 1) / 2 - 1) + 0.8`.
pub fn gaussian_kernel(size: usize) -> Vec<f32> {
    let sigma = 0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let center = (size / 2) as f32;

    let taps: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - center;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();

    let sum: f32 = taps.iter().sum();
    taps.into_iter().map(|t| t / sum).collect()
}

/// Separable Gaussian blur with a `BLUR_KERNEL_SIZE` window
pub fn blur(image: &GrayImage) -> GrayImage {
    let _span = tracing::debug_span!("blur").entered();
    let kernel = gaussian_kernel(BLUR_KERNEL_SIZE);
    separable_filter_equal(image, &kernel)
}

/// Two-level image split at the level picked by Otsu's method.
///
/// Pixels strictly above the level become 255, everything else 0.
pub fn binarize(image: &GrayImage) -> GrayImage {
    let _span = tracing::debug_span!("binarize").entered();
    let level = otsu_level(image);
    tracing::trace!("Otsu level {}", level);
    threshold(image, level, ThresholdType::Binary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn resize_same_size_is_identity() {
        let image = RgbImage::from_fn(640, 480, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 7]));
        let resized = resize(&image, 640, 480);
        assert_eq!(resized, image);
    }

    #[test]
    fn resize_downscales_to_target() {
        let image = RgbImage::from_pixel(1280, 960, Rgb([200, 100, 50]));
        let resized = resize(&image, 640, 480);
        assert_eq!(resized.dimensions(), (640, 480));
        assert_eq!(resized.get_pixel(320, 240), &Rgb([200, 100, 50]));
    }

    #[test]
    fn resize_upscales_to_target() {
        let image = RgbImage::from_pixel(320, 240, Rgb([9, 9, 9]));
        let resized = resize(&image, 640, 480);
        assert_eq!(resized.dimensions(), (640, 480));
    }

    #[test]
    fn kernel_is_normalised_and_symmetric() {
        let kernel = gaussian_kernel(BLUR_KERNEL_SIZE);
        assert_eq!(kernel.len(), 7);

        let sum: f32 = kernel.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        for i in 0..3 {
            assert!((kernel[i] - kernel[6 - i]).abs() < 1e-6);
            assert!(kernel[i] < kernel[i + 1]);
        }
    }

    #[test]
    fn blur_keeps_flat_image_flat() {
        let image = GrayImage::from_pixel(20, 20, Luma([80]));
        let blurred = blur(&image);
        assert!(blurred.pixels().all(|p| (p[0] as i32 - 80).abs() <= 1));
    }

    #[test]
    fn binarize_produces_two_levels() {
        let image = GrayImage::from_fn(64, 64, |x, _| {
            if x < 20 {
                Luma([30])
            } else if x < 40 {
                Luma([35])
            } else {
                Luma([220])
            }
        });
        let binary = binarize(&image);

        assert!(binary.pixels().all(|p| p[0] == 0 || p[0] == 255));
        assert_eq!(binary.get_pixel(10, 10)[0], 0);
        assert_eq!(binary.get_pixel(30, 10)[0], 0);
        assert_eq!(binary.get_pixel(50, 10)[0], 255);
    }

    #[test]
    fn red_is_brighter_than_dark_gray() {
        let mut image = RgbImage::from_pixel(2, 1, Rgb([60, 60, 60]));
        image.put_pixel(1, 0, Rgb([255, 0, 0]));
        let gray = grayscale(&image);

        assert_eq!(gray.get_pixel(0, 0)[0], 60);
        assert_eq!(gray.get_pixel(1, 0)[0], 76);
    }

    #[test]
    fn grayscale_of_white_is_white() {
        let image = RgbImage::from_pixel(4, 4, Rgb([255, 255, 255]));
        assert!(grayscale(&image).pixels().all(|p| p[0] == 255));
    }
}
