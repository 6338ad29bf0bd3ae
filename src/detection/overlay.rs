use super::contours::{BoundingBox, Contour};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

pub const CONTOUR_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
pub const BOX_COLOR: Rgb<u8> = Rgb([0, 0, 255]);

/// Trace the contour outline 2 px wide
pub fn draw_contour(image: &mut RgbImage, contour: &Contour) {
    let points = contour.points();
    let n = points.len();
    if n == 0 {
        return;
    }

    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        for (dx, dy) in [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)] {
            draw_line_segment_mut(
                image,
                (a.x as f32 + dx, a.y as f32 + dy),
                (b.x as f32 + dx, b.y as f32 + dy),
                CONTOUR_COLOR,
            );
        }
    }
}

/// Outline the box with a 2 px border drawn inward
pub fn draw_box(image: &mut RgbImage, bbox: &BoundingBox) {
    draw_hollow_rect_mut(
        image,
        Rect::at(bbox.x, bbox.y).of_size(bbox.width, bbox.height),
        BOX_COLOR,
    );

    if bbox.width > 2 && bbox.height > 2 {
        draw_hollow_rect_mut(
            image,
            Rect::at(bbox.x + 1, bbox.y + 1).of_size(bbox.width - 2, bbox.height - 2),
            BOX_COLOR,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imageproc::point::Point;

    #[test]
    fn box_border_is_two_pixels() {
        let mut image = RgbImage::new(30, 30);
        let bbox = BoundingBox {
            x: 5,
            y: 5,
            width: 10,
            height: 10,
        };
        draw_box(&mut image, &bbox);

        assert_eq!(image.get_pixel(5, 5), &BOX_COLOR);
        assert_eq!(image.get_pixel(6, 6), &BOX_COLOR);
        assert_eq!(image.get_pixel(14, 14), &BOX_COLOR);
        assert_eq!(image.get_pixel(7, 7), &Rgb([0, 0, 0]));
        assert_eq!(image.get_pixel(4, 4), &Rgb([0, 0, 0]));
    }

    #[test]
    fn contour_is_closed() {
        let mut image = RgbImage::new(30, 30);
        let contour = Contour::new(vec![
            Point::new(2, 2),
            Point::new(20, 2),
            Point::new(20, 20),
        ]);
        draw_contour(&mut image, &contour);

        assert_eq!(image.get_pixel(10, 2), &CONTOUR_COLOR);
        assert_eq!(image.get_pixel(20, 10), &CONTOUR_COLOR);
        // closing edge runs along the diagonal
        assert_eq!(image.get_pixel(11, 11), &CONTOUR_COLOR);
    }

    #[test]
    fn shapes_past_the_edge_are_clipped() {
        let mut image = RgbImage::new(10, 10);
        let contour = Contour::new(vec![Point::new(8, 8), Point::new(9, 8), Point::new(9, 9)]);
        draw_contour(&mut image, &contour);
        draw_box(
            &mut image,
            &BoundingBox {
                x: 8,
                y: 8,
                width: 2,
                height: 2,
            },
        );
        assert_eq!(image.get_pixel(9, 9), &BOX_COLOR);
    }
}
