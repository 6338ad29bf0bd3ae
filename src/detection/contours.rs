use image::{imageops, GrayImage};
use imageproc::contours::{find_contours, BorderType};
use imageproc::point::Point;

/// Axis-aligned rectangle in frame pixels. Both edges are inclusive, so a
/// single pixel has width and height 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Closed polygon tracing the outer border of one foreground region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contour {
    points: Vec<Point<i32>>,
}

impl Contour {
    pub fn new(points: Vec<Point<i32>>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point<i32>] {
        &self.points
    }

    /// Magnitude of the shoelace area of the polygon
    pub fn area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }

        let twice: i64 = (0..n)
            .map(|i| {
                let a = self.points[i];
                let b = self.points[(i + 1) % n];
                a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64
            })
            .sum();

        twice.abs() as f64 / 2.0
    }

    /// Smallest rectangle holding every point, or `None` for an empty contour
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let first = self.points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);

        for p in &self.points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        Some(BoundingBox {
            x: min_x,
            y: min_y,
            width: (max_x - min_x + 1) as u32,
            height: (max_y - min_y + 1) as u32,
        })
    }
}

/// Outer borders of every top-level foreground region in a binary image.
///
/// Holes and regions nested inside holes are skipped. Each border is
/// compressed to the endpoints of its straight runs. Order follows the
/// raster scan that discovered each border, so it is stable for a given
/// image.
///
/// Regions touching the image edge are traced as if the image sat inside a
/// 1 px background frame, so their points still lie on the image.
pub fn external_contours(binary: &GrayImage) -> Vec<Contour> {
    let _span = tracing::debug_span!("contours").entered();

    let (width, height) = binary.dimensions();
    let mut padded = GrayImage::new(width + 2, height + 2);
    imageops::replace(&mut padded, binary, 1, 1);

    find_contours::<i32>(&padded)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| {
            let points = c
                .points
                .into_iter()
                .map(|p| Point::new(p.x - 1, p.y - 1))
                .collect();
            Contour::new(compress(points))
        })
        .collect()
}

/// Drop every point that continues the previous step in the same direction
fn compress(mut points: Vec<Point<i32>>) -> Vec<Point<i32>> {
    points.dedup();
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }

    let n = points.len();
    if n < 3 {
        return points;
    }

    let step = |a: Point<i32>, b: Point<i32>| ((b.x - a.x).signum(), (b.y - a.y).signum());

    (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            step(prev, points[i]) != step(points[i], next)
        })
        .map(|i| points[i])
        .collect()
}

/// First contour with the strictly largest positive area
pub fn largest(contours: &[Contour]) -> Option<(usize, f64)> {
    let mut best = None;
    let mut max_area = 0.0;

    for (i, contour) in contours.iter().enumerate() {
        let area = contour.area();
        if area > max_area {
            max_area = area;
            best = Some((i, area));
        }
    }

    best
}
