//! Integer polygon geometry.
//!
//! Contours are closed polygons over pixel coordinates. Everything a filter
//! or pairing step needs (area, perimeter, bounding box, hull) is derived on
//! demand; nothing is cached on the contour itself.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::PixelPoint;

/// Axis-aligned box in pixel coordinates. Extents are never negative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    /// Build a box, clamping negative extents to zero.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width: width.max(0),
            height: height.max(0),
        }
    }

    /// Tight box around a set of pixels (`width = max_x - min_x + 1`).
    pub fn from_points(points: &[PixelPoint]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y) = (first.x, first.y);
        let (mut max_x, mut max_y) = (first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    #[inline]
    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    /// `[width, height]` as floats, the shape published on the wire.
    #[inline]
    pub fn size(&self) -> [f64; 2] {
        [self.width as f64, self.height as f64]
    }

    #[inline]
    pub fn center(&self) -> Point2<f64> {
        Point2::new(
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }

    /// Smallest box enclosing both `self` and `other`.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        BoundingBox::new(x, y, right - x, bottom - y)
    }

    /// Inclusive containment test on both edges.
    pub fn contains_point(&self, p: Point2<f64>) -> bool {
        p.x >= self.x as f64
            && p.x <= self.right() as f64
            && p.y >= self.y as f64
            && p.y <= self.bottom() as f64
    }

    /// Whether `other` lies fully inside `self`.
    pub fn encloses(&self, other: &BoundingBox) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

/// Closed outline of a foreground region.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contour {
    pub points: Vec<PixelPoint>,
}

impl Contour {
    pub fn new(points: Vec<PixelPoint>) -> Self {
        Self { points }
    }

    /// Axis-aligned rectangle outline with corners only.
    pub fn rectangle(x: i32, y: i32, width: i32, height: i32) -> Self {
        let (r, b) = (x + width - 1, y + height - 1);
        Self::new(vec![
            Point2::new(x, y),
            Point2::new(x, b),
            Point2::new(r, b),
            Point2::new(r, y),
        ])
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }

    /// Unsigned polygon area (shoelace).
    pub fn area(&self) -> f64 {
        polygon_area(&self.points)
    }

    /// Closed arc length, including the edge back to the first point.
    pub fn perimeter(&self) -> f64 {
        let n = self.points.len();
        if n < 2 {
            return 0.0;
        }
        let mut total = 0.0;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            let dx = (b.x - a.x) as f64;
            let dy = (b.y - a.y) as f64;
            total += (dx * dx + dy * dy).sqrt();
        }
        total
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(&self.points)
    }

    pub fn convex_hull(&self) -> Vec<PixelPoint> {
        convex_hull(&self.points)
    }

    pub fn hull_area(&self) -> f64 {
        polygon_area(&self.convex_hull())
    }

    /// `100 * area / hull_area`; `None` when the hull has no area.
    pub fn solidity(&self) -> Option<f64> {
        let hull_area = self.hull_area();
        if hull_area <= 0.0 {
            return None;
        }
        Some(100.0 * self.area() / hull_area)
    }

    /// Bounding `width / height`; `None` for an empty contour or zero height.
    pub fn aspect_ratio(&self) -> Option<f64> {
        let bb = self.bounding_box()?;
        if bb.height == 0 {
            return None;
        }
        Some(bb.width as f64 / bb.height as f64)
    }
}

/// Unsigned area of a closed polygon.
pub fn polygon_area(points: &[PixelPoint]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice = 0i64;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        twice += a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64;
    }
    twice.abs() as f64 / 2.0
}

#[inline]
fn cross(o: PixelPoint, a: PixelPoint, b: PixelPoint) -> i64 {
    (a.x - o.x) as i64 * (b.y - o.y) as i64 - (a.y - o.y) as i64 * (b.x - o.x) as i64
}

/// Convex hull (Andrew's monotone chain), counter-clockwise in image axes,
/// collinear points dropped.
pub fn convex_hull(points: &[PixelPoint]) -> Vec<PixelPoint> {
    let mut pts: Vec<PixelPoint> = points.to_vec();
    pts.sort_unstable_by(|a, b| (a.x, a.y).cmp(&(b.x, b.y)));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    let mut hull: Vec<PixelPoint> = Vec::with_capacity(pts.len() * 2);
    for &p in &pts {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0 {
            hull.pop();
        }
        hull.push(p);
    }
    let lower_len = hull.len() + 1;
    for &p in pts.iter().rev().skip(1) {
        while hull.len() >= lower_len && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0
        {
            hull.pop();
        }
        hull.push(p);
    }
    hull.pop();
    hull
}
