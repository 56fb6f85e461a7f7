//! Contour extraction from binary masks.

use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use imageproc::point::Point;
use nalgebra::Point2;
use tape_vision_core::{Contour, PixelPoint};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Extract every closed outline from `mask` (non-zero = foreground).
///
/// With `external_only = false` both outer borders and hole borders are
/// returned, nested ones included. With `external_only = true` only the
/// outermost borders are kept. Output is in tracing order (raster order of
/// each border's starting pixel), not sorted.
pub fn extract_contours(mask: &GrayImage, external_only: bool) -> Vec<Contour> {
    let mut out = Vec::new();
    extract_contours_into(mask, external_only, &mut out);
    out
}

/// Like [`extract_contours`], writing into a reused vector.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip_all, fields(width = mask.width(), height = mask.height()))
)]
pub fn extract_contours_into(mask: &GrayImage, external_only: bool, out: &mut Vec<Contour>) {
    out.clear();
    for traced in find_contours::<i32>(mask) {
        if external_only
            && (!matches!(traced.border_type, BorderType::Outer) || traced.parent.is_some())
        {
            continue;
        }
        out.push(Contour::new(compress_chain(&traced.points)));
    }
}

/// Drop every traced point whose entering step equals its leaving step, so
/// straight horizontal, vertical and diagonal runs keep only their ends.
fn compress_chain(points: &[Point<i32>]) -> Vec<PixelPoint> {
    let n = points.len();
    if n <= 2 {
        return points.iter().map(|p| Point2::new(p.x, p.y)).collect();
    }

    let mut out = Vec::with_capacity(n / 2 + 2);
    for i in 0..n {
        let prev = points[(i + n - 1) % n];
        let cur = points[i];
        let next = points[(i + 1) % n];
        let step_in = (cur.x - prev.x, cur.y - prev.y);
        let step_out = (next.x - cur.x, next.y - cur.y);
        if step_in == step_out && step_in != (0, 0) {
            continue;
        }
        out.push(Point2::new(cur.x, cur.y));
    }
    if out.is_empty() {
        // every step identical cannot close a polygon; keep the trace as is
        return points.iter().map(|p| Point2::new(p.x, p.y)).collect();
    }
    out
}
