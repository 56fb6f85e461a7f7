//! Geometric contour filtering.

use tape_vision_core::Contour;

use crate::params::{ContourFilterConfig, FilterMode};

/// Whether one contour satisfies the configured criteria.
///
/// In [`FilterMode::Full`] a contour with zero convex-hull area or zero
/// bounding height is rejected, since solidity or aspect ratio is undefined.
pub fn passes_filter(contour: &Contour, cfg: &ContourFilterConfig) -> bool {
    match cfg.mode {
        FilterMode::AreaOnly => contour.area() >= cfg.min_area,
        FilterMode::Full => passes_full(contour, cfg),
    }
}

fn passes_full(contour: &Contour, cfg: &ContourFilterConfig) -> bool {
    let Some(bb) = contour.bounding_box() else {
        return false;
    };
    let (w, h) = (bb.width as f64, bb.height as f64);
    if w < cfg.min_width || w > cfg.max_width {
        return false;
    }
    if h < cfg.min_height || h > cfg.max_height {
        return false;
    }
    let area = contour.area();
    if area < cfg.min_area {
        return false;
    }
    if contour.perimeter() < cfg.min_perimeter {
        return false;
    }
    let Some(solidity) = contour.solidity() else {
        return false;
    };
    if !cfg.solidity.contains(solidity) {
        return false;
    }
    let vertices = contour.vertex_count() as f64;
    if vertices < cfg.min_vertices || vertices > cfg.max_vertices {
        return false;
    }
    let Some(ratio) = contour.aspect_ratio() else {
        return false;
    };
    cfg.min_ratio <= ratio && ratio <= cfg.max_ratio
}

/// Order-preserving subset of `contours` that pass the filter.
pub fn filter_contours(contours: &[Contour], cfg: &ContourFilterConfig) -> Vec<Contour> {
    let mut out = Vec::new();
    filter_contours_into(contours, cfg, &mut out);
    out
}

/// Like [`filter_contours`], writing into a reused vector.
pub fn filter_contours_into(
    contours: &[Contour],
    cfg: &ContourFilterConfig,
    out: &mut Vec<Contour>,
) {
    out.clear();
    out.extend(contours.iter().filter(|c| passes_filter(c, cfg)).cloned());
}
