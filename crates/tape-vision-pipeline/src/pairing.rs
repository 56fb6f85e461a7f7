//! Dual-target pairing.
//!
//! Targets come in pairs of reflective strips. The two largest candidates
//! are ordered so that `target1` is the left one, or the top one when the
//! strips are stacked (horizontal offset within the alignment tolerance).
//! Seen from an angle, side-by-side strips shift vertically in the image,
//! so a pure x-sort would flip them whenever they are nearly aligned.

use std::time::{Instant, SystemTime};

use tape_vision_core::{BoundingBox, Contour};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::params::PairingConfig;
use crate::result::{DetectionResult, TargetPair};

/// Pair the two largest boxes (by area; earlier wins ties).
///
/// Returns `None` with fewer than two boxes.
pub fn pair_bounding_boxes(boxes: &[BoundingBox], cfg: &PairingConfig) -> Option<TargetPair> {
    let mut largest: Option<BoundingBox> = None;
    let mut second: Option<BoundingBox> = None;
    for &bb in boxes {
        if largest.map_or(true, |l| bb.area() > l.area()) {
            second = largest;
            largest = Some(bb);
        } else if second.map_or(true, |s| bb.area() > s.area()) {
            second = Some(bb);
        }
    }
    let (largest, second) = (largest?, second?);

    let dx = (largest.x as f64 - second.x as f64).abs();
    let largest_first = if dx > cfg.alignment_tolerance_px {
        largest.x < second.x
    } else {
        largest.y < second.y
    };
    let (target1, target2) = if largest_first {
        (largest, second)
    } else {
        (second, largest)
    };

    Some(TargetPair {
        enclosing: target1.union(&target2),
        target1,
        target2,
    })
}

/// Pair filtered contours into a [`DetectionResult`].
///
/// `processing_duration_ms` covers the pairing work only; callers measuring
/// the whole frame overwrite it.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip_all, fields(candidates = contours.len()))
)]
pub fn pair_targets(
    contours: &[Contour],
    cfg: &PairingConfig,
    timestamp: SystemTime,
) -> DetectionResult {
    let started = Instant::now();
    let boxes: Vec<BoundingBox> = contours.iter().filter_map(Contour::bounding_box).collect();
    let result = match pair_bounding_boxes(&boxes, cfg) {
        Some(pair) => DetectionResult::from_pair(pair, timestamp),
        None => DetectionResult::no_target(timestamp),
    };
    result.with_duration_ms(started.elapsed().as_secs_f64() * 1e3)
}
