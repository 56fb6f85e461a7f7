use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use tape_vision_core::BoundingBox;

/// Value published for every measurement when no target is seen.
pub const SENTINEL: f64 = -1.0;
/// Sentinel for two-component fields (centers, sizes).
pub const SENTINEL_PAIR: [f64; 2] = [SENTINEL, SENTINEL];

/// Absolute geometry of an ordered target pair, in frame coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetPair {
    /// Smallest box enclosing both targets.
    pub enclosing: BoundingBox,
    /// Left-most (or top-most, when stacked) target.
    pub target1: BoundingBox,
    /// Right-most (or bottom-most, when stacked) target.
    pub target2: BoundingBox,
}

/// Output of one pipeline iteration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    pub see_target: bool,
    /// Center of the enclosing box.
    pub center: [f64; 2],
    /// `[width, height]` of the enclosing box.
    pub bounds_total: [f64; 2],
    pub target1_center: [f64; 2],
    pub target2_center: [f64; 2],
    pub target1_bounds: [f64; 2],
    pub target2_bounds: [f64; 2],
    /// Wall-clock processing time. Measured whether or not a target is seen.
    pub processing_duration_ms: f64,
    /// Capture time of the source frame.
    pub timestamp: SystemTime,
    /// Absolute boxes behind the published numbers; `None` without a target.
    pub geometry: Option<TargetPair>,
}

impl DetectionResult {
    /// "No target" result: every measurement carries the sentinel.
    pub fn no_target(timestamp: SystemTime) -> Self {
        Self {
            see_target: false,
            center: SENTINEL_PAIR,
            bounds_total: SENTINEL_PAIR,
            target1_center: SENTINEL_PAIR,
            target2_center: SENTINEL_PAIR,
            target1_bounds: SENTINEL_PAIR,
            target2_bounds: SENTINEL_PAIR,
            processing_duration_ms: SENTINEL,
            timestamp,
            geometry: None,
        }
    }

    /// Result for a paired detection.
    pub fn from_pair(pair: TargetPair, timestamp: SystemTime) -> Self {
        let center = pair.enclosing.center();
        let c1 = pair.target1.center();
        let c2 = pair.target2.center();
        Self {
            see_target: true,
            center: [center.x, center.y],
            bounds_total: pair.enclosing.size(),
            target1_center: [c1.x, c1.y],
            target2_center: [c2.x, c2.y],
            target1_bounds: pair.target1.size(),
            target2_bounds: pair.target2.size(),
            processing_duration_ms: SENTINEL,
            timestamp,
            geometry: Some(pair),
        }
    }

    pub fn with_duration_ms(mut self, ms: f64) -> Self {
        self.processing_duration_ms = ms;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_target_uses_sentinels_everywhere() {
        let r = DetectionResult::no_target(SystemTime::UNIX_EPOCH);
        assert!(!r.see_target);
        for v in [
            r.center,
            r.bounds_total,
            r.target1_center,
            r.target2_center,
            r.target1_bounds,
            r.target2_bounds,
        ] {
            assert_eq!(v, SENTINEL_PAIR);
        }
        assert!(r.geometry.is_none());
    }

    #[test]
    fn from_pair_publishes_sizes_and_midpoints() {
        let pair = TargetPair {
            enclosing: BoundingBox::new(10, 10, 60, 30),
            target1: BoundingBox::new(10, 10, 20, 30),
            target2: BoundingBox::new(50, 15, 20, 25),
        };
        let r = DetectionResult::from_pair(pair, SystemTime::UNIX_EPOCH);
        assert!(r.see_target);
        assert_eq!(r.center, [40.0, 25.0]);
        assert_eq!(r.bounds_total, [60.0, 30.0]);
        assert_eq!(r.target1_center, [20.0, 25.0]);
        assert_eq!(r.target2_center, [60.0, 27.5]);
        assert_eq!(r.target2_bounds, [20.0, 25.0]);
    }
}
