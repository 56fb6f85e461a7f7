use serde::{Deserialize, Serialize};

/// Inclusive numeric range. `min > max` is allowed and matches nothing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn contains(&self, v: f64) -> bool {
        self.min <= v && v <= self.max
    }
}

/// HLS segmentation ranges, in the 8-bit HLS convention
/// (hue 0..180, saturation and luminance 0..255).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub hue: Range,
    pub saturation: Range,
    pub luminance: Range,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            hue: Range::new(47.0, 95.0),
            saturation: Range::new(197.0, 255.0),
            luminance: Range::new(83.0, 195.0),
        }
    }
}

/// Which contour criteria are enforced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterMode {
    /// Only `min_area` is checked.
    #[default]
    AreaOnly,
    /// Every criterion in [`ContourFilterConfig`] is checked.
    Full,
}

/// Geometric acceptance criteria for extracted contours.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContourFilterConfig {
    pub mode: FilterMode,
    /// Minimum polygon area in square pixels. Checked in both modes.
    pub min_area: f64,
    pub min_perimeter: f64,
    pub min_width: f64,
    pub max_width: f64,
    pub min_height: f64,
    pub max_height: f64,
    /// Accepted solidity range in percent (`100 * area / hull_area`).
    pub solidity: Range,
    pub min_vertices: f64,
    pub max_vertices: f64,
    /// Bounding `width / height` bounds.
    pub min_ratio: f64,
    pub max_ratio: f64,
}

impl Default for ContourFilterConfig {
    fn default() -> Self {
        Self {
            mode: FilterMode::AreaOnly,
            min_area: 50.0,
            min_perimeter: 0.0,
            min_width: 0.0,
            max_width: 1000.0,
            min_height: 0.0,
            max_height: 1000.0,
            solidity: Range::new(80.0, 100.0),
            min_vertices: 0.0,
            max_vertices: 1_000_000.0,
            min_ratio: 0.0,
            max_ratio: 1000.0,
        }
    }
}

/// Target pairing settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PairingConfig {
    /// Horizontal offset (px) at or below which the two targets are treated
    /// as stacked and ordered by `y` instead of `x`.
    ///
    /// `5.0` was tuned on a 320x240 camera; rescale for other resolutions.
    pub alignment_tolerance_px: f64,
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self {
            alignment_tolerance_px: 5.0,
        }
    }
}

/// Complete, immutable tunable state read once per frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub threshold: ThresholdConfig,
    pub filter: ContourFilterConfig,
    pub pairing: PairingConfig,
}
