//! Per-frame detection pipeline for paired retroreflective targets.
//!
//! The stages run in a fixed order on every frame:
//! 1. [`segment`]: BGR frame -> HLS -> binary mask by inclusive range test.
//! 2. [`extract_contours`]: every closed outline in the mask (outer and hole
//!    borders), chain-compressed along straight runs.
//! 3. [`filter_contours`]: order-preserving geometric filter, area-only or full.
//! 4. [`pair_targets`]: the two largest survivors ordered left/top and
//!    right/bottom, plus combined and per-target geometry.
//!
//! [`TargetPipeline`] composes the four stages and owns their scratch buffers.
//! Tunables live in an immutable [`PipelineConfig`] published through
//! [`ConfigState`], so a pipeline reads one consistent snapshot per frame
//! while another thread keeps tuning.
//!
//! ## Quickstart
//!
//! ```
//! use tape_vision_core::BgrFrame;
//! use tape_vision_pipeline::{PipelineConfig, TargetPipeline};
//! use std::time::SystemTime;
//!
//! let frame = BgrFrame::new(320, 240).unwrap();
//! let mut pipeline = TargetPipeline::new();
//! let result = pipeline.process(&frame.view(), &PipelineConfig::default(), SystemTime::now());
//! assert!(!result.see_target);
//! ```

mod config_state;
mod contours;
mod filter;
mod pairing;
mod params;
mod pipeline;
mod result;
mod segment;

pub use config_state::{ConfigKey, ConfigState};
pub use contours::{extract_contours, extract_contours_into};
pub use filter::{filter_contours, filter_contours_into, passes_filter};
pub use pairing::{pair_bounding_boxes, pair_targets};
pub use params::{
    ContourFilterConfig, FilterMode, PairingConfig, PipelineConfig, Range, ThresholdConfig,
};
pub use pipeline::TargetPipeline;
pub use result::{DetectionResult, TargetPair, SENTINEL, SENTINEL_PAIR};
pub use segment::{bgr_to_hls, segment, segment_into};
