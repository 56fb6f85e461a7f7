use std::time::{Instant, SystemTime};

use image::GrayImage;
use tape_vision_core::{BgrFrameView, Contour};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::contours::extract_contours_into;
use crate::filter::filter_contours_into;
use crate::pairing::pair_targets;
use crate::params::PipelineConfig;
use crate::result::DetectionResult;
use crate::segment::segment_into;

/// Segment, extract, filter and pair, reusing buffers across frames.
///
/// The intermediate products of the last frame stay readable through
/// [`mask`](Self::mask), [`contours`](Self::contours) and
/// [`filtered`](Self::filtered) until the next call to
/// [`process`](Self::process).
#[derive(Debug, Default)]
pub struct TargetPipeline {
    mask: GrayImage,
    contours: Vec<Contour>,
    filtered: Vec<Contour>,
}

impl TargetPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every stage on one frame.
    ///
    /// `timestamp` is the capture time of the frame and is copied into the
    /// result. `processing_duration_ms` spans all four stages.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip_all, fields(width = frame.width, height = frame.height))
    )]
    pub fn process(
        &mut self,
        frame: &BgrFrameView<'_>,
        cfg: &PipelineConfig,
        timestamp: SystemTime,
    ) -> DetectionResult {
        let started = Instant::now();

        segment_into(frame, &cfg.threshold, &mut self.mask);
        extract_contours_into(&self.mask, false, &mut self.contours);
        filter_contours_into(&self.contours, &cfg.filter, &mut self.filtered);
        let result = pair_targets(&self.filtered, &cfg.pairing, timestamp);

        let elapsed_ms = started.elapsed().as_secs_f64() * 1e3;
        log::debug!(
            "frame {}x{}: {} contours, {} kept, see_target={} ({elapsed_ms:.2} ms)",
            frame.width,
            frame.height,
            self.contours.len(),
            self.filtered.len(),
            result.see_target,
        );
        result.with_duration_ms(elapsed_ms)
    }

    /// Binary mask of the last processed frame.
    #[inline]
    pub fn mask(&self) -> &GrayImage {
        &self.mask
    }

    /// Every contour of the last mask, before filtering.
    #[inline]
    pub fn contours(&self) -> &[Contour] {
        &self.contours
    }

    /// Contours that passed the filter on the last frame.
    #[inline]
    pub fn filtered(&self) -> &[Contour] {
        &self.filtered
    }
}
