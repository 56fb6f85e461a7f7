//! One-shot helpers from `image` buffers.

use std::path::Path;
use std::time::SystemTime;

use image::{ImageReader, RgbImage};

use crate::core::BgrFrame;
use crate::pipeline::{DetectionResult, PipelineConfig, TargetPipeline};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced by the file-based helpers.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// Copy an RGB image into a BGR frame of the same size.
pub fn frame_from_rgb(img: &RgbImage) -> BgrFrame {
    let mut frame = BgrFrame::default();
    frame.copy_from_rgb(img);
    frame
}

/// Run the whole pipeline once on an RGB image.
///
/// The result is stamped with the current wall clock as capture time.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip_all, fields(width = img.width(), height = img.height()))
)]
pub fn detect_targets(img: &RgbImage, cfg: &PipelineConfig) -> DetectionResult {
    let frame = frame_from_rgb(img);
    TargetPipeline::new().process(&frame.view(), cfg, SystemTime::now())
}

/// Decode `path` as RGB and run [`detect_targets`].
pub fn detect_targets_in_file(
    path: impl AsRef<Path>,
    cfg: &PipelineConfig,
) -> Result<DetectionResult, DetectError> {
    let img = ImageReader::open(path)?.decode()?.to_rgb8();
    Ok(detect_targets(&img, cfg))
}
