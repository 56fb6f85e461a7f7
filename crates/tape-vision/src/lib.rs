//! High-level facade crate for the `tape-vision-*` workspace.
//!
//! This crate provides:
//! - stable re-exports of the core types, the detection pipeline and the
//!   runner machinery
//! - end-to-end helpers that run the pipeline on an `image::RgbImage`
//! - file and stream adapters (image sequences, PNG output, JSON lines) for
//!   the runner collaborator traits
//! - the JSON application config read by the `tape-vision` binary
//!
//! ## Quickstart
//!
//! ```no_run
//! use tape_vision::detect;
//! use tape_vision::pipeline::PipelineConfig;
//! use tape_vision::runner::Telemetry;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let result = detect::detect_targets_in_file("frame.png", &PipelineConfig::default())?;
//! println!("{}", serde_json::to_string(&Telemetry::from_result(&result))?);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `tape_vision::core`: BGR frames, bounding boxes, contours, logging.
//! - `tape_vision::pipeline`: segmentation, contours, filtering, pairing and
//!   the live-tunable [`ConfigState`](pipeline::ConfigState).
//! - `tape_vision::runner`: per-camera loop, telemetry map, annotation,
//!   config listener and thread orchestration.
//! - `tape_vision::detect`: one-shot helpers from `image` buffers.
//! - `tape_vision::io`: adapters for the runner traits.
//! - `tape_vision::config`: [`VisionConfig`](config::VisionConfig).

pub use tape_vision_core as core;
pub use tape_vision_pipeline as pipeline;
pub use tape_vision_runner as runner;

pub use tape_vision_pipeline::{DetectionResult, PipelineConfig};

pub mod config;
pub mod detect;
pub mod io;
