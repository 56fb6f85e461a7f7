//! Continuous per-camera operation around the detection pipeline.
//!
//! A [`PipelineRunner`] drives one camera: grab a frame from its
//! [`FrameSource`], snapshot its [`ConfigState`](tape_vision_pipeline::ConfigState),
//! run the [`TargetPipeline`](tape_vision_pipeline::TargetPipeline), then hand
//! the (optionally annotated) frame to a [`FrameSink`] and the flat
//! [`Telemetry`] map to a [`TelemetrySink`].
//!
//! A [`ConfigListener`] applies `(key, value)` events from a
//! `crossbeam-channel` to the same config state on another thread, and the
//! [`Orchestrator`] owns every thread and the shared [`StopSignal`].

mod annotate;
mod io;
mod listener;
mod orchestrator;
mod runner;
mod telemetry;

pub use annotate::{
    draw_hline, draw_rect, draw_vline, Annotator, CrosshairAnnotator, BLUE, RED, WHITE,
};
pub use io::{FrameSink, FrameSource, GrabError, ReleaseError, TelemetrySink};
pub use listener::{ConfigEvent, ConfigListener, LISTENER_POLL_INTERVAL};
pub use orchestrator::{NamedReport, Orchestrator};
pub use runner::{PipelineRunner, RunnerReport, RunnerState, StepOutcome, StopSignal};
pub use telemetry::{Telemetry, TelemetryValue, TELEMETRY_KEYS};
