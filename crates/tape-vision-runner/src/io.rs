//! Collaborator seams of the run loop.
//!
//! A [`PipelineRunner`](crate::PipelineRunner) owns exactly one frame source,
//! an optional frame sink and one telemetry sink. None of them may panic on
//! transient failures: a missed grab is reported as a [`GrabError`] and the
//! loop simply tries again.

use std::time::SystemTime;

use tape_vision_core::{BgrFrame, BgrFrameView, FrameError};

use crate::telemetry::Telemetry;

/// A frame could not be acquired this iteration.
#[derive(thiserror::Error, Debug)]
pub enum GrabError {
    #[error("no frame available: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Releasing a camera, stream or file handle failed.
#[derive(thiserror::Error, Debug)]
pub enum ReleaseError {
    #[error("failed to release {resource}: {message}")]
    Resource { resource: String, message: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Produces frames into a caller-owned buffer.
pub trait FrameSource {
    /// Fill `frame` in place and return its capture time.
    ///
    /// Implementations bound their own wait; a source that has nothing to
    /// deliver returns an error instead of blocking forever.
    fn try_grab(&mut self, frame: &mut BgrFrame) -> Result<SystemTime, GrabError>;

    fn release(&mut self) -> Result<(), ReleaseError> {
        Ok(())
    }
}

/// Fire-and-forget consumer of (annotated) frames.
pub trait FrameSink {
    fn publish(&mut self, frame: &BgrFrameView<'_>);

    fn release(&mut self) -> Result<(), ReleaseError> {
        Ok(())
    }
}

/// Consumer of the flat per-frame telemetry map.
pub trait TelemetrySink {
    fn publish(&mut self, telemetry: &Telemetry);

    fn release(&mut self) -> Result<(), ReleaseError> {
        Ok(())
    }
}
