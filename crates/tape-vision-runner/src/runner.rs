//! The per-camera continuous loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tape_vision_core::{BgrFrame, FrameError};
use tape_vision_pipeline::{ConfigState, DetectionResult, TargetPipeline};

use crate::annotate::Annotator;
use crate::io::{FrameSink, FrameSource, GrabError, ReleaseError, TelemetrySink};
use crate::telemetry::Telemetry;

/// Cooperative cancellation flag shared by runners and listeners.
///
/// Observed once per iteration boundary; never interrupts a frame.
#[derive(Clone, Debug, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunnerState {
    Running,
    Stopping,
    Stopped,
}

/// What one iteration did.
#[derive(Debug)]
pub enum StepOutcome {
    Published(DetectionResult),
    GrabFailed(GrabError),
    /// The runner has left `Running`; nothing was grabbed or published.
    Stopped,
}

/// Counters returned when a runner stops.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunnerReport {
    pub iterations: u64,
    pub published: u64,
    pub grab_failures: u64,
    pub release_failures: u64,
}

/// Acquire, detect, publish; repeat until told to stop.
///
/// The runner exclusively owns its frame buffer, its pipeline scratch
/// buffers, its source and its sinks. The only state it shares is the
/// [`ConfigState`] it snapshots once per frame.
pub struct PipelineRunner {
    name: String,
    frame: BgrFrame,
    pipeline: TargetPipeline,
    config: Arc<ConfigState>,
    source: Box<dyn FrameSource + Send>,
    telemetry: Box<dyn TelemetrySink + Send>,
    frame_sink: Option<Box<dyn FrameSink + Send>>,
    annotator: Option<Box<dyn Annotator + Send>>,
    iteration_delay: Option<Duration>,
    max_iterations: Option<u64>,
    state: RunnerState,
    report: RunnerReport,
}

impl std::fmt::Debug for PipelineRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineRunner")
            .field("name", &self.name)
            .field("width", &self.frame.width)
            .field("height", &self.frame.height)
            .field("state", &self.state)
            .field("report", &self.report)
            .finish_non_exhaustive()
    }
}

impl PipelineRunner {
    /// Create a runner whose frame buffer has the camera's fixed resolution.
    pub fn new(
        name: impl Into<String>,
        resolution: (usize, usize),
        config: Arc<ConfigState>,
        source: Box<dyn FrameSource + Send>,
        telemetry: Box<dyn TelemetrySink + Send>,
    ) -> Result<Self, FrameError> {
        let (width, height) = resolution;
        Ok(Self {
            name: name.into(),
            frame: BgrFrame::new(width, height)?,
            pipeline: TargetPipeline::new(),
            config,
            source,
            telemetry,
            frame_sink: None,
            annotator: None,
            iteration_delay: None,
            max_iterations: None,
            state: RunnerState::Running,
            report: RunnerReport::default(),
        })
    }

    pub fn with_frame_sink(mut self, sink: Box<dyn FrameSink + Send>) -> Self {
        self.frame_sink = Some(sink);
        self
    }

    /// Annotate frames before they reach the frame sink.
    pub fn with_annotator(mut self, annotator: Box<dyn Annotator + Send>) -> Self {
        self.annotator = Some(annotator);
        self
    }

    /// Sleep after each published frame. Without it the loop runs as fast
    /// as the source delivers.
    pub fn with_iteration_delay(mut self, delay: Duration) -> Self {
        self.iteration_delay = Some(delay);
        self
    }

    /// Stop on its own after `n` iterations, grab failures included.
    pub fn with_max_iterations(mut self, n: u64) -> Self {
        self.max_iterations = Some(n);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    pub fn report(&self) -> RunnerReport {
        self.report
    }

    pub fn config(&self) -> &Arc<ConfigState> {
        &self.config
    }

    /// Run exactly one iteration.
    ///
    /// A failed grab is counted and returned; the caller simply steps again.
    /// Once the runner has been shut down this is a no-op.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip_all, fields(runner = %self.name))
    )]
    pub fn step(&mut self) -> StepOutcome {
        if self.state != RunnerState::Running {
            return StepOutcome::Stopped;
        }
        self.report.iterations += 1;

        let captured_at = match self.source.try_grab(&mut self.frame) {
            Ok(ts) => ts,
            Err(err) => {
                self.report.grab_failures += 1;
                log::warn!("[{}] frame grab failed: {err}", self.name);
                return StepOutcome::GrabFailed(err);
            }
        };

        let cfg = self.config.snapshot();
        let result = self.pipeline.process(&self.frame.view(), &cfg, captured_at);

        if let Some(sink) = self.frame_sink.as_mut() {
            if let Some(annotator) = self.annotator.as_ref() {
                annotator.annotate(&mut self.frame, &result);
            }
            sink.publish(&self.frame.view());
        }
        self.telemetry.publish(&Telemetry::from_result(&result));
        self.report.published += 1;

        StepOutcome::Published(result)
    }

    /// Loop until `stop` is raised (or the iteration cap is reached), then
    /// release every owned resource.
    pub fn run(mut self, stop: &StopSignal) -> RunnerReport {
        log::info!(
            "[{}] running at {}x{}",
            self.name,
            self.frame.width,
            self.frame.height
        );
        while !stop.is_raised() && !self.cap_reached() {
            // A failed grab is retried at once; only published frames pace the loop.
            let published = matches!(self.step(), StepOutcome::Published(_));
            if let Some(delay) = self.iteration_delay.filter(|_| published) {
                thread::sleep(delay);
            }
        }
        self.shutdown()
    }

    fn cap_reached(&self) -> bool {
        self.max_iterations
            .is_some_and(|cap| self.report.iterations >= cap)
    }

    /// Move to `Stopped`, releasing source and sinks. Idempotent.
    ///
    /// Release failures are logged and counted, never propagated.
    pub fn shutdown(&mut self) -> RunnerReport {
        if self.state == RunnerState::Stopped {
            return self.report;
        }
        self.state = RunnerState::Stopping;

        let name = self.name.clone();
        let mut failures = 0;
        let mut check = |what: &str, res: Result<(), ReleaseError>| {
            if let Err(err) = res {
                failures += 1;
                log::warn!("[{name}] failed to release {what}: {err}");
            }
        };
        check("frame source", self.source.release());
        if let Some(sink) = self.frame_sink.as_mut() {
            check("frame sink", sink.release());
        }
        check("telemetry sink", self.telemetry.release());
        self.report.release_failures += failures;

        self.state = RunnerState::Stopped;
        log::info!("[{}] stopped: {:?}", self.name, self.report);
        self.report
    }
}
