use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use approx::assert_relative_eq;
use crossbeam_channel::unbounded;
use tape_vision_core::{BgrFrame, BgrFrameView};
use tape_vision_pipeline::ConfigState;
use tape_vision_runner::{
    ConfigEvent, ConfigListener, CrosshairAnnotator, FrameSink, FrameSource, GrabError,
    Orchestrator, PipelineRunner, ReleaseError, Telemetry, TelemetrySink, TelemetryValue,
};

const GREEN: [u8; 3] = [20, 255, 20];

/// Two green strips on a dark background, failing every `fail_every`-th grab.
struct Strips {
    grabs: usize,
    fail_every: usize,
    released: Arc<AtomicUsize>,
}

impl FrameSource for Strips {
    fn try_grab(&mut self, frame: &mut BgrFrame) -> Result<SystemTime, GrabError> {
        self.grabs += 1;
        if self.fail_every > 0 && self.grabs % self.fail_every == 0 {
            return Err(GrabError::Unavailable("camera timeout".into()));
        }
        frame.fill([30, 25, 20]);
        for (x0, y0) in [(20, 20), (60, 22)] {
            for y in y0..y0 + 40 {
                for x in x0..x0 + 12 {
                    frame.put_pixel(x, y, GREEN);
                }
            }
        }
        Ok(SystemTime::now())
    }

    fn release(&mut self) -> Result<(), ReleaseError> {
        self.released.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Clone, Default)]
struct Collect(Arc<Mutex<Vec<Telemetry>>>);

impl TelemetrySink for Collect {
    fn publish(&mut self, telemetry: &Telemetry) {
        self.0.lock().unwrap().push(telemetry.clone());
    }
}

#[derive(Clone, Default)]
struct CountFrames(Arc<AtomicUsize>);

impl FrameSink for CountFrames {
    fn publish(&mut self, frame: &BgrFrameView<'_>) {
        assert_eq!((frame.width, frame.height), (96, 72));
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

fn runner(
    name: &str,
    fail_every: usize,
    released: &Arc<AtomicUsize>,
    config: Arc<ConfigState>,
) -> (PipelineRunner, Collect, CountFrames) {
    let telemetry = Collect::default();
    let frames = CountFrames::default();
    let source = Strips {
        grabs: 0,
        fail_every,
        released: Arc::clone(released),
    };
    let runner = PipelineRunner::new(
        name,
        (96, 72),
        config,
        Box::new(source),
        Box::new(telemetry.clone()),
    )
    .unwrap()
    .with_frame_sink(Box::new(frames.clone()))
    .with_annotator(Box::new(CrosshairAnnotator::default()));
    (runner, telemetry, frames)
}

#[test]
fn capped_runners_finish_and_release_their_sources() {
    let released = Arc::new(AtomicUsize::new(0));
    let mut orchestrator = Orchestrator::new();
    let (a, telemetry_a, frames_a) = runner("front", 3, &released, Arc::default());
    let (b, telemetry_b, _) = runner("rear", 0, &released, Arc::default());
    orchestrator.spawn_runner(a.with_max_iterations(9)).unwrap();
    orchestrator.spawn_runner(b.with_max_iterations(5)).unwrap();

    let reports = orchestrator.join();
    assert_eq!(reports.len(), 2);
    let front = reports[0].report.unwrap();
    assert_eq!(reports[0].name, "front");
    assert_eq!(front.iterations, 9);
    assert_eq!(front.grab_failures, 3);
    assert_eq!(front.published, 6);
    assert_eq!(reports[1].report.unwrap().published, 5);
    assert_eq!(released.load(Ordering::SeqCst), 2);

    assert_eq!(frames_a.0.load(Ordering::SeqCst), 6);
    assert_eq!(telemetry_b.0.lock().unwrap().len(), 5);
    let published = telemetry_a.0.lock().unwrap();
    assert!(published
        .iter()
        .all(|t| t.get("seeTarget") == Some(&TelemetryValue::Bool(true))));
    assert_eq!(
        published[0].get("boundsTotal"),
        Some(&TelemetryValue::NumberArray(vec![52.0, 42.0]))
    );
    let center = published[0].get("center").and_then(|v| v.as_array()).unwrap();
    assert_relative_eq!(center[0], 46.0);
    assert_relative_eq!(center[1], 41.0);
    let left = published[0].get("centerTarget1").and_then(|v| v.as_array()).unwrap();
    assert_relative_eq!(left[0], 26.0);
    assert_relative_eq!(left[1], 40.0);
}

#[test]
fn dropping_the_orchestrator_stops_and_releases_runners() {
    let released = Arc::new(AtomicUsize::new(0));
    let (_tx, rx) = unbounded();
    let config = Arc::new(ConfigState::default());

    let mut orchestrator = Orchestrator::new();
    let (r, _, _) = runner("front", 0, &released, Arc::clone(&config));
    orchestrator
        .spawn_runner(r.with_iteration_delay(Duration::from_millis(2)))
        .unwrap();
    orchestrator
        .spawn_listener(ConfigListener::new("front", rx, config))
        .unwrap();
    let stop = orchestrator.stop_signal();

    drop(orchestrator);
    assert!(stop.is_raised());
    assert_eq!(released.load(Ordering::SeqCst), 1);
}

#[test]
fn shutdown_stops_unbounded_runners_and_listeners() {
    let released = Arc::new(AtomicUsize::new(0));
    let config = Arc::new(ConfigState::default());
    let (tx, rx) = unbounded();

    let mut orchestrator = Orchestrator::new();
    let (r, telemetry, _) = runner("front", 0, &released, Arc::clone(&config));
    orchestrator
        .spawn_runner(r.with_iteration_delay(Duration::from_millis(2)))
        .unwrap();
    orchestrator
        .spawn_listener(ConfigListener::new("front", rx, Arc::clone(&config)))
        .unwrap();

    tx.send(ConfigEvent::new("hueMin", 120.0)).unwrap();
    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    while config.version() == 0 && std::time::Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(config.snapshot().threshold.hue.min, 120.0);

    let reports = orchestrator.shutdown();
    assert_eq!(reports.len(), 1);
    assert!(reports[0].report.is_some());
    assert_eq!(released.load(Ordering::SeqCst), 1);
    assert!(!telemetry.0.lock().unwrap().is_empty());
}
