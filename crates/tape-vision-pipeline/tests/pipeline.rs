use std::sync::Arc;
use std::time::{Duration, SystemTime};

use approx::assert_relative_eq;
use tape_vision_core::{BgrFrame, BoundingBox};
use tape_vision_pipeline::{
    ConfigState, FilterMode, PipelineConfig, TargetPipeline, SENTINEL_PAIR,
};

const GREEN: [u8; 3] = [20, 255, 20];
const DIM_GREEN: [u8; 3] = [10, 60, 10];

fn paint(frame: &mut BgrFrame, rect: BoundingBox, bgr: [u8; 3]) {
    for y in rect.y..rect.bottom() {
        for x in rect.x..rect.right() {
            frame.put_pixel(x, y, bgr);
        }
    }
}

fn scene(targets: &[BoundingBox]) -> BgrFrame {
    let mut frame = BgrFrame::new(320, 240).unwrap();
    frame.fill([35, 30, 28]);
    for &t in targets {
        paint(&mut frame, t, GREEN);
    }
    frame
}

#[test]
fn side_by_side_targets_report_sizes_and_centers() {
    let left = BoundingBox::new(80, 90, 20, 50);
    let right = BoundingBox::new(200, 85, 22, 56);
    let frame = scene(&[right, left]);
    let ts = SystemTime::UNIX_EPOCH + Duration::from_secs(42);

    let r = TargetPipeline::new().process(&frame.view(), &PipelineConfig::default(), ts);

    assert!(r.see_target);
    assert_eq!(r.timestamp, ts);
    assert_eq!(r.target1_bounds, [20.0, 50.0]);
    assert_eq!(r.target2_bounds, [22.0, 56.0]);
    assert_eq!(r.bounds_total, [142.0, 56.0]);
    assert_relative_eq!(r.center[0], 151.0);
    assert_relative_eq!(r.center[1], 113.0);
    assert_relative_eq!(r.target1_center[0], 90.0);
    assert_relative_eq!(r.target2_center[1], 113.0);
}

#[test]
fn stacked_targets_put_the_upper_one_first() {
    let lower = BoundingBox::new(150, 140, 40, 30);
    let upper = BoundingBox::new(152, 40, 36, 24);
    let frame = scene(&[lower, upper]);

    let r = TargetPipeline::new().process(
        &frame.view(),
        &PipelineConfig::default(),
        SystemTime::UNIX_EPOCH,
    );
    let pair = r.geometry.unwrap();
    assert_eq!(pair.target1, upper);
    assert_eq!(pair.target2, lower);
}

#[test]
fn dim_blobs_are_segmented_out() {
    let mut frame = scene(&[BoundingBox::new(50, 50, 30, 60)]);
    paint(&mut frame, BoundingBox::new(200, 50, 30, 60), DIM_GREEN);

    let r = TargetPipeline::new().process(
        &frame.view(),
        &PipelineConfig::default(),
        SystemTime::UNIX_EPOCH,
    );
    assert!(!r.see_target);
    assert_eq!(r.center, SENTINEL_PAIR);
    assert!(r.processing_duration_ms >= 0.0);
}

#[test]
fn small_noise_never_becomes_a_target() {
    let frame = scene(&[
        BoundingBox::new(60, 60, 24, 60),
        BoundingBox::new(10, 10, 4, 4),
        BoundingBox::new(300, 200, 5, 5),
    ]);
    let mut pipeline = TargetPipeline::new();
    let r = pipeline.process(&frame.view(), &PipelineConfig::default(), SystemTime::UNIX_EPOCH);
    assert_eq!(pipeline.contours().len(), 3);
    assert_eq!(pipeline.filtered().len(), 1);
    assert!(!r.see_target);
}

#[test]
fn full_filter_rejects_wrong_aspect_ratio() {
    let frame = scene(&[
        BoundingBox::new(40, 60, 20, 60),
        BoundingBox::new(120, 60, 20, 60),
        BoundingBox::new(180, 180, 120, 12),
    ]);
    let mut cfg = PipelineConfig::default();
    cfg.filter.mode = FilterMode::Full;
    cfg.filter.max_ratio = 1.0;

    let r = TargetPipeline::new().process(&frame.view(), &cfg, SystemTime::UNIX_EPOCH);
    let pair = r.geometry.unwrap();
    assert_eq!(pair.target1, BoundingBox::new(40, 60, 20, 60));
    assert_eq!(pair.target2, BoundingBox::new(120, 60, 20, 60));
}

#[test]
fn live_config_updates_apply_on_next_frame() {
    let frame = scene(&[
        BoundingBox::new(40, 60, 20, 60),
        BoundingBox::new(120, 60, 20, 60),
    ]);
    let state = Arc::new(ConfigState::default());
    let mut pipeline = TargetPipeline::new();

    let before = pipeline.process(&frame.view(), &state.snapshot(), SystemTime::UNIX_EPOCH);
    assert!(before.see_target);

    assert!(state.update("hueMin", 100.0));
    let after = pipeline.process(&frame.view(), &state.snapshot(), SystemTime::UNIX_EPOCH);
    assert!(!after.see_target);

    assert!(state.update("hueMin", 47.0));
    assert!(state.update("minArea", 5000.0));
    let strict = pipeline.process(&frame.view(), &state.snapshot(), SystemTime::UNIX_EPOCH);
    assert!(!strict.see_target);
}
