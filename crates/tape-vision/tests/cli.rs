use assert_cmd::Command;
use image::{Rgb, RgbImage};
use predicates::prelude::*;
use std::path::Path;

fn write_scene(path: &Path, strips: &[(u32, u32)]) {
    let mut img = RgbImage::from_pixel(160, 120, Rgb([25, 20, 15]));
    for &(x0, y0) in strips {
        for y in y0..y0 + 40 {
            for x in x0..x0 + 14 {
                img.put_pixel(x, y, Rgb([20, 255, 20]));
            }
        }
    }
    img.save(path).unwrap();
}

fn cli() -> Command {
    Command::cargo_bin("tape-vision").unwrap()
}

#[test]
fn detect_prints_telemetry_for_two_strips() {
    let dir = tempfile::tempdir().unwrap();
    let img = dir.path().join("scene.png");
    write_scene(&img, &[(30, 30), (100, 34)]);

    let out = cli().arg("detect").arg(&img).assert().success();
    let stdout = String::from_utf8(out.get_output().stdout.clone()).unwrap();
    let v: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(v["seeTarget"], true);
    assert_eq!(v["targetWidth"], 84.0);
    assert_eq!(v["targetHeight"], 44.0);
    assert_eq!(v["boundsTarget1"], serde_json::json!([14.0, 40.0]));
    assert!(v["publishTime"].is_string());
}

#[test]
fn detect_without_targets_reports_sentinels() {
    let dir = tempfile::tempdir().unwrap();
    let img = dir.path().join("empty.png");
    write_scene(&img, &[]);

    cli()
        .arg("detect")
        .arg(&img)
        .arg("--full-filter")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"seeTarget\": false"))
        .stdout(predicate::str::contains("-1.0"));
}

#[test]
fn detect_missing_image_fails() {
    cli()
        .args(["detect", "/definitely/not/here.png"])
        .assert()
        .failure();
}

#[test]
fn detect_unknown_camera_fails() {
    let dir = tempfile::tempdir().unwrap();
    let img = dir.path().join("scene.png");
    write_scene(&img, &[]);
    let cfg = dir.path().join("vision.json");
    std::fs::write(&cfg, r#"{"cameras": [{"name": "front"}]}"#).unwrap();

    cli()
        .arg("detect")
        .arg(&img)
        .arg("--config")
        .arg(&cfg)
        .args(["--camera", "rear"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("rear"));
}

#[test]
fn default_config_is_valid_json() {
    let out = cli().arg("default-config").assert().success();
    let v: serde_json::Value = serde_json::from_slice(&out.get_output().stdout).unwrap();
    assert_eq!(v["team"], 1089);
    assert_eq!(v["resolution"], serde_json::json!([320, 240]));
}

#[test]
fn run_writes_default_config_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = dir.path().join("vision.json");

    cli()
        .arg("run")
        .arg("--config")
        .arg(&cfg)
        .args(["--iterations", "1"])
        .assert()
        .success();
    assert!(cfg.exists());

    let other = dir.path().join("other.json");
    cli()
        .arg("run")
        .arg("--config")
        .arg(&other)
        .args(["--iterations", "1", "--no-write-default"])
        .assert()
        .success();
    assert!(!other.exists());
}

#[test]
fn run_replays_frames_and_applies_set() {
    let dir = tempfile::tempdir().unwrap();
    write_scene(&dir.path().join("a.png"), &[(30, 30), (100, 34)]);
    let cfg = dir.path().join("vision.json");
    std::fs::write(
        &cfg,
        r#"{"fps": 0, "resolution": [160, 120],
            "cameras": [{"name": "front", "frames": ["a.png"], "outputDir": "out"}]}"#,
    )
    .unwrap();

    let out = cli()
        .arg("run")
        .arg("--config")
        .arg(&cfg)
        .args(["--iterations", "3"])
        .assert()
        .success();
    let stdout = String::from_utf8(out.get_output().stdout.clone()).unwrap();
    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 3);
    assert!(lines.iter().all(|v| v["camera"] == "front" && v["seeTarget"] == true));
    assert!(dir.path().join("out/front-000002.png").exists());

    cli()
        .arg("run")
        .arg("--config")
        .arg(&cfg)
        .args(["--iterations", "1", "--set", "minArea=100000", "--set", "brightness=3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"seeTarget\":false"));
}

#[test]
fn malformed_set_is_rejected() {
    cli()
        .args(["run", "--config", "unused.json", "--set", "hueMin"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("KEY=VALUE"));
}

#[cfg(unix)]
#[test]
fn interrupt_stops_runners_and_releases_resources() {
    use std::process::Stdio;
    use std::time::{Duration, Instant};

    let dir = tempfile::tempdir().unwrap();
    write_scene(&dir.path().join("a.png"), &[(30, 30), (100, 34)]);
    let cfg = dir.path().join("vision.json");
    std::fs::write(
        &cfg,
        r#"{"resolution": [160, 120], "cameras": [{"name": "front", "frames": ["a.png"]}]}"#,
    )
    .unwrap();

    let mut child = std::process::Command::new(assert_cmd::cargo::cargo_bin("tape-vision"))
        .arg("run")
        .arg("--config")
        .arg(&cfg)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    std::thread::sleep(Duration::from_millis(1500));

    let killed = std::process::Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(killed.success());

    let deadline = Instant::now() + Duration::from_secs(10);
    while child.try_wait().unwrap().is_none() {
        assert!(Instant::now() < deadline, "runner ignored the interrupt");
        std::thread::sleep(Duration::from_millis(50));
    }
    let out = child.wait_with_output().unwrap();
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(out.status.success(), "{stderr}");
    assert!(stderr.contains("[front] stopped"), "{stderr}");
    assert!(!out.stdout.is_empty());
}

#[test]
fn log_level_flag_is_parsed() {
    cli()
        .args(["--log-level", "warn", "-v", "default-config"])
        .assert()
        .success();
    cli()
        .args(["--log-level", "chatty", "default-config"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("chatty"));
}
