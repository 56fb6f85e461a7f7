//! File and stream adapters for the runner collaborator traits.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use image::imageops::{self, FilterType};
use image::{ImageReader, RgbImage};
use serde::Serialize;

use crate::core::{BgrFrame, BgrFrameView};
use crate::runner::{FrameSink, FrameSource, GrabError, ReleaseError, Telemetry, TelemetrySink};

/// Cycles through a fixed list of image files, one per grab.
///
/// Every image is resized to the camera resolution. A file that cannot be
/// read or decoded fails that grab only; the next grab moves on.
#[derive(Debug)]
pub struct ImageSequenceSource {
    paths: Vec<PathBuf>,
    next: usize,
    resolution: (u32, u32),
}

impl ImageSequenceSource {
    pub fn new(paths: Vec<PathBuf>, resolution: (u32, u32)) -> Self {
        Self {
            paths,
            next: 0,
            resolution,
        }
    }

    fn load(&self, path: &Path) -> Result<RgbImage, GrabError> {
        let decoded = ImageReader::open(path)?
            .decode()
            .map_err(|e| GrabError::Unavailable(format!("{}: {e}", path.display())))?
            .to_rgb8();
        let (w, h) = self.resolution;
        if decoded.dimensions() == (w, h) {
            Ok(decoded)
        } else {
            Ok(imageops::resize(&decoded, w, h, FilterType::Triangle))
        }
    }
}

impl FrameSource for ImageSequenceSource {
    fn try_grab(&mut self, frame: &mut BgrFrame) -> Result<SystemTime, GrabError> {
        if self.paths.is_empty() {
            return Err(GrabError::Unavailable("no frames configured".into()));
        }
        let idx = self.next % self.paths.len();
        self.next = self.next.wrapping_add(1);
        let img = self.load(&self.paths[idx])?;
        frame.copy_from_rgb(&img);
        Ok(SystemTime::now())
    }
}

/// Writes every published frame as `<prefix>-000000.png`, `<prefix>-000001.png`, ...
#[derive(Debug)]
pub struct PngDirectorySink {
    dir: PathBuf,
    prefix: String,
    written: u64,
}

impl PngDirectorySink {
    /// Create `dir` (and parents) if needed.
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> std::io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            prefix: prefix.into(),
            written: 0,
        })
    }

    pub fn written(&self) -> u64 {
        self.written
    }
}

impl FrameSink for PngDirectorySink {
    fn publish(&mut self, frame: &BgrFrameView<'_>) {
        let path = self
            .dir
            .join(format!("{}-{:06}.png", self.prefix, self.written));
        let Some(img) = frame.to_rgb() else {
            log::warn!("skipping malformed {}x{} frame", frame.width, frame.height);
            return;
        };
        match img.save(&path) {
            Ok(()) => self.written += 1,
            Err(e) => log::warn!("failed to write {}: {e}", path.display()),
        }
    }
}

/// Discards frames.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullFrameSink;

impl FrameSink for NullFrameSink {
    fn publish(&mut self, _frame: &BgrFrameView<'_>) {}
}

/// One JSON object per line.
///
/// Each line is written with a single `write_all`, so several runners can
/// share a line-buffered stream such as stdout.
#[derive(Debug)]
pub struct JsonLinesTelemetry<W: Write> {
    writer: W,
    camera: Option<String>,
}

#[derive(Serialize)]
struct Line<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    camera: Option<&'a str>,
    #[serde(flatten)]
    telemetry: &'a Telemetry,
}

impl<W: Write> JsonLinesTelemetry<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            camera: None,
        }
    }

    /// Prefix every line with a `"camera"` field.
    pub fn with_camera(mut self, camera: impl Into<String>) -> Self {
        self.camera = Some(camera.into());
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TelemetrySink for JsonLinesTelemetry<W> {
    fn publish(&mut self, telemetry: &Telemetry) {
        let line = Line {
            camera: self.camera.as_deref(),
            telemetry,
        };
        let mut buf = match serde_json::to_vec(&line) {
            Ok(buf) => buf,
            Err(e) => {
                log::warn!("failed to encode telemetry: {e}");
                return;
            }
        };
        buf.push(b'\n');
        if let Err(e) = self.writer.write_all(&buf) {
            log::warn!("failed to write telemetry: {e}");
        }
    }

    fn release(&mut self) -> Result<(), ReleaseError> {
        self.writer.flush()?;
        Ok(())
    }
}
