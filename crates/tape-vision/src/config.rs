//! JSON application configuration.
//!
//! ```json
//! {
//!   "team": 1089,
//!   "fps": 15,
//!   "resolution": [320, 240],
//!   "cameras": [
//!     { "name": "front", "frames": ["frames/0001.png"], "outputDir": "annotated" }
//!   ]
//! }
//! ```
//!
//! Every field is optional. A camera without a `pipeline` block uses
//! [`PipelineConfig::default`]; relative frame and output paths are resolved
//! against the directory holding the config file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::pipeline::PipelineConfig;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to access config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CameraConfig {
    pub name: String,
    /// Image files replayed in order, looping.
    pub frames: Vec<PathBuf>,
    /// Where annotated frames are written; no frame output when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    pub pipeline: PipelineConfig,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            name: "front".to_owned(),
            frames: Vec::new(),
            output_dir: None,
            pipeline: PipelineConfig::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VisionConfig {
    pub team: u32,
    /// Target iterations per second per camera; `0` runs unpaced.
    pub fps: u32,
    /// `[width, height]` every camera frame is scaled to.
    pub resolution: [u32; 2],
    pub cameras: Vec<CameraConfig>,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            team: 1089,
            fps: 15,
            resolution: [320, 240],
            cameras: vec![CameraConfig::default()],
        }
    }
}

impl VisionConfig {
    pub fn from_json(json: &str, path: &Path) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut cfg = Self::from_json(&json, path)?;
        if let Some(base) = path.parent() {
            cfg.resolve_paths(base);
        }
        Ok(cfg)
    }

    /// Load `path`, falling back to defaults when it does not exist.
    ///
    /// With `write_default` the defaults are also written to `path` so the
    /// next run (and the operator) has a file to edit.
    pub fn load_or_init(path: impl AsRef<Path>, write_default: bool) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load(path);
        }
        let cfg = Self::default();
        if write_default {
            cfg.save(path)?;
            log::info!("wrote default config to {}", path.display());
        } else {
            log::info!("{} not found, using defaults", path.display());
        }
        Ok(cfg)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = self.to_json_pretty().map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, json).map_err(io_err)
    }

    /// Fails only for paths that are not valid UTF-8.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn camera(&self, name: &str) -> Option<&CameraConfig> {
        self.cameras.iter().find(|c| c.name == name)
    }

    pub fn resolution(&self) -> (u32, u32) {
        (self.resolution[0], self.resolution[1])
    }

    /// Pause between iterations that keeps a runner near `fps`.
    pub fn iteration_delay(&self) -> Option<Duration> {
        (self.fps > 0).then(|| Duration::from_secs_f64(1.0 / self.fps as f64))
    }

    fn resolve_paths(&mut self, base: &Path) {
        for camera in &mut self.cameras {
            for frame in &mut camera.frames {
                if frame.is_relative() {
                    *frame = base.join(&*frame);
                }
            }
            if let Some(dir) = camera.output_dir.as_mut().filter(|d| d.is_relative()) {
                *dir = base.join(&*dir);
            }
        }
    }
}
