//! Live-tunable pipeline configuration.
//!
//! Writers never mutate the published value. Every update clones the current
//! [`PipelineConfig`], changes one field and swaps in a new `Arc`, so a
//! reader holding a snapshot always sees a whole configuration.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::params::{FilterMode, PipelineConfig};

/// Every key accepted on the configuration channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    HueMin,
    HueMax,
    SatMin,
    SatMax,
    LumMin,
    LumMax,
    MinArea,
    MinPerimeter,
    MinWidth,
    MaxWidth,
    MinHeight,
    MaxHeight,
    SolidityMin,
    SolidityMax,
    MinVertices,
    MaxVertices,
    MinRatio,
    MaxRatio,
    FullFilter,
    AlignmentTolerance,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 20] = [
        ConfigKey::HueMin,
        ConfigKey::HueMax,
        ConfigKey::SatMin,
        ConfigKey::SatMax,
        ConfigKey::LumMin,
        ConfigKey::LumMax,
        ConfigKey::MinArea,
        ConfigKey::MinPerimeter,
        ConfigKey::MinWidth,
        ConfigKey::MaxWidth,
        ConfigKey::MinHeight,
        ConfigKey::MaxHeight,
        ConfigKey::SolidityMin,
        ConfigKey::SolidityMax,
        ConfigKey::MinVertices,
        ConfigKey::MaxVertices,
        ConfigKey::MinRatio,
        ConfigKey::MaxRatio,
        ConfigKey::FullFilter,
        ConfigKey::AlignmentTolerance,
    ];

    /// Wire name of the key.
    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::HueMin => "hueMin",
            ConfigKey::HueMax => "hueMax",
            ConfigKey::SatMin => "satMin",
            ConfigKey::SatMax => "satMax",
            ConfigKey::LumMin => "lumMin",
            ConfigKey::LumMax => "lumMax",
            ConfigKey::MinArea => "minArea",
            ConfigKey::MinPerimeter => "minPerimeter",
            ConfigKey::MinWidth => "minWidth",
            ConfigKey::MaxWidth => "maxWidth",
            ConfigKey::MinHeight => "minHeight",
            ConfigKey::MaxHeight => "maxHeight",
            ConfigKey::SolidityMin => "solidityMin",
            ConfigKey::SolidityMax => "solidityMax",
            ConfigKey::MinVertices => "minVertices",
            ConfigKey::MaxVertices => "maxVertices",
            ConfigKey::MinRatio => "minRatio",
            ConfigKey::MaxRatio => "maxRatio",
            ConfigKey::FullFilter => "fullFilter",
            ConfigKey::AlignmentTolerance => "alignmentTolerance",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == key)
    }

    /// Write `value` into the field this key names. Values are not validated.
    pub fn apply(self, cfg: &mut PipelineConfig, value: f64) {
        let t = &mut cfg.threshold;
        let f = &mut cfg.filter;
        match self {
            ConfigKey::HueMin => t.hue.min = value,
            ConfigKey::HueMax => t.hue.max = value,
            ConfigKey::SatMin => t.saturation.min = value,
            ConfigKey::SatMax => t.saturation.max = value,
            ConfigKey::LumMin => t.luminance.min = value,
            ConfigKey::LumMax => t.luminance.max = value,
            ConfigKey::MinArea => f.min_area = value,
            ConfigKey::MinPerimeter => f.min_perimeter = value,
            ConfigKey::MinWidth => f.min_width = value,
            ConfigKey::MaxWidth => f.max_width = value,
            ConfigKey::MinHeight => f.min_height = value,
            ConfigKey::MaxHeight => f.max_height = value,
            ConfigKey::SolidityMin => f.solidity.min = value,
            ConfigKey::SolidityMax => f.solidity.max = value,
            ConfigKey::MinVertices => f.min_vertices = value,
            ConfigKey::MaxVertices => f.max_vertices = value,
            ConfigKey::MinRatio => f.min_ratio = value,
            ConfigKey::MaxRatio => f.max_ratio = value,
            ConfigKey::FullFilter => {
                f.mode = if value != 0.0 {
                    FilterMode::Full
                } else {
                    FilterMode::AreaOnly
                }
            }
            ConfigKey::AlignmentTolerance => cfg.pairing.alignment_tolerance_px = value,
        }
    }
}

/// Shared, atomically swapped [`PipelineConfig`] for one pipeline.
#[derive(Debug)]
pub struct ConfigState {
    current: RwLock<Arc<PipelineConfig>>,
    version: AtomicU64,
}

impl Default for ConfigState {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl ConfigState {
    pub fn new(initial: PipelineConfig) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
            version: AtomicU64::new(0),
        }
    }

    /// Current configuration. Cheap: clones an `Arc`.
    pub fn snapshot(&self) -> Arc<PipelineConfig> {
        Arc::clone(&self.current.read())
    }

    /// Apply a `(key, value)` event from the configuration channel.
    ///
    /// Returns `false` (and changes nothing) for unrecognized keys, which
    /// are expected on a shared channel.
    pub fn update(&self, key: &str, value: f64) -> bool {
        let Some(key) = ConfigKey::parse(key) else {
            log::trace!("ignoring unrecognized config key {key:?}");
            return false;
        };
        self.apply(key, value);
        true
    }

    pub fn apply(&self, key: ConfigKey, value: f64) {
        let mut guard = self.current.write();
        let mut next = **guard;
        key.apply(&mut next, value);
        *guard = Arc::new(next);
        self.version.fetch_add(1, Ordering::Release);
        log::debug!("config {} = {value}", key.as_str());
    }

    /// Publish a complete configuration in one swap.
    pub fn replace(&self, cfg: PipelineConfig) {
        let mut guard = self.current.write();
        *guard = Arc::new(cfg);
        self.version.fetch_add(1, Ordering::Release);
    }

    /// Number of applied updates since construction.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }
}
