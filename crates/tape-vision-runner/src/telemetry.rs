//! Flat key/value telemetry published once per frame.
//!
//! Robot code reads these exact keys and relies on `-1` meaning "no target",
//! so the key set and value shapes must not drift.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};
use tape_vision_pipeline::DetectionResult;

/// Published keys, in publication order.
pub const TELEMETRY_KEYS: [&str; 12] = [
    "seeTarget",
    "targetWidth",
    "targetHeight",
    "boundsTotal",
    "center",
    "centerTotal",
    "centerTarget1",
    "centerTarget2",
    "boundsTarget1",
    "boundsTarget2",
    "deltaTime",
    "publishTime",
];

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum TelemetryValue {
    Bool(bool),
    Number(f64),
    NumberArray(Vec<f64>),
    Text(String),
}

impl TelemetryValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TelemetryValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            TelemetryValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[f64]> {
        match self {
            TelemetryValue::NumberArray(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            TelemetryValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Ordered flat map built from one [`DetectionResult`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Telemetry {
    entries: Vec<(&'static str, TelemetryValue)>,
}

impl Telemetry {
    /// Build the map, stamping `publishTime` with the current wall clock.
    pub fn from_result(result: &DetectionResult) -> Self {
        Self::from_result_at(result, Utc::now())
    }

    pub fn from_result_at(result: &DetectionResult, publish_time: DateTime<Utc>) -> Self {
        use TelemetryValue::{Bool, Number, NumberArray, Text};

        let pair = |v: [f64; 2]| NumberArray(v.to_vec());
        let entries = vec![
            ("seeTarget", Bool(result.see_target)),
            ("targetWidth", Number(result.bounds_total[0])),
            ("targetHeight", Number(result.bounds_total[1])),
            ("boundsTotal", pair(result.bounds_total)),
            ("center", pair(result.center)),
            ("centerTotal", pair(result.center)),
            ("centerTarget1", pair(result.target1_center)),
            ("centerTarget2", pair(result.target2_center)),
            ("boundsTarget1", pair(result.target1_bounds)),
            ("boundsTarget2", pair(result.target2_bounds)),
            ("deltaTime", Number(result.processing_duration_ms)),
            (
                "publishTime",
                Text(publish_time.to_rfc3339_opts(SecondsFormat::Millis, true)),
            ),
        ];
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&TelemetryValue> {
        self.entries
            .iter()
            .find_map(|(k, v)| (*k == key).then_some(v))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &TelemetryValue)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Telemetry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
