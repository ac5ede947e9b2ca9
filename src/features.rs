//! Canonical feature contract
//!
//! The five columns below, in this order, are the only thing the trainer
//! and the predictor agree on. Renaming, reordering or inserting a column
//! is a breaking change: bump [`ARTIFACT_VERSION`] and retrain.
//!
//! | # | name                 | default |
//! |---|----------------------|---------|
//! | 1 | `hour`               | 0       |
//! | 2 | `weekday`            | 0       |
//! | 3 | `connectionduration` | 1.0     |
//! | 4 | `battery_capacity`   | 50      |
//! | 5 | `charging_type_num`  | 0       |
//!
//! Weekday indexing is Monday=0 … Sunday=6 and is owned here, together
//! with the day-name table, so dropdown labels and training data cannot
//! drift apart.

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};

/// Number of model input columns.
pub const NUM_FEATURES: usize = 5;

/// Model input columns, in model order.
pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    "hour",
    "weekday",
    "connectionduration",
    "battery_capacity",
    "charging_type_num",
];

/// Version tag embedded in every persisted artifact.
///
/// Covers both the column contract above and the artifact encoding.
pub const ARTIFACT_VERSION: u32 = 1;

/// Regression target column in the raw session log.
pub const TARGET_COLUMN: &str = "charging_power";

pub const DEFAULT_HOUR: u8 = 0;
pub const DEFAULT_WEEKDAY: u8 = 0;
pub const DEFAULT_CONNECTION_DURATION: f64 = 1.0;
/// Arbitrary; biases the model when real capacities are absent.
pub const DEFAULT_BATTERY_CAPACITY: f64 = 50.0;

/// Whether `value` survives the `f32` cast at the model boundary.
///
/// Anything non-finite or beyond `f32::MAX` in magnitude would become
/// `inf` inside the ensemble.
pub fn is_model_representable(value: f64) -> bool {
    value.is_finite() && value.abs() <= f32::MAX as f64
}

/// Lower-case day names indexed by the contract weekday number.
pub const WEEKDAY_NAMES: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// Charger class. Serialized as its contract number (0 = slow, 1 = fast).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ChargingType {
    #[default]
    Slow,
    Fast,
}

impl ChargingType {
    /// Map a raw `charging_type` label. Only `"fast"` (any case) is fast.
    pub fn from_label(label: &str) -> Self {
        if label.trim().eq_ignore_ascii_case("fast") {
            ChargingType::Fast
        } else {
            ChargingType::Slow
        }
    }

    pub fn as_num(self) -> u8 {
        match self {
            ChargingType::Slow => 0,
            ChargingType::Fast => 1,
        }
    }
}

impl From<ChargingType> for u8 {
    fn from(value: ChargingType) -> Self {
        value.as_num()
    }
}

impl TryFrom<u8> for ChargingType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ChargingType::Slow),
            1 => Ok(ChargingType::Fast),
            other => Err(format!("charging_type_num must be 0 or 1, got {other}")),
        }
    }
}

/// Contract weekday index for a day name ("Monday", "mon", ...).
pub fn weekday_index(name: &str) -> Option<u8> {
    let name = name.trim().to_ascii_lowercase();
    if name.len() < 3 {
        return None;
    }
    WEEKDAY_NAMES
        .iter()
        .position(|day| *day == name || (name.len() == 3 && day.starts_with(&name)))
        .map(|i| i as u8)
}

/// Contract weekday index for a chrono weekday.
pub fn weekday_from_chrono(day: chrono::Weekday) -> u8 {
    day.num_days_from_monday() as u8
}

/// One row shaped to the canonical contract.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub hour: u8,
    pub weekday: u8,
    #[serde(rename = "connectionduration")]
    pub connection_duration: f64,
    pub battery_capacity: f64,
    #[serde(rename = "charging_type_num")]
    pub charging_type: ChargingType,
}

impl Default for FeatureRecord {
    fn default() -> Self {
        Self {
            hour: DEFAULT_HOUR,
            weekday: DEFAULT_WEEKDAY,
            connection_duration: DEFAULT_CONNECTION_DURATION,
            battery_capacity: DEFAULT_BATTERY_CAPACITY,
            charging_type: ChargingType::Slow,
        }
    }
}

impl FeatureRecord {
    /// Model input vector in [`FEATURE_NAMES`] order.
    ///
    /// The gbdt crate works in `f32`; conversion happens here and nowhere else.
    pub fn to_vector(&self) -> Vec<f32> {
        vec![
            self.hour as f32,
            self.weekday as f32,
            self.connection_duration as f32,
            self.battery_capacity as f32,
            self.charging_type.as_num() as f32,
        ]
    }

    pub fn with_hour(mut self, hour: u8) -> Self {
        self.hour = hour;
        self
    }

    /// Whether every field is inside its contract range.
    pub fn satisfies_contract(&self) -> bool {
        self.hour <= 23
            && self.weekday <= 6
            && is_model_representable(self.connection_duration)
            && self.connection_duration >= 0.0
            && is_model_representable(self.battery_capacity)
            && self.battery_capacity > 0.0
    }
}

/// Weekday as sent by a caller: contract index or day name.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WeekdayInput {
    Index(f64),
    Name(String),
}

/// A prediction request carrying any subset of the canonical fields.
///
/// Missing fields take the same defaults as a missing CSV column.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PredictionRequest {
    #[serde(default)]
    pub hour: Option<f64>,
    #[serde(default)]
    pub weekday: Option<WeekdayInput>,
    #[serde(default, alias = "connection_duration", alias = "charging_time")]
    pub connectionduration: Option<f64>,
    #[serde(default)]
    pub battery_capacity: Option<f64>,
    #[serde(default)]
    pub charging_type_num: Option<f64>,
    /// Raw label; ignored when `charging_type_num` is present.
    #[serde(default)]
    pub charging_type: Option<String>,
}

impl PredictionRequest {
    pub fn from_json(json: &str) -> PipelineResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| PipelineError::InvalidRecord(format!("not a JSON object record: {e}")))
    }

    /// Coerce into a canonical row, applying defaults and checking ranges.
    pub fn to_record(&self) -> PipelineResult<FeatureRecord> {
        let mut record = FeatureRecord::default();

        if let Some(hour) = self.hour {
            record.hour = integral_in_range("hour", hour, 0, 23)?;
        }

        match &self.weekday {
            Some(WeekdayInput::Index(day)) => {
                record.weekday = integral_in_range("weekday", *day, 0, 6)?;
            }
            Some(WeekdayInput::Name(name)) => {
                record.weekday = weekday_index(name).ok_or_else(|| {
                    PipelineError::InvalidRecord(format!("unknown weekday name '{name}'"))
                })?;
            }
            None => {}
        }

        if let Some(duration) = self.connectionduration {
            if !is_model_representable(duration) || duration < 0.0 {
                return Err(PipelineError::InvalidRecord(format!(
                    "connectionduration must be a finite number >= 0, got {duration}"
                )));
            }
            record.connection_duration = duration;
        }

        if let Some(capacity) = self.battery_capacity {
            if !is_model_representable(capacity) || capacity <= 0.0 {
                return Err(PipelineError::InvalidRecord(format!(
                    "battery_capacity must be a finite number > 0, got {capacity}"
                )));
            }
            record.battery_capacity = capacity;
        }

        record.charging_type = match (self.charging_type_num, &self.charging_type) {
            (Some(num), _) => {
                let num = integral_in_range("charging_type_num", num, 0, 1)?;
                ChargingType::try_from(num).map_err(PipelineError::InvalidRecord)?
            }
            (None, Some(label)) => ChargingType::from_label(label),
            (None, None) => ChargingType::Slow,
        };

        Ok(record)
    }
}

impl From<FeatureRecord> for PredictionRequest {
    fn from(record: FeatureRecord) -> Self {
        Self {
            hour: Some(record.hour as f64),
            weekday: Some(WeekdayInput::Index(record.weekday as f64)),
            connectionduration: Some(record.connection_duration),
            battery_capacity: Some(record.battery_capacity),
            charging_type_num: Some(record.charging_type.as_num() as f64),
            charging_type: None,
        }
    }
}

fn integral_in_range(field: &str, value: f64, min: u8, max: u8) -> PipelineResult<u8> {
    if value.fract() != 0.0 || value < min as f64 || value > max as f64 {
        return Err(PipelineError::InvalidRecord(format!(
            "{field} must be an integer in {min}..={max}, got {value}"
        )));
    }
    Ok(value as u8)
}
