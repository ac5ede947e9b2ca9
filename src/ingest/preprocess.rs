//! Raw session log -> canonical feature frame
//!
//! Pure transformation. Missing optional columns are filled with the
//! contract defaults and reported; only a missing target column is an
//! error. Rows without a usable target are dropped here, before any split.

use serde::Serialize;
use tracing::{info, warn};

use super::frame::RawFrame;
use super::timestamp::{hour_and_weekday, parse_timestamp};
use crate::error::{PipelineError, PipelineResult};
use crate::features::{
    is_model_representable, ChargingType, FeatureRecord, DEFAULT_BATTERY_CAPACITY,
    DEFAULT_CONNECTION_DURATION, DEFAULT_HOUR, DEFAULT_WEEKDAY, TARGET_COLUMN,
};

const TIMESTAMP_COLUMN: &str = "timestamp";
const CHARGING_TIME_COLUMN: &str = "charging_time";
const BATTERY_CAPACITY_COLUMN: &str = "battery_capacity";
const CHARGING_TYPE_COLUMN: &str = "charging_type";

/// Optional columns that were absent and replaced by a default for every row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DefaultedColumns {
    pub timestamp: bool,
    pub charging_time: bool,
    pub battery_capacity: bool,
    pub charging_type: bool,
}

impl DefaultedColumns {
    pub fn any(&self) -> bool {
        self.timestamp || self.charging_time || self.battery_capacity || self.charging_type
    }

    pub fn names(&self) -> Vec<&'static str> {
        [
            (self.timestamp, TIMESTAMP_COLUMN),
            (self.charging_time, CHARGING_TIME_COLUMN),
            (self.battery_capacity, BATTERY_CAPACITY_COLUMN),
            (self.charging_type, CHARGING_TYPE_COLUMN),
        ]
        .into_iter()
        .filter_map(|(flag, name)| flag.then_some(name))
        .collect()
    }
}

/// Per-cell fallbacks inside columns that were present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CellFallbacks {
    pub timestamp: usize,
    pub charging_time: usize,
    pub battery_capacity: usize,
}

impl CellFallbacks {
    pub fn total(&self) -> usize {
        self.timestamp + self.charging_time + self.battery_capacity
    }
}

/// What preprocessing did to the raw log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PreprocessReport {
    pub rows_read: usize,
    /// Rows dropped for a missing or non-numeric target.
    pub rows_dropped: usize,
    pub defaulted: DefaultedColumns,
    pub fallbacks: CellFallbacks,
}

impl PreprocessReport {
    pub fn rows_kept(&self) -> usize {
        self.rows_read - self.rows_dropped
    }
}

/// Canonical rows with their targets, index-aligned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanonicalFrame {
    records: Vec<FeatureRecord>,
    targets: Vec<f64>,
}

impl CanonicalFrame {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[FeatureRecord] {
        &self.records
    }

    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    fn push(&mut self, record: FeatureRecord, target: f64) {
        self.records.push(record);
        self.targets.push(target);
    }
}

#[derive(Debug, Clone)]
pub struct Preprocessed {
    pub frame: CanonicalFrame,
    pub report: PreprocessReport,
}

/// Project a raw log onto the canonical contract.
pub fn preprocess(raw: &RawFrame) -> PipelineResult<Preprocessed> {
    let target_col = raw
        .column_index(TARGET_COLUMN)
        .ok_or(PipelineError::SchemaError {
            column: TARGET_COLUMN,
        })?;

    let timestamp_col = raw.column_index(TIMESTAMP_COLUMN);
    let duration_col = raw.column_index(CHARGING_TIME_COLUMN);
    let capacity_col = raw.column_index(BATTERY_CAPACITY_COLUMN);
    let type_col = raw.column_index(CHARGING_TYPE_COLUMN);

    let defaulted = DefaultedColumns {
        timestamp: timestamp_col.is_none(),
        charging_time: duration_col.is_none(),
        battery_capacity: capacity_col.is_none(),
        charging_type: type_col.is_none(),
    };
    if defaulted.timestamp {
        warn!("'timestamp' column not found. Default hour and weekday set to 0.");
    }
    if defaulted.charging_time {
        warn!(
            "'charging_time' column not found. Using default duration={}",
            DEFAULT_CONNECTION_DURATION
        );
    }
    if defaulted.battery_capacity {
        warn!(
            "'battery_capacity' column not found. Using default {} kWh.",
            DEFAULT_BATTERY_CAPACITY
        );
    }
    if defaulted.charging_type {
        warn!("'charging_type' column not found. Using default 0 (Slow).");
    }

    let mut frame = CanonicalFrame::default();
    let mut report = PreprocessReport {
        rows_read: raw.len(),
        defaulted,
        ..Default::default()
    };

    for row in 0..raw.len() {
        let Some(target) = raw.cell(row, target_col).and_then(parse_number) else {
            report.rows_dropped += 1;
            continue;
        };

        let mut record = FeatureRecord::default();

        if let Some(col) = timestamp_col {
            match raw.cell(row, col).and_then(parse_timestamp) {
                Some(dt) => (record.hour, record.weekday) = hour_and_weekday(&dt),
                None => {
                    record.hour = DEFAULT_HOUR;
                    record.weekday = DEFAULT_WEEKDAY;
                    report.fallbacks.timestamp += 1;
                }
            }
        }

        if let Some(col) = duration_col {
            match raw.cell(row, col).and_then(parse_number).filter(|d| *d >= 0.0) {
                Some(duration) => record.connection_duration = duration,
                None => report.fallbacks.charging_time += 1,
            }
        }

        if let Some(col) = capacity_col {
            match raw.cell(row, col).and_then(parse_number).filter(|c| *c > 0.0) {
                Some(capacity) => record.battery_capacity = capacity,
                None => report.fallbacks.battery_capacity += 1,
            }
        }

        if let Some(col) = type_col {
            record.charging_type = raw
                .cell(row, col)
                .map(ChargingType::from_label)
                .unwrap_or_default();
        }

        frame.push(record, target);
    }

    if report.rows_dropped > 0 {
        info!(
            "Dropped {} of {} rows with missing '{}'",
            report.rows_dropped, report.rows_read, TARGET_COLUMN
        );
    }
    if report.fallbacks.total() > 0 {
        warn!(
            "Unparseable cells replaced by defaults: timestamp={}, charging_time={}, battery_capacity={}",
            report.fallbacks.timestamp,
            report.fallbacks.charging_time,
            report.fallbacks.battery_capacity
        );
    }

    Ok(Preprocessed { frame, report })
}

fn parse_number(cell: &str) -> Option<f64> {
    cell.parse::<f64>()
        .ok()
        .filter(|v| is_model_representable(*v))
}
