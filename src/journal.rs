//! Prediction journal
//!
//! Append-only log of served predictions, one JSON document per line,
//! keyed by submission time. The predictor never writes here on its own;
//! callers decide whether a prediction is worth recording.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::PipelineResult;
use crate::features::FeatureRecord;

/// One served prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionEntry {
    pub submitted_at: DateTime<Utc>,
    /// Canonical inputs after defaults were applied
    pub features: FeatureRecord,
    pub predicted_kw: f64,
}

impl PredictionEntry {
    pub fn new(features: FeatureRecord, predicted_kw: f64) -> Self {
        Self {
            submitted_at: Utc::now(),
            features,
            predicted_kw,
        }
    }
}

/// Append-only destination for prediction entries.
pub trait PredictionSink {
    fn record(&mut self, entry: &PredictionEntry) -> PipelineResult<()>;
}

impl PredictionSink for Vec<PredictionEntry> {
    fn record(&mut self, entry: &PredictionEntry) -> PipelineResult<()> {
        self.push(entry.clone());
        Ok(())
    }
}

/// JSON-lines file sink
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All entries in submission order. Unreadable lines are skipped.
    pub fn load_all(&self) -> PipelineResult<Vec<PredictionEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(&self.path)?);
        let mut entries = Vec::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<PredictionEntry>(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(
                    "Skipping line {} of {}: {}",
                    lineno + 1,
                    self.path.display(),
                    e
                ),
            }
        }
        Ok(entries)
    }

    /// Up to `limit` entries, newest first.
    pub fn recent(&self, limit: usize) -> PipelineResult<Vec<PredictionEntry>> {
        let mut entries = self.load_all()?;
        // Stable sort keeps file order for equal timestamps
        entries.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        entries.truncate(limit);
        Ok(entries)
    }
}

impl PredictionSink for JsonlSink {
    fn record(&mut self, entry: &PredictionEntry) -> PipelineResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string(entry).map_err(std::io::Error::from)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", json)?;
        Ok(())
    }
}
