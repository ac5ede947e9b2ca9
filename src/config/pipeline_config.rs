//! Pipeline configuration
//!
//! Loads optional settings from `chargecast.toml` in the working
//! directory (or a path given on the command line).
//!
//! # Configuration Format
//!
//! ```toml
//! # chargecast.toml
//!
//! [paths]
//! data = "data/ev_data.csv"
//! model = "models/model.pkl"
//! journal = "logs/predictions.jsonl"
//!
//! [training]
//! iterations = 200
//! max_depth = 5
//! learning_rate = 0.1
//! min_leaf_size = 20
//! ```
//!
//! The split ratio and seed are not configurable.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::{TrainConfig, TreeParams, DEFAULT_MODEL_PATH};

pub const CONFIG_FILE_NAME: &str = "chargecast.toml";
pub const DEFAULT_DATA_PATH: &str = "data/ev_data.csv";
pub const DEFAULT_JOURNAL_PATH: &str = "logs/predictions.jsonl";

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub training: TrainingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Session log used by `train` and `inspect`
    pub data: PathBuf,
    /// Artifact written by `train`, read by `predict`
    pub model: PathBuf,
    /// Prediction journal used by `predict --log` and `history`
    pub journal: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data: PathBuf::from(DEFAULT_DATA_PATH),
            model: PathBuf::from(DEFAULT_MODEL_PATH),
            journal: PathBuf::from(DEFAULT_JOURNAL_PATH),
        }
    }
}

/// Tree-shape overrides; unset fields keep [`TreeParams::default`].
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct TrainingConfig {
    pub iterations: Option<usize>,
    pub max_depth: Option<u32>,
    pub learning_rate: Option<f64>,
    pub min_leaf_size: Option<usize>,
}

impl TrainingConfig {
    pub fn tree_params(&self) -> TreeParams {
        let defaults = TreeParams::default();
        TreeParams {
            iterations: self.iterations.unwrap_or(defaults.iterations),
            max_depth: self.max_depth.unwrap_or(defaults.max_depth),
            learning_rate: self.learning_rate.unwrap_or(defaults.learning_rate),
            min_leaf_size: self.min_leaf_size.unwrap_or(defaults.min_leaf_size),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.iterations == Some(0) {
            anyhow::bail!("training.iterations must be at least 1");
        }
        if self.max_depth == Some(0) {
            anyhow::bail!("training.max_depth must be at least 1");
        }
        if let Some(lr) = self.learning_rate {
            if !(lr > 0.0 && lr <= 1.0) {
                anyhow::bail!("training.learning_rate must be in (0, 1], got {lr}");
            }
        }
        Ok(())
    }
}

impl PipelineConfig {
    pub fn train_config(&self) -> TrainConfig {
        TrainConfig {
            model_path: self.paths.model.clone(),
            params: self.training.tree_params(),
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: PipelineConfig = toml::from_str(content)?;
        config.training.validate()?;
        Ok(config)
    }

    /// Example file written by `chargecast init`.
    pub fn example_toml() -> &'static str {
        r#"# chargecast configuration

[paths]
# Session log with a `charging_power` column (kW)
data = "data/ev_data.csv"
# Trained model artifact (created on demand)
model = "models/model.pkl"
# Prediction journal (`predict --log`, `history`)
journal = "logs/predictions.jsonl"

[training]
# Boosting rounds
# iterations = 200
# max_depth = 5
# learning_rate = 0.1
# min_leaf_size = 20
"#
    }
}

fn load_toml_config(path: &Path) -> Result<PipelineConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    PipelineConfig::from_toml(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load configuration, falling back to defaults when the file is absent
/// or unusable.
pub fn load_pipeline_config(path: &Path) -> PipelineConfig {
    if !path.exists() {
        debug!("No config at {}, using defaults", path.display());
        return PipelineConfig::default();
    }

    match load_toml_config(path) {
        Ok(config) => {
            debug!("Loaded pipeline config from {}", path.display());
            config
        }
        Err(e) => {
            warn!("{:#}; using defaults", e);
            PipelineConfig::default()
        }
    }
}
