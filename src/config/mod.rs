//! Configuration module for chargecast
//!
//! This module handles:
//! - Data and artifact locations
//! - Tree-shape overrides for training

mod pipeline_config;

pub use pipeline_config::{
    load_pipeline_config, PathsConfig, PipelineConfig, TrainingConfig, CONFIG_FILE_NAME,
    DEFAULT_DATA_PATH, DEFAULT_JOURNAL_PATH,
};
