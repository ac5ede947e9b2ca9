//! Error taxonomy for the charging-power pipeline
//!
//! Every failure the preprocessor, trainer and predictor can raise is a
//! variant of [`PipelineError`]. Callers get the kind unchanged; nothing in
//! the library retries or swallows. Default substitution for missing
//! optional columns is not an error and only shows up in logs.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur anywhere in the pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Training data not found: {}", path.display())]
    InputMissing { path: PathBuf },

    #[error("Target column '{column}' not found in dataset")]
    SchemaError { column: &'static str },

    #[error("Not enough usable rows to train: found {usable}, need at least {required}")]
    InsufficientData { usable: usize, required: usize },

    #[error("No trained model at {}. Run `chargecast train` first.", path.display())]
    ModelNotTrained { path: PathBuf },

    #[error("Model artifact version {found} does not match expected version {expected}; retrain the model")]
    ArtifactVersionMismatch { found: u32, expected: u32 },

    #[error("Model artifact at {} is corrupt: {reason}", path.display())]
    ArtifactCorrupt { path: PathBuf, reason: String },

    #[error("Failed to persist model to {}: {source}", path.display())]
    PersistenceError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid prediction record: {0}")]
    InvalidRecord(String),

    #[error("Malformed CSV: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
