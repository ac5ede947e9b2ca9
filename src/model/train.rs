//! Training for the charging-power regressor
//!
//! CSV → preprocess → seeded 80/20 split → GBDT fit → hold-out metrics →
//! atomic artifact write.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use super::artifact::ModelArtifact;
use super::gbdt_model::{PowerRegressor, TreeParams};
use super::metrics::RegressionMetrics;
use super::split::{train_test_split, MIN_USABLE_ROWS, SPLIT_SEED};
use crate::error::{PipelineError, PipelineResult};
use crate::features::FeatureRecord;
use crate::ingest::{load_session_log, CanonicalFrame, PreprocessReport};

/// Default artifact location, relative to the working directory.
pub const DEFAULT_MODEL_PATH: &str = "models/model.pkl";

/// Training configuration
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Where the fitted artifact is written
    pub model_path: PathBuf,
    pub params: TreeParams,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            params: TreeParams::default(),
        }
    }
}

/// Training result
#[derive(Debug, Clone, Serialize)]
pub struct TrainReport {
    pub rmse: f64,
    pub r2: f64,
    pub train_rows: usize,
    pub test_rows: usize,
    pub preprocess: PreprocessReport,
    /// Path to saved model
    pub model_path: PathBuf,
}

impl TrainReport {
    /// `(rmse, r2)` on the held-out split.
    pub fn metrics(&self) -> (f64, f64) {
        (self.rmse, self.r2)
    }
}

/// A fitted model and its hold-out evaluation, before persistence.
pub struct FittedModel {
    pub regressor: PowerRegressor,
    pub metrics: RegressionMetrics,
    pub train_rows: usize,
    pub test_rows: usize,
}

/// Train on the session log at `csv_path` and persist the artifact.
pub fn train(csv_path: &Path, config: &TrainConfig) -> PipelineResult<TrainReport> {
    let prepared = load_session_log(csv_path)?;
    info!(
        "Loaded {} usable rows from {}",
        prepared.frame.len(),
        csv_path.display()
    );

    let fitted = fit_frame(&prepared.frame, &config.params)?;

    let artifact = ModelArtifact::new(
        fitted.regressor,
        config.params,
        fitted.metrics,
        fitted.train_rows,
        fitted.test_rows,
    );
    artifact.save_atomic(&config.model_path)?;

    info!(
        "Model trained successfully! RMSE: {:.3}, R²: {:.3} (saved to {})",
        fitted.metrics.rmse,
        fitted.metrics.r2,
        config.model_path.display()
    );

    Ok(TrainReport {
        rmse: fitted.metrics.rmse,
        r2: fitted.metrics.r2,
        train_rows: fitted.train_rows,
        test_rows: fitted.test_rows,
        preprocess: prepared.report,
        model_path: config.model_path.clone(),
    })
}

/// Split, fit and evaluate a canonical frame. Nothing touches disk.
pub fn fit_frame(frame: &CanonicalFrame, params: &TreeParams) -> PipelineResult<FittedModel> {
    if frame.len() < MIN_USABLE_ROWS {
        return Err(PipelineError::InsufficientData {
            usable: frame.len(),
            required: MIN_USABLE_ROWS,
        });
    }

    let split = train_test_split(frame.len(), SPLIT_SEED);
    let (train_x, train_y) = gather(frame, &split.train);
    let (test_x, test_y) = gather(frame, &split.test);

    info!(
        "Training: {} rows, Test: {} rows ({} boosting rounds)",
        train_x.len(),
        test_x.len(),
        params.iterations
    );

    let regressor = PowerRegressor::fit(&train_x, &train_y, params)?;
    let predicted = regressor.predict_batch(&test_x);
    let metrics = RegressionMetrics::evaluate(&test_y, &predicted);

    Ok(FittedModel {
        regressor,
        metrics,
        train_rows: train_x.len(),
        test_rows: test_x.len(),
    })
}

fn gather(frame: &CanonicalFrame, indices: &[usize]) -> (Vec<FeatureRecord>, Vec<f64>) {
    indices
        .iter()
        .map(|&i| (frame.records()[i], frame.targets()[i]))
        .unzip()
}
