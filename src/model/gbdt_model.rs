//! GBDT regressor wrapper for charging power
//!
//! Wraps the `gbdt` crate to provide:
//! - Fitting a squared-error ensemble on canonical feature rows
//! - Single and batch inference on `FeatureRecord`s
//!
//! Row and feature subsampling stay at the crate default (1.0), so a fit
//! is a pure function of its input rows and the result does not depend on
//! any RNG state.
//!
//! Note: the gbdt crate internally uses `f32` (`ValueType`), while the
//! contract stores `f64`. Conversions happen at this boundary.

use gbdt::config::Config;
use gbdt::decision_tree::Data;
use gbdt::gradient_boost::GBDT;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};
use crate::features::{FeatureRecord, NUM_FEATURES};

/// Ensemble shape. Rounds and loss are fixed by the pipeline; the rest
/// default to a LightGBM-like setup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    /// Number of boosting rounds
    pub iterations: usize,
    pub max_depth: u32,
    /// Shrinkage applied to every tree
    pub learning_rate: f64,
    pub min_leaf_size: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            iterations: 200,
            max_depth: 5,
            learning_rate: 0.1,
            min_leaf_size: 20,
        }
    }
}

impl TreeParams {
    fn to_config(self) -> Config {
        let mut cfg = Config::new();
        cfg.set_feature_size(NUM_FEATURES);
        cfg.set_max_depth(self.max_depth);
        cfg.set_iterations(self.iterations);
        cfg.set_shrinkage(self.learning_rate as f32);
        cfg.set_loss("SquaredError");
        cfg.set_debug(false);
        cfg.set_training_optimization_level(2);
        cfg.set_min_leaf_size(self.min_leaf_size);
        cfg
    }
}

/// Thin wrapper around `gbdt::gradient_boost::GBDT` speaking `FeatureRecord`.
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct PowerRegressor {
    model: GBDT,
}

impl PowerRegressor {
    /// Fit an ensemble on index-aligned rows and targets.
    pub fn fit(
        records: &[FeatureRecord],
        targets: &[f64],
        params: &TreeParams,
    ) -> PipelineResult<Self> {
        if records.is_empty() || records.len() != targets.len() {
            return Err(PipelineError::InsufficientData {
                usable: records.len().min(targets.len()),
                required: 1,
            });
        }

        let mut gbdt = GBDT::new(&params.to_config());

        let mut training_data: Vec<Data> = records
            .iter()
            .zip(targets)
            .map(|(r, &y)| Data::new_training_data(r.to_vector(), 1.0_f32, y as f32, None))
            .collect();

        gbdt.fit(&mut training_data);

        Ok(Self { model: gbdt })
    }

    /// Predicted charging power in kW.
    pub fn predict(&self, record: &FeatureRecord) -> f64 {
        let data = vec![Data::new_test_data(record.to_vector(), None)];
        let preds = self.model.predict(&data);
        preds.first().copied().unwrap_or(0.0_f32) as f64
    }

    pub fn predict_batch(&self, records: &[FeatureRecord]) -> Vec<f64> {
        if records.is_empty() {
            return Vec::new();
        }

        let data: Vec<Data> = records
            .iter()
            .map(|r| Data::new_test_data(r.to_vector(), None))
            .collect();

        self.model
            .predict(&data)
            .into_iter()
            .map(|p| p as f64)
            .collect()
    }
}
