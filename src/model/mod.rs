//! Charging-power model: fitting, persistence and inference
//!
//! Architecture: canonical rows → GBDT (squared error) →
//! versioned artifact on disk → cached predictor.

pub mod artifact;
pub mod gbdt_model;
pub mod metrics;
pub mod predict;
pub mod split;
pub mod train;

pub use artifact::ModelArtifact;
pub use gbdt_model::{PowerRegressor, TreeParams};
pub use metrics::RegressionMetrics;
pub use predict::{predict, Predictor, HOURS_PER_DAY};
pub use split::{train_test_split, Split, MIN_USABLE_ROWS, SPLIT_SEED, TEST_PERCENT};
pub use train::{fit_frame, train, FittedModel, TrainConfig, TrainReport, DEFAULT_MODEL_PATH};
