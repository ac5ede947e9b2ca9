//! chargecast - EV charging power prediction
//!
//! Trains a gradient-boosted tree regressor on a session log (CSV) and
//! predicts the charging power (kW) of a single session from five
//! canonical features.
//!
//! ```rust,no_run
//! use std::path::Path;
//! use chargecast::model::{train, Predictor, TrainConfig};
//! use chargecast::features::PredictionRequest;
//!
//! let report = train(Path::new("data/ev_data.csv"), &TrainConfig::default())?;
//! println!("RMSE {:.3}, R² {:.3}", report.rmse, report.r2);
//!
//! let predictor = Predictor::new("models/model.pkl");
//! let kw = predictor.predict(&PredictionRequest::from_json(r#"{"hour": 18, "charging_type": "fast"}"#)?)?;
//! println!("{kw:.2} kW");
//! # Ok::<(), chargecast::PipelineError>(())
//! ```

pub mod config;
pub mod error;
pub mod features;
pub mod ingest;
pub mod journal;
pub mod model;

pub use error::{PipelineError, PipelineResult};
pub use features::{ChargingType, FeatureRecord, PredictionRequest, FEATURE_NAMES};
pub use model::{train, Predictor, TrainConfig, TrainReport};
