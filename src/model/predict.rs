//! Single-record inference against the persisted artifact
//!
//! The loaded artifact is memoized keyed by the file's modification time
//! and length. A retrain replaces the file by rename, which changes the
//! key, so the next prediction reloads.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::SystemTime;

use tracing::debug;

use super::artifact::ModelArtifact;
use crate::error::{PipelineError, PipelineResult};
use crate::features::{FeatureRecord, PredictionRequest};

pub const HOURS_PER_DAY: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    modified: SystemTime,
    len: u64,
}

struct CachedArtifact {
    stamp: FileStamp,
    artifact: Arc<ModelArtifact>,
}

/// Answers prediction requests from the artifact at a fixed path.
pub struct Predictor {
    model_path: PathBuf,
    cache: RwLock<Option<CachedArtifact>>,
}

impl Predictor {
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            cache: RwLock::new(None),
        }
    }

    /// Current artifact, reloading only when the file changed.
    pub fn artifact(&self) -> PipelineResult<Arc<ModelArtifact>> {
        let stamp = match self.stamp() {
            Ok(stamp) => stamp,
            Err(e) => {
                self.clear();
                return Err(e);
            }
        };

        if let Some(cached) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .filter(|c| c.stamp == stamp)
        {
            debug!("Using cached model from {}", self.model_path.display());
            return Ok(Arc::clone(&cached.artifact));
        }

        let artifact = Arc::new(ModelArtifact::load(&self.model_path)?);
        debug!("Loaded model from {}", self.model_path.display());

        *self.cache.write().unwrap_or_else(PoisonError::into_inner) = Some(CachedArtifact {
            stamp,
            artifact: Arc::clone(&artifact),
        });
        Ok(artifact)
    }

    /// Predicted charging power (kW) for one request.
    ///
    /// A missing artifact is reported before the request is validated.
    pub fn predict(&self, request: &PredictionRequest) -> PipelineResult<f64> {
        let artifact = self.artifact()?;
        let record = request.to_record()?;
        Ok(artifact.regressor.predict(&record))
    }

    pub fn predict_record(&self, record: &FeatureRecord) -> PipelineResult<f64> {
        let artifact = self.artifact()?;
        Ok(artifact.regressor.predict(record))
    }

    /// Several scenarios against one loaded artifact.
    pub fn predict_batch(&self, requests: &[PredictionRequest]) -> PipelineResult<Vec<f64>> {
        let artifact = self.artifact()?;
        let records = requests
            .iter()
            .map(PredictionRequest::to_record)
            .collect::<PipelineResult<Vec<_>>>()?;
        Ok(artifact.regressor.predict_batch(&records))
    }

    /// Sweep `hour` over 0..24 with every other field fixed.
    pub fn predict_hourly(
        &self,
        request: &PredictionRequest,
    ) -> PipelineResult<[f64; HOURS_PER_DAY]> {
        let artifact = self.artifact()?;
        let base = request.to_record()?;
        let records: Vec<FeatureRecord> = (0..HOURS_PER_DAY as u8)
            .map(|h| base.with_hour(h))
            .collect();

        let preds = artifact.regressor.predict_batch(&records);

        let mut profile = [0.0; HOURS_PER_DAY];
        for (slot, p) in profile.iter_mut().zip(preds) {
            *slot = p;
        }
        Ok(profile)
    }

    fn stamp(&self) -> PipelineResult<FileStamp> {
        let meta = fs::metadata(&self.model_path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PipelineError::ModelNotTrained {
                path: self.model_path.clone(),
            },
            _ => PipelineError::IoError(e),
        })?;
        Ok(FileStamp {
            modified: meta.modified()?,
            len: meta.len(),
        })
    }

    fn clear(&self) {
        *self.cache.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    #[cfg(test)]
    fn is_cached(&self) -> bool {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

/// One-shot prediction without keeping a `Predictor` around.
pub fn predict(model_path: &Path, request: &PredictionRequest) -> PipelineResult<f64> {
    Predictor::new(model_path).predict(request)
}
