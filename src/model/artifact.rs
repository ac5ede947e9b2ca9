//! Persisted model artifact
//!
//! Layout: 8-byte magic, little-endian `u32` [`ARTIFACT_VERSION`], then a
//! JSON body. The version is checked before the body is decoded so a
//! stale artifact is reported as a mismatch rather than a parse failure.
//!
//! Writes go to a sibling `.tmp` file that is fsynced and then renamed
//! over the target, so the canonical path only ever holds a complete
//! artifact.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::gbdt_model::{PowerRegressor, TreeParams};
use super::metrics::RegressionMetrics;
use crate::error::{PipelineError, PipelineResult};
use crate::features::{ARTIFACT_VERSION, FEATURE_NAMES, TARGET_COLUMN};

pub const ARTIFACT_MAGIC: &[u8; 8] = b"CHGCAST\0";
const HEADER_LEN: usize = ARTIFACT_MAGIC.len() + 4;

/// A fitted regressor plus the contract it was trained against.
#[derive(Serialize, Deserialize)]
pub struct ModelArtifact {
    pub feature_names: Vec<String>,
    pub target: String,
    pub params: TreeParams,
    pub metrics: RegressionMetrics,
    pub train_rows: usize,
    pub test_rows: usize,
    pub regressor: PowerRegressor,
}

impl ModelArtifact {
    pub fn new(
        regressor: PowerRegressor,
        params: TreeParams,
        metrics: RegressionMetrics,
        train_rows: usize,
        test_rows: usize,
    ) -> Self {
        Self {
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            target: TARGET_COLUMN.to_string(),
            params,
            metrics,
            train_rows,
            test_rows,
            regressor,
        }
    }

    pub fn encode(&self) -> serde_json::Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(HEADER_LEN + 64 * 1024);
        bytes.extend_from_slice(ARTIFACT_MAGIC);
        bytes.extend_from_slice(&ARTIFACT_VERSION.to_le_bytes());
        serde_json::to_writer(&mut bytes, self)?;
        Ok(bytes)
    }

    /// Decode artifact bytes. `path` is only used in error messages.
    pub fn decode(bytes: &[u8], path: &Path) -> PipelineResult<Self> {
        let corrupt = |reason: String| PipelineError::ArtifactCorrupt {
            path: path.to_path_buf(),
            reason,
        };

        if bytes.len() < HEADER_LEN || &bytes[..ARTIFACT_MAGIC.len()] != ARTIFACT_MAGIC {
            return Err(corrupt("missing artifact header".to_string()));
        }

        let mut version = [0u8; 4];
        version.copy_from_slice(&bytes[ARTIFACT_MAGIC.len()..HEADER_LEN]);
        let found = u32::from_le_bytes(version);
        if found != ARTIFACT_VERSION {
            return Err(PipelineError::ArtifactVersionMismatch {
                found,
                expected: ARTIFACT_VERSION,
            });
        }

        let artifact: ModelArtifact = serde_json::from_slice(&bytes[HEADER_LEN..])
            .map_err(|e| corrupt(format!("undecodable body: {e}")))?;

        if artifact.feature_names.iter().map(String::as_str).ne(FEATURE_NAMES) {
            return Err(corrupt(format!(
                "feature columns {:?} do not match contract {:?}",
                artifact.feature_names, FEATURE_NAMES
            )));
        }

        Ok(artifact)
    }

    /// Read an artifact. A missing file means the model was never trained.
    pub fn load(path: &Path) -> PipelineResult<Self> {
        let bytes = fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PipelineError::ModelNotTrained {
                path: path.to_path_buf(),
            },
            _ => PipelineError::IoError(e),
        })?;
        Self::decode(&bytes, path)
    }

    /// Write to `<path>.tmp`, fsync, rename over `path`.
    ///
    /// The encoded bytes are decoded once before anything touches disk, so
    /// only loadable artifacts are installed. On failure the temp file is
    /// removed and any previous artifact at `path` is untouched.
    pub fn save_atomic(&self, path: &Path) -> PipelineResult<()> {
        let persistence = |source: std::io::Error| PipelineError::PersistenceError {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(persistence)?;
        }

        let bytes = self.encode().map_err(|e| persistence(e.into()))?;
        // Non-finite floats encode as `null` and would only fail on load
        Self::decode(&bytes, path).map_err(|e| {
            persistence(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("refusing to install unloadable artifact: {e}"),
            ))
        })?;
        let tmp_path = temp_path_for(path);

        let written = write_synced(&tmp_path, &bytes).and_then(|_| fs::rename(&tmp_path, path));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp_path);
            return Err(persistence(e));
        }

        debug!("Wrote {} byte artifact to {}", bytes.len(), path.display());
        Ok(())
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "model".into());
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(bytes)?;
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureRecord;

    fn tiny_artifact() -> ModelArtifact {
        let records: Vec<FeatureRecord> = (0..20)
            .map(|i| FeatureRecord::default().with_hour(i as u8))
            .collect();
        let targets: Vec<f64> = (0..20).map(|i| 5.0 + i as f64).collect();
        let params = TreeParams {
            iterations: 5,
            max_depth: 2,
            learning_rate: 0.3,
            min_leaf_size: 1,
        };
        let regressor = PowerRegressor::fit(&records, &targets, &params).unwrap();
        ModelArtifact::new(
            regressor,
            params,
            RegressionMetrics { rmse: 1.0, r2: 0.5 },
            16,
            4,
        )
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models").join("model.pkl");
        let artifact = tiny_artifact();

        artifact.save_atomic(&path).unwrap();
        assert!(path.exists());
        assert!(!temp_path_for(&path).exists());

        let loaded = ModelArtifact::load(&path).unwrap();
        assert_eq!(loaded.feature_names, FEATURE_NAMES);
        assert_eq!(loaded.target, "charging_power");
        assert_eq!(loaded.train_rows, 16);
        assert_eq!(loaded.test_rows, 4);
        let probe = FeatureRecord::default().with_hour(7);
        assert_eq!(
            loaded.regressor.predict(&probe),
            artifact.regressor.predict(&probe)
        );
    }

    #[test]
    fn test_missing_file_is_model_not_trained() {
        let dir = tempfile::tempdir().unwrap();
        let err = ModelArtifact::load(&dir.path().join("model.pkl")).err();
        assert!(matches!(err, Some(PipelineError::ModelNotTrained { .. })));
    }

    #[test]
    fn test_version_mismatch_detected_before_body() {
        let mut bytes = ARTIFACT_MAGIC.to_vec();
        bytes.extend_from_slice(&(ARTIFACT_VERSION + 1).to_le_bytes());
        bytes.extend_from_slice(b"not even json");

        let err = ModelArtifact::decode(&bytes, Path::new("m.pkl")).err();
        match err {
            Some(PipelineError::ArtifactVersionMismatch { found, expected }) => {
                assert_eq!(found, ARTIFACT_VERSION + 1);
                assert_eq!(expected, ARTIFACT_VERSION);
            }
            _ => panic!("expected ArtifactVersionMismatch"),
        }
    }

    #[test]
    fn test_corrupt_artifacts() {
        let path = Path::new("m.pkl");
        assert!(matches!(
            ModelArtifact::decode(b"", path),
            Err(PipelineError::ArtifactCorrupt { .. })
        ));
        assert!(matches!(
            ModelArtifact::decode(b"\x80\x04pickle-ish bytes", path),
            Err(PipelineError::ArtifactCorrupt { .. })
        ));

        let bytes = tiny_artifact().encode().unwrap();
        let truncated = &bytes[..bytes.len() / 2];
        assert!(matches!(
            ModelArtifact::decode(truncated, path),
            Err(PipelineError::ArtifactCorrupt { .. })
        ));
    }

    #[test]
    fn test_foreign_feature_list_rejected() {
        let mut artifact = tiny_artifact();
        artifact.feature_names.swap(0, 1);
        let bytes = artifact.encode().unwrap();
        assert!(matches!(
            ModelArtifact::decode(&bytes, Path::new("m.pkl")),
            Err(PipelineError::ArtifactCorrupt { .. })
        ));
    }

    #[test]
    fn test_failed_save_keeps_previous_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.pkl");
        tiny_artifact().save_atomic(&path).unwrap();
        let before = fs::read(&path).unwrap();

        // A directory squatting on the temp path makes the write fail.
        fs::create_dir(temp_path_for(&path)).unwrap();
        let err = tiny_artifact().save_atomic(&path).err();
        assert!(matches!(err, Some(PipelineError::PersistenceError { .. })));
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_unloadable_artifact_is_never_installed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.pkl");

        let mut broken = tiny_artifact();
        broken.metrics = RegressionMetrics {
            rmse: f64::NAN,
            r2: f64::NAN,
        };
        let err = broken.save_atomic(&path).err();
        assert!(matches!(err, Some(PipelineError::PersistenceError { .. })));
        assert!(!path.exists());
        assert!(!temp_path_for(&path).exists());

        tiny_artifact().save_atomic(&path).unwrap();
        let before = fs::read(&path).unwrap();
        assert!(broken.save_atomic(&path).is_err());
        assert_eq!(fs::read(&path).unwrap(), before);
        assert!(ModelArtifact::load(&path).is_ok());
    }

    #[test]
    fn test_temp_path_is_sibling() {
        assert_eq!(
            temp_path_for(Path::new("models/model.pkl")),
            PathBuf::from("models/model.pkl.tmp")
        );
    }
}
