//! Persistence of the single trained model artifact

use crate::error::{ForecastError, Result};
use crate::models::TrainedLagRegression;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Location of the JSON model artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelStore {
    path: PathBuf,
}

impl Default for ModelStore {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PATH)
    }
}

impl ModelStore {
    /// Artifact path used when none is configured
    pub const DEFAULT_PATH: &'static str = "spending_model.json";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Write the artifact, replacing any previous one in a single rename
    pub fn save(&self, model: &TrainedLagRegression) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let staging = self.staging_path();
        let json = serde_json::to_vec_pretty(model)?;
        fs::write(&staging, json)?;
        if let Err(err) = fs::rename(&staging, &self.path) {
            let _ = fs::remove_file(&staging);
            return Err(err.into());
        }

        info!(path = %self.path.display(), samples = model.sample_count(), "Saved model artifact");
        Ok(())
    }

    /// Read the artifact; any failure means the model is unavailable
    pub fn load(&self) -> Result<TrainedLagRegression> {
        let unavailable = |reason: String| ForecastError::ModelUnavailable {
            path: self.path.clone(),
            reason,
        };

        let bytes = fs::read(&self.path).map_err(|e| unavailable(e.to_string()))?;
        let model: TrainedLagRegression =
            serde_json::from_slice(&bytes).map_err(|e| unavailable(e.to_string()))?;
        model.validate().map_err(|e| unavailable(e.to_string()))?;

        info!(
            path = %self.path.display(),
            trained_at = %model.trained_at(),
            samples = model.sample_count(),
            "Loaded model artifact"
        );
        Ok(model)
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
