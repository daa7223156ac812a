use std::path::PathBuf;

use thiserror::Error;

/// Fatal configuration and construction failures.
///
/// These abort pipeline construction: a misconfigured detector or
/// recogniser cannot produce meaningful matches, so callers are expected
/// to surface them rather than retry.
#[derive(Error, Debug)]
pub enum FaceToolsError {
    #[error("face difference threshold must be > 0, got {0}")]
    InvalidThreshold(f32),
    #[error("invalid image scaling: {0}")]
    InvalidScaling(String),
    #[error("failed to load model {path}: {reason}")]
    ModelLoad { path: PathBuf, reason: String },
    #[error("failed to load image {path}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("unexpected model output: {0}")]
    UnexpectedModelOutput(String),
}

impl FaceToolsError {
    pub fn model_load(path: &std::path::Path, reason: impl ToString) -> Self {
        Self::ModelLoad {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

/// Accepts only finite, strictly positive thresholds.
pub fn validate_threshold(threshold: f32) -> Result<f32, FaceToolsError> {
    if threshold.is_finite() && threshold > 0.0 {
        Ok(threshold)
    } else {
        Err(FaceToolsError::InvalidThreshold(threshold))
    }
}
