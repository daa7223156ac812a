use std::path::{Path, PathBuf};

use thiserror::Error;

use super::constants::{
    ACCURATE_DETECTOR_MODEL_NAME, EMBEDDING_MODEL_NAME, FAST_DETECTOR_MODEL_NAME,
    LANDMARK_MODEL_NAME, SYSTEM_MODEL_DIR,
};
use crate::detection::domain::detector_kind::DetectorKind;

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("no {name} model file found (searched {})", display_paths(.searched))]
    NotFound { name: String, searched: Vec<PathBuf> },
    #[error("could not determine user data directory")]
    NoDataDir,
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Paths to the three pretrained artifacts the pipeline needs.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelPaths {
    pub detector: PathBuf,
    pub landmarks: PathBuf,
    pub embedding: PathBuf,
}

/// Resolve a model file by name, returning the first directory that has it.
///
/// Directories are searched in order, so earlier entries take precedence.
pub fn resolve(name: &str, search_dirs: &[PathBuf]) -> Result<PathBuf, ModelResolveError> {
    search_dirs
        .iter()
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| ModelResolveError::NotFound {
            name: name.to_string(),
            searched: search_dirs.to_vec(),
        })
}

/// Default search order: working directory, user data directory, system directory.
///
/// - Linux: `$XDG_DATA_HOME/facegrep/models/` or `~/.local/share/facegrep/models/`
/// - macOS: `~/Library/Application Support/facegrep/models/`
/// - Windows: `%APPDATA%/facegrep/models/`
pub fn default_search_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![PathBuf::from(".")];
    if let Ok(dir) = user_model_dir() {
        dirs.push(dir);
    }
    dirs.push(PathBuf::from(SYSTEM_MODEL_DIR));
    dirs
}

pub fn user_model_dir() -> Result<PathBuf, ModelResolveError> {
    dirs::data_dir()
        .map(|d| d.join("facegrep").join("models"))
        .ok_or(ModelResolveError::NoDataDir)
}

/// Resolve detector, landmark and embedding models for a detector variant.
pub fn resolve_models(
    kind: DetectorKind,
    search_dirs: &[PathBuf],
) -> Result<ModelPaths, ModelResolveError> {
    let detector_name = match kind {
        DetectorKind::Fast => FAST_DETECTOR_MODEL_NAME,
        DetectorKind::Accurate => ACCURATE_DETECTOR_MODEL_NAME,
    };
    Ok(ModelPaths {
        detector: resolve(detector_name, search_dirs)?,
        landmarks: resolve(LANDMARK_MODEL_NAME, search_dirs)?,
        embedding: resolve(EMBEDDING_MODEL_NAME, search_dirs)?,
    })
}

/// Convenience for logging which copy of a model was picked.
pub fn describe(path: &Path) -> String {
    path.canonicalize()
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}
