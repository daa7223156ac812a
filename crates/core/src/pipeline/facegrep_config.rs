use crate::detection::domain::detector_kind::DetectorKind;
use crate::detection::domain::image_scaler::ScalingConfig;
use crate::shared::constants::DEFAULT_THRESHOLD;
use crate::shared::error::{validate_threshold, FaceToolsError};
use crate::shared::model_resolver::ModelPaths;

/// Everything needed to build the search and cluster pipelines.
#[derive(Clone, Debug, PartialEq)]
pub struct FacegrepConfig {
    pub detector_kind: DetectorKind,
    pub jitter: bool,
    /// Embedding distance below which two faces are the same person.
    pub threshold: f32,
    pub models: ModelPaths,
    pub scaling: ScalingConfig,
    /// Candidate images evaluated concurrently; 1 runs on the calling thread.
    pub workers: usize,
    /// Fixes jitter sampling and clustering order when set.
    pub seed: Option<u64>,
}

impl FacegrepConfig {
    /// Defaults: fast detector, jitter on, threshold 0.6, one worker.
    pub fn new(models: ModelPaths) -> Self {
        Self {
            detector_kind: DetectorKind::default(),
            jitter: true,
            threshold: DEFAULT_THRESHOLD,
            models,
            scaling: ScalingConfig::default(),
            workers: 1,
            seed: None,
        }
    }

    pub fn validate(&self) -> Result<(), FaceToolsError> {
        validate_threshold(self.threshold)?;
        self.scaling.validate()?;
        Ok(())
    }
}
