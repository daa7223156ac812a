//! Wires the ONNX and rustface adapters into the use cases from a
//! [`FacegrepConfig`]. Every model is loaded here, up front, so a missing
//! or corrupt file fails construction rather than the first search.

use crate::detection::domain::face_extractor::FaceExtractor;
use crate::detection::infrastructure::detector_factory::create_detector;
use crate::detection::infrastructure::onnx_landmark_predictor::OnnxLandmarkPredictor;
use crate::pipeline::cluster_faces_use_case::ClusterFacesUseCase;
use crate::pipeline::face_search_use_case::FaceSearchUseCase;
use crate::pipeline::facegrep_config::FacegrepConfig;
use crate::recognition::domain::face_recogniser::FaceRecogniser;
use crate::recognition::infrastructure::onnx_face_embedder::OnnxFaceEmbedder;
use crate::shared::error::FaceToolsError;

pub fn create_extractor(config: &FacegrepConfig) -> Result<FaceExtractor, FaceToolsError> {
    config.validate()?;
    let detector = create_detector(config.detector_kind, &config.models.detector)?;
    let landmarks = OnnxLandmarkPredictor::new(&config.models.landmarks)?;
    FaceExtractor::new(Box::new(detector), Box::new(landmarks), config.scaling)
}

pub fn create_recogniser(config: &FacegrepConfig) -> Result<FaceRecogniser, FaceToolsError> {
    config.validate()?;
    let embedder = OnnxFaceEmbedder::new(&config.models.embedding)?;
    FaceRecogniser::new(Box::new(embedder), config.threshold, config.jitter, config.seed)
}

pub fn create_search_use_case(
    config: &FacegrepConfig,
) -> Result<FaceSearchUseCase, FaceToolsError> {
    let recogniser = create_recogniser(config)?;
    let extractor = create_extractor(config)?;
    Ok(FaceSearchUseCase::new(extractor, recogniser).with_workers(config.workers))
}

pub fn create_cluster_use_case(
    config: &FacegrepConfig,
) -> Result<ClusterFacesUseCase, FaceToolsError> {
    let recogniser = create_recogniser(config)?;
    let extractor = create_extractor(config)?;
    Ok(ClusterFacesUseCase::new(extractor, recogniser))
}
