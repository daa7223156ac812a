use std::path::Path;

use crate::detection::domain::detector_kind::DetectorKind;
use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::error::FaceToolsError;
use crate::shared::image::Image;

use super::onnx_yolo_detector::{OnnxYoloDetector, DEFAULT_CONFIDENCE};
use super::rustface_detector::RustfaceDetector;

/// The detector variant chosen at construction.
pub enum FaceDetectorBackend {
    Fast(RustfaceDetector),
    Accurate(OnnxYoloDetector),
}

impl FaceDetector for FaceDetectorBackend {
    fn detect(&self, image: &Image) -> Result<Vec<BoundingBox>, Box<dyn std::error::Error>> {
        match self {
            Self::Fast(d) => d.detect(image),
            Self::Accurate(d) => d.detect(image),
        }
    }
}

/// Load the detector for `kind` from `model_path`.
///
/// The model must match the variant: a SeetaFace cascade for
/// [`DetectorKind::Fast`], a YOLO ONNX graph for [`DetectorKind::Accurate`].
pub fn create_detector(
    kind: DetectorKind,
    model_path: &Path,
) -> Result<FaceDetectorBackend, FaceToolsError> {
    log::info!("Using {kind} face detector ({})", model_path.display());
    Ok(match kind {
        DetectorKind::Fast => FaceDetectorBackend::Fast(RustfaceDetector::new(model_path)?),
        DetectorKind::Accurate => FaceDetectorBackend::Accurate(OnnxYoloDetector::new(
            model_path,
            DEFAULT_CONFIDENCE,
        )?),
    })
}
