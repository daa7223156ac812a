use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::error::FaceToolsError;
use crate::shared::image::Image;

const MIN_FACE_SIZE: u32 = 20;
const SCORE_THRESH: f64 = 2.0;
const PYRAMID_SCALE_FACTOR: f32 = 0.8;
const SLIDE_WINDOW_STEP: u32 = 4;

/// Fast frontal-face detector backed by the `rustface` crate (SeetaFace cascade).
///
/// Works on the luma plane only. The loaded model is cloned into a fresh
/// detector per call, so detection needs no interior locking.
pub struct RustfaceDetector {
    model: rustface::Model,
}

impl RustfaceDetector {
    pub fn new(model_path: &Path) -> Result<Self, FaceToolsError> {
        let file = File::open(model_path).map_err(|e| FaceToolsError::model_load(model_path, e))?;
        let model = rustface::read_model(BufReader::new(file))
            .map_err(|e| FaceToolsError::model_load(model_path, e))?;
        log::info!("Loaded model {}", model_path.display());
        Ok(Self { model })
    }
}

impl FaceDetector for RustfaceDetector {
    fn detect(&self, image: &Image) -> Result<Vec<BoundingBox>, Box<dyn std::error::Error>> {
        if image.is_empty() {
            return Ok(Vec::new());
        }
        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(MIN_FACE_SIZE);
        detector.set_score_thresh(SCORE_THRESH);
        detector.set_pyramid_scale_factor(PYRAMID_SCALE_FACTOR);
        detector.set_slide_window_step(SLIDE_WINDOW_STEP, SLIDE_WINDOW_STEP);

        let gray = image.to_grayscale();
        let faces = detector.detect(&rustface::ImageData::new(
            &gray,
            image.width(),
            image.height(),
        ));

        Ok(faces
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                BoundingBox::new(
                    bbox.x() as f64,
                    bbox.y() as f64,
                    bbox.width() as f64,
                    bbox.height() as f64,
                )
                .with_confidence(face.score())
            })
            .collect())
    }
}
