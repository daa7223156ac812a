use crate::shared::bounding_box::BoundingBox;
use crate::shared::image::Image;

/// Domain interface for locating faces in a single image.
///
/// Implementations hold read-only model state, so detection takes `&self`
/// and a detector can be shared across worker threads.
pub trait FaceDetector: Send + Sync {
    fn detect(&self, image: &Image) -> Result<Vec<BoundingBox>, Box<dyn std::error::Error>>;
}
