use crate::detection::domain::face_landmarks::FaceLandmarks;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::image::Image;

/// Domain interface for locating facial landmarks inside a detected box.
pub trait LandmarkPredictor: Send + Sync {
    fn predict(
        &self,
        image: &Image,
        bounding_box: &BoundingBox,
    ) -> Result<FaceLandmarks, Box<dyn std::error::Error>>;
}
