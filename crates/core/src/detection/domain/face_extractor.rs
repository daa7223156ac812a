use std::path::Path;

use crate::detection::domain::face::Face;
use crate::detection::domain::face_aligner::{extract_chip, ChipDetails};
use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::domain::image_scaler::{self, ScalingConfig};
use crate::detection::domain::landmark_predictor::LandmarkPredictor;
use crate::shared::error::FaceToolsError;
use crate::shared::image::Image;
use crate::shared::image_file_reader::read_image;

/// Turns images into aligned faces: downscale → detect → align.
///
/// Detection runs on an upsampled copy for recall, but every returned box
/// is expressed in the coordinates of the image that was passed in, so the
/// same image can be handed straight to [`FaceExtractor::align`].
pub struct FaceExtractor {
    detector: Box<dyn FaceDetector>,
    landmarks: Box<dyn LandmarkPredictor>,
    scaling: ScalingConfig,
    chip: ChipDetails,
}

impl FaceExtractor {
    pub fn new(
        detector: Box<dyn FaceDetector>,
        landmarks: Box<dyn LandmarkPredictor>,
        scaling: ScalingConfig,
    ) -> Result<Self, FaceToolsError> {
        Ok(Self {
            detector,
            landmarks,
            scaling: scaling.validate()?,
            chip: ChipDetails::default(),
        })
    }

    pub fn with_chip_details(mut self, chip: ChipDetails) -> Self {
        self.chip = chip;
        self
    }

    pub fn scaling(&self) -> &ScalingConfig {
        &self.scaling
    }

    pub fn downscale_image(&self, image: &Image) -> Image {
        image_scaler::downscale(image, &self.scaling)
    }

    /// Locate faces without cropping them. An image with no faces yields an empty list.
    pub fn detect(&self, image: &Image) -> Result<Vec<Face>, Box<dyn std::error::Error>> {
        if image.is_empty() {
            return Ok(Vec::new());
        }
        let (upsampled, factor) = image_scaler::upsample(image, &self.scaling);
        let boxes = self.detector.detect(&upsampled)?;

        let faces: Vec<Face> = boxes
            .iter()
            .map(|b| b.scaled(1.0 / factor).clamped(image.width(), image.height()))
            .filter(|b| !b.is_empty())
            .map(Face::new)
            .collect();
        log::debug!(
            "Detected {} face(s) in {}x{} image",
            faces.len(),
            image.width(),
            image.height()
        );
        Ok(faces)
    }

    /// Aligned copy of `face`, cut from the image it was detected in.
    pub fn align(&self, face: &Face, image: &Image) -> Result<Face, Box<dyn std::error::Error>> {
        let landmarks = self.landmarks.predict(image, face.bounding_box())?;
        Ok(face.with_chip(extract_chip(image, &landmarks, &self.chip)))
    }

    pub fn align_all(
        &self,
        faces: &[Face],
        image: &Image,
    ) -> Result<Vec<Face>, Box<dyn std::error::Error>> {
        faces.iter().map(|f| self.align(f, image)).collect()
    }

    pub fn extract_faces(&self, image: &Image) -> Result<Vec<Face>, Box<dyn std::error::Error>> {
        let resized = self.downscale_image(image);
        let faces = self.detect(&resized)?;
        self.align_all(&faces, &resized)
    }

    pub fn extract_faces_from_path(
        &self,
        path: &Path,
    ) -> Result<Vec<Face>, Box<dyn std::error::Error>> {
        let image = read_image(path)?;
        self.extract_faces(&image)
    }
}
