/// 68-point landmark regressor using ONNX Runtime.
///
/// The face box is expanded to a square crop, resized to the network
/// input and scaled to `[0, 1]`. The network emits 68 `(x, y)` pairs
/// normalised to the crop, which are mapped back to image coordinates
/// and reduced to the five alignment anchors.
use std::path::Path;
use std::sync::Mutex;

use crate::detection::domain::face_aligner::{warp, SimilarityTransform};
use crate::detection::domain::face_landmarks::FaceLandmarks;
use crate::detection::domain::landmark_predictor::LandmarkPredictor;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::error::FaceToolsError;
use crate::shared::image::Image;

use super::execution_provider::{load_session, require_outputs};

const INPUT_SIZE: u32 = 112;
const NUM_POINTS: usize = 68;
/// Crop side relative to the longer side of the face box.
const CROP_EXPANSION: f64 = 1.2;

pub struct OnnxLandmarkPredictor {
    session: Mutex<ort::session::Session>,
}

impl OnnxLandmarkPredictor {
    pub fn new(model_path: &Path) -> Result<Self, FaceToolsError> {
        Ok(Self {
            session: Mutex::new(load_session(model_path)?),
        })
    }
}

impl LandmarkPredictor for OnnxLandmarkPredictor {
    fn predict(
        &self,
        image: &Image,
        bounding_box: &BoundingBox,
    ) -> Result<FaceLandmarks, Box<dyn std::error::Error>> {
        let crop_to_image = crop_transform(bounding_box);
        let crop = warp(image, &crop_to_image, INPUT_SIZE);
        let input_value = ort::value::Tensor::from_array(preprocess(&crop))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| format!("Lock poisoned: {e}"))?;
        let outputs = session.run(ort::inputs![input_value])?;
        require_outputs(outputs.len(), "landmark")?;
        let array = outputs[0].try_extract_array::<f32>()?;
        let raw: Vec<f32> = array.iter().copied().collect();

        let points = decode_points(&raw, &crop_to_image)?;
        Ok(FaceLandmarks::from_points(&points)?)
    }
}

/// Transform from input-crop pixels to image pixels for a square crop
/// centred on `bounding_box`.
fn crop_transform(bounding_box: &BoundingBox) -> SimilarityTransform {
    let side = bounding_box.width.max(bounding_box.height) * CROP_EXPANSION;
    let (cx, cy) = bounding_box.center();
    SimilarityTransform {
        a: side / INPUT_SIZE as f64,
        b: 0.0,
        tx: cx - side / 2.0,
        ty: cy - side / 2.0,
    }
}

/// HWC u8 → NCHW f32 in `[0, 1]`.
fn preprocess(crop: &Image) -> ndarray::Array4<f32> {
    let size = crop.width() as usize;
    let src = crop.as_ndarray();
    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, size, size));
    for y in 0..size {
        for x in 0..size {
            for c in 0..3 {
                tensor[[0, c, y, x]] = src[[y, x, c]] as f32 / 255.0;
            }
        }
    }
    tensor
}

fn decode_points(
    raw: &[f32],
    crop_to_image: &SimilarityTransform,
) -> Result<Vec<(f64, f64)>, FaceToolsError> {
    if raw.len() != NUM_POINTS * 2 {
        return Err(FaceToolsError::UnexpectedModelOutput(format!(
            "expected {} landmark values, got {}",
            NUM_POINTS * 2,
            raw.len()
        )));
    }
    let size = INPUT_SIZE as f64;
    Ok(raw
        .chunks_exact(2)
        .map(|p| crop_to_image.apply(p[0] as f64 * size, p[1] as f64 * size))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_crop_transform_covers_expanded_square() {
        let b = BoundingBox::new(100.0, 50.0, 80.0, 40.0);
        let t = crop_transform(&b);
        // 96px square centred on (140, 70).
        let (x0, y0) = t.apply(0.0, 0.0);
        let (x1, y1) = t.apply(INPUT_SIZE as f64, INPUT_SIZE as f64);
        assert_relative_eq!(x0, 92.0, epsilon = 1e-9);
        assert_relative_eq!(y0, 22.0, epsilon = 1e-9);
        assert_relative_eq!(x1, 188.0, epsilon = 1e-9);
        assert_relative_eq!(y1, 118.0, epsilon = 1e-9);
    }

    #[test]
    fn test_preprocess_layout_and_range() {
        let mut crop = Image::filled(INPUT_SIZE, INPUT_SIZE, [0, 0, 0]);
        let idx = (5 * INPUT_SIZE as usize + 7) * 3;
        crop.data_mut()[idx..idx + 3].copy_from_slice(&[255, 0, 51]);
        let t = preprocess(&crop);
        assert_eq!(t.shape(), &[1, 3, 112, 112]);
        assert_relative_eq!(t[[0, 0, 5, 7]], 1.0);
        assert_relative_eq!(t[[0, 1, 5, 7]], 0.0);
        assert_relative_eq!(t[[0, 2, 5, 7]], 0.2, epsilon = 1e-6);
    }

    #[test]
    fn test_decode_points_maps_into_image() {
        let b = BoundingBox::new(0.0, 0.0, 112.0 / CROP_EXPANSION, 112.0 / CROP_EXPANSION);
        let t = crop_transform(&b);
        let raw = vec![0.5f32; NUM_POINTS * 2];
        let points = decode_points(&raw, &t).unwrap();
        assert_eq!(points.len(), NUM_POINTS);
        let (cx, cy) = b.center();
        assert_relative_eq!(points[0].0, cx, epsilon = 1e-6);
        assert_relative_eq!(points[0].1, cy, epsilon = 1e-6);
    }

    #[test]
    fn test_decode_points_rejects_wrong_length() {
        let t = crop_transform(&BoundingBox::new(0.0, 0.0, 10.0, 10.0));
        assert!(matches!(
            decode_points(&[0.0; 10], &t),
            Err(FaceToolsError::UnexpectedModelOutput(_))
        ));
    }

    #[test]
    fn test_new_missing_model_is_load_error() {
        let result = OnnxLandmarkPredictor::new(Path::new("/nonexistent/landmarks.onnx"));
        assert!(matches!(result, Err(FaceToolsError::ModelLoad { .. })));
    }
}
