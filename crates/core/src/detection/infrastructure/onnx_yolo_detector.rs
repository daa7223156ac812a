/// YOLO face detector using ONNX Runtime via `ort`.
///
/// This is the accurate backend: slower than the cascade detector but
/// robust to pose and scale. Handles letterbox preprocessing, inference
/// and NMS post-processing; boxes come back in input-image coordinates.
use std::path::Path;
use std::sync::Mutex;

use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::error::FaceToolsError;
use crate::shared::image::Image;

use super::execution_provider::{load_session, require_outputs};
use super::math::nms;

/// Fallback YOLO model input resolution when the model doesn't specify dimensions.
const DEFAULT_INPUT_SIZE: u32 = 640;

/// Default confidence threshold for face detection.
pub const DEFAULT_CONFIDENCE: f64 = 0.25;

/// NMS IoU threshold.
const NMS_IOU_THRESH: f64 = 0.45;

pub struct OnnxYoloDetector {
    session: Mutex<ort::session::Session>,
    confidence: f64,
    input_size: u32,
}

impl OnnxYoloDetector {
    /// Load a YOLO ONNX model and prepare for inference.
    ///
    /// The input resolution is read from the model's input shape (expecting NCHW).
    /// Falls back to 640 if the shape is dynamic or unreadable.
    pub fn new(model_path: &Path, confidence: f64) -> Result<Self, FaceToolsError> {
        let session = load_session(model_path)?;

        let input_size = session
            .inputs()
            .first()
            .and_then(|input| {
                if let ort::value::ValueType::Tensor { ref shape, .. } = input.dtype() {
                    if shape.len() >= 4 && shape[2] > 0 {
                        Some(shape[2] as u32)
                    } else {
                        None
                    }
                } else {
                    None
                }
            })
            .unwrap_or(DEFAULT_INPUT_SIZE);

        Ok(Self {
            session: Mutex::new(session),
            confidence,
            input_size,
        })
    }
}

impl FaceDetector for OnnxYoloDetector {
    fn detect(&self, image: &Image) -> Result<Vec<BoundingBox>, Box<dyn std::error::Error>> {
        if image.is_empty() {
            return Ok(Vec::new());
        }
        let (input_tensor, scale, pad_x, pad_y) = letterbox(image, self.input_size);

        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let mut session = self
            .session
            .lock()
            .map_err(|e| format!("Lock poisoned: {e}"))?;
        let outputs = session.run(ort::inputs![input_value])?;
        require_outputs(outputs.len(), "YOLO")?;
        let tensor = outputs[0].try_extract_array::<f32>()?;
        let shape = tensor.shape().to_vec();
        if shape.len() != 3 {
            return Err(FaceToolsError::UnexpectedModelOutput(format!(
                "YOLO output shape {shape:?}"
            ))
            .into());
        }
        let data: Vec<f32> = tensor.iter().copied().collect();

        let boxes = decode_rows(&data, shape[1], shape[2], self.confidence)
            .into_iter()
            .map(|b| unletterbox(b, scale, pad_x, pad_y))
            .collect();
        Ok(nms(boxes, NMS_IOU_THRESH))
    }
}

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

/// Letterbox-resize an image to `target_size` × `target_size`.
///
/// Returns `(NCHW float32 tensor, scale, pad_x, pad_y)`.
fn letterbox(image: &Image, target_size: u32) -> (ndarray::Array4<f32>, f64, u32, u32) {
    let fw = image.width() as f64;
    let fh = image.height() as f64;
    let target = target_size as f64;

    let scale = (target / fw).min(target / fh);
    let new_w = ((fw * scale).round() as u32).min(target_size);
    let new_h = ((fh * scale).round() as u32).min(target_size);
    let pad_x = (target_size - new_w) / 2;
    let pad_y = (target_size - new_h) / 2;

    // Padding is 114/255 gray, the YOLO convention.
    let gray = 114.0f32 / 255.0;
    let mut tensor =
        ndarray::Array4::<f32>::from_elem((1, 3, target_size as usize, target_size as usize), gray);

    let src = image.as_ndarray();
    let src_h = image.height() as usize;
    let src_w = image.width() as usize;

    for y in 0..new_h as usize {
        let src_y = ((y as f64 / scale) as usize).min(src_h - 1);
        for x in 0..new_w as usize {
            let src_x = ((x as f64 / scale) as usize).min(src_w - 1);
            let ty = pad_y as usize + y;
            let tx = pad_x as usize + x;
            for c in 0..3 {
                tensor[[0, c, ty, tx]] = src[[src_y, src_x, c]] as f32 / 255.0;
            }
        }
    }

    (tensor, scale, pad_x, pad_y)
}

// ---------------------------------------------------------------------------
// Postprocessing
// ---------------------------------------------------------------------------

/// Parse raw YOLO rows into letterbox-space boxes above `confidence`.
///
/// The output is `[1, features, detections]` (transposed) or
/// `[1, detections, features]`; the smaller axis is taken as features.
/// Each row starts `[cx, cy, w, h, conf, ...]`; trailing keypoints are ignored.
fn decode_rows(data: &[f32], dim1: usize, dim2: usize, confidence: f64) -> Vec<BoundingBox> {
    let transposed = dim1 < dim2;
    let (num_dets, num_feats) = if transposed { (dim2, dim1) } else { (dim1, dim2) };
    if num_feats < 5 {
        return Vec::new();
    }
    let value = |det: usize, feat: usize| -> f64 {
        let idx = if transposed {
            feat * num_dets + det
        } else {
            det * num_feats + feat
        };
        data[idx] as f64
    };

    (0..num_dets)
        .filter_map(|i| {
            let conf = value(i, 4);
            if conf < confidence {
                return None;
            }
            let (cx, cy, w, h) = (value(i, 0), value(i, 1), value(i, 2), value(i, 3));
            Some(BoundingBox::new(cx - w / 2.0, cy - h / 2.0, w, h).with_confidence(conf))
        })
        .collect()
}

/// Map a letterbox-space box back to original image coordinates.
fn unletterbox(b: BoundingBox, scale: f64, pad_x: u32, pad_y: u32) -> BoundingBox {
    BoundingBox {
        x: b.x - pad_x as f64,
        y: b.y - pad_y as f64,
        ..b
    }
    .scaled(1.0 / scale)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
