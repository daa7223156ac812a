/// ResNet face-embedding network using ONNX Runtime.
///
/// Maps aligned 150×150 chips to 128-d vectors in a space where Euclidean
/// distance below ~0.6 means "same person". Output is used as-is, without
/// normalisation, so thresholds keep their usual meaning.
use std::path::Path;
use std::sync::Mutex;

use crate::recognition::domain::embedding::Embedding;
use crate::recognition::domain::embedding_network::EmbeddingNetwork;
use crate::shared::constants::{EMBEDDING_DIM, FACE_CHIP_SIZE};
use crate::shared::error::FaceToolsError;
use crate::shared::image::Image;

use crate::detection::infrastructure::execution_provider::{load_session, require_outputs};

const INPUT_SIZE: usize = FACE_CHIP_SIZE as usize;
/// Per-channel RGB means subtracted before scaling.
const CHANNEL_MEAN: [f32; 3] = [122.782, 117.001, 104.298];
const INPUT_SCALE: f32 = 256.0;

pub struct OnnxFaceEmbedder {
    session: Mutex<ort::session::Session>,
}

impl OnnxFaceEmbedder {
    pub fn new(model_path: &Path) -> Result<Self, FaceToolsError> {
        Ok(Self {
            session: Mutex::new(load_session(model_path)?),
        })
    }
}

impl EmbeddingNetwork for OnnxFaceEmbedder {
    fn embed(&self, chips: &[Image]) -> Result<Vec<Embedding>, Box<dyn std::error::Error>> {
        if chips.is_empty() {
            return Ok(Vec::new());
        }
        let tensor = preprocess(chips);
        let input_value = ort::value::Tensor::from_array(tensor)?;
        let mut session = self
            .session
            .lock()
            .map_err(|e| format!("Lock poisoned: {e}"))?;
        let outputs = session.run(ort::inputs![input_value])?;
        require_outputs(outputs.len(), "embedding")?;
        let array = outputs[0].try_extract_array::<f32>()?;
        let values: Vec<f32> = array.iter().copied().collect();

        Ok(split_batch(&values, chips.len())?)
    }
}

/// Batch of chips → NCHW float32, resized to the network input if needed.
fn preprocess(chips: &[Image]) -> ndarray::Array4<f32> {
    let mut tensor = ndarray::Array4::<f32>::zeros((chips.len(), 3, INPUT_SIZE, INPUT_SIZE));

    for (n, chip) in chips.iter().enumerate() {
        let resized;
        let chip = if chip.width() as usize == INPUT_SIZE && chip.height() as usize == INPUT_SIZE {
            chip
        } else {
            resized = chip.resize(FACE_CHIP_SIZE, FACE_CHIP_SIZE);
            &resized
        };
        let src = chip.as_ndarray();
        for y in 0..INPUT_SIZE {
            for x in 0..INPUT_SIZE {
                for c in 0..3 {
                    tensor[[n, c, y, x]] = (src[[y, x, c]] as f32 - CHANNEL_MEAN[c]) / INPUT_SCALE;
                }
            }
        }
    }

    tensor
}

/// Split the flat `[N, D]` output into `N` embeddings.
fn split_batch(values: &[f32], batch: usize) -> Result<Vec<Embedding>, FaceToolsError> {
    if batch == 0 || values.len() != batch * EMBEDDING_DIM {
        return Err(FaceToolsError::UnexpectedModelOutput(format!(
            "expected {batch}x{EMBEDDING_DIM} values, got {}",
            values.len()
        )));
    }
    Ok(values
        .chunks_exact(EMBEDDING_DIM)
        .map(|row| Embedding::new(row.to_vec()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_preprocess_batch_shape() {
        let chips = vec![Image::filled(150, 150, [0, 0, 0]); 3];
        let tensor = preprocess(&chips);
        assert_eq!(tensor.shape(), &[3, 3, 150, 150]);
    }

    #[test]
    fn test_preprocess_subtracts_channel_mean() {
        let chips = vec![Image::filled(150, 150, [122, 117, 104])];
        let tensor = preprocess(&chips);
        assert_relative_eq!(tensor[[0, 0, 10, 10]], (122.0 - 122.782) / 256.0, epsilon = 1e-6);
        assert_relative_eq!(tensor[[0, 1, 10, 10]], (117.0 - 117.001) / 256.0, epsilon = 1e-6);
        assert_relative_eq!(tensor[[0, 2, 10, 10]], (104.0 - 104.298) / 256.0, epsilon = 1e-6);
    }

    #[test]
    fn test_preprocess_keeps_batch_order() {
        let chips = vec![
            Image::filled(150, 150, [0, 0, 0]),
            Image::filled(150, 150, [255, 255, 255]),
        ];
        let tensor = preprocess(&chips);
        assert!(tensor[[0, 0, 0, 0]] < 0.0);
        assert!(tensor[[1, 0, 0, 0]] > 0.0);
    }

    #[test]
    fn test_preprocess_resizes_odd_chips() {
        let chips = vec![Image::filled(60, 60, [255, 255, 255])];
        let tensor = preprocess(&chips);
        assert_eq!(tensor.shape(), &[1, 3, 150, 150]);
        assert_relative_eq!(tensor[[0, 0, 149, 149]], (255.0 - 122.782) / 256.0, epsilon = 1e-4);
    }

    #[test]
    fn test_split_batch_rows() {
        let mut values = vec![0.0f32; 2 * EMBEDDING_DIM];
        values[EMBEDDING_DIM] = 1.0;
        let embeddings = split_batch(&values, 2).unwrap();
        assert_eq!(embeddings.len(), 2);
        assert_eq!(embeddings[0].len(), EMBEDDING_DIM);
        assert_eq!(embeddings[1].values()[0], 1.0);
    }

    #[test]
    fn test_split_batch_rejects_wrong_size() {
        assert!(matches!(
            split_batch(&[0.0; 10], 1),
            Err(FaceToolsError::UnexpectedModelOutput(_))
        ));
    }

    #[test]
    fn test_new_missing_model_is_load_error() {
        let result = OnnxFaceEmbedder::new(Path::new("/nonexistent/resnet.onnx"));
        assert!(matches!(result, Err(FaceToolsError::ModelLoad { .. })));
    }
}
