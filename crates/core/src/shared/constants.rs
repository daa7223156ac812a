pub const FAST_DETECTOR_MODEL_NAME: &str = "seeta_fd_frontal_v1.0.bin";
pub const ACCURATE_DETECTOR_MODEL_NAME: &str = "yolo11n-pose_widerface.onnx";
pub const LANDMARK_MODEL_NAME: &str = "face_landmarks_68.onnx";
pub const EMBEDDING_MODEL_NAME: &str = "dlib_face_recognition_resnet_model_v1.onnx";

/// System-wide model directory, searched after the working directory.
pub const SYSTEM_MODEL_DIR: &str = "/usr/local/share/facegrep/models";

/// Default distance threshold for "same person" decisions.
pub const DEFAULT_THRESHOLD: f32 = 0.6;

/// Side length of an aligned face chip.
pub const FACE_CHIP_SIZE: u32 = 150;
/// Margin around the landmark envelope when cutting a face chip.
pub const FACE_CHIP_PADDING: f64 = 0.25;

/// Length of a face embedding vector.
pub const EMBEDDING_DIM: usize = 128;

pub const IMAGE_SEARCH_FILTER: &[&str] = &["*.jpg", "*.jpeg", "*.gif", "*.png"];
