pub mod detector_kind;
pub mod face;
pub mod face_aligner;
pub mod face_detector;
pub mod face_extractor;
pub mod face_landmarks;
pub mod image_scaler;
pub mod landmark_predictor;
