pub mod detector_factory;
pub mod execution_provider;
pub mod math;
pub mod onnx_landmark_predictor;
pub mod onnx_yolo_detector;
pub mod rustface_detector;
