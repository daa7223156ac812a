use std::path::Path;

use crate::shared::error::FaceToolsError;

/// Return the preferred ONNX execution providers for the current platform.
///
/// Falls back to CPU if the platform-specific provider is unavailable.
pub fn preferred_execution_providers() -> Vec<ort::execution_providers::ExecutionProviderDispatch> {
    #[cfg(target_os = "macos")]
    {
        vec![ort::execution_providers::CoreMLExecutionProvider::default().build()]
    }
    #[cfg(target_os = "windows")]
    {
        vec![ort::execution_providers::DirectMLExecutionProvider::default().build()]
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        vec![]
    }
}

/// Build an inference session for `model_path`.
///
/// Any failure, including a missing file, is reported as
/// [`FaceToolsError::ModelLoad`] naming the file.
pub fn load_session(model_path: &Path) -> Result<ort::session::Session, FaceToolsError> {
    let session =
        build_session(model_path).map_err(|e| FaceToolsError::model_load(model_path, e))?;
    log::info!("Loaded model {}", model_path.display());
    Ok(session)
}

fn build_session(model_path: &Path) -> Result<ort::session::Session, Box<dyn std::error::Error>> {
    if !model_path.is_file() {
        return Err("file not found".into());
    }
    let intra_threads = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    let providers = preferred_execution_providers();
    if providers.is_empty() {
        log::info!("No accelerated execution provider, {} runs on CPU", model_path.display());
    }
    let session = ort::session::Session::builder()?
        .with_optimization_level(ort::session::builder::GraphOptimizationLevel::Level3)?
        .with_intra_threads(intra_threads)?
        .with_execution_providers(providers)?
        .commit_from_file(model_path)?;
    Ok(session)
}

/// Fail with [`FaceToolsError::UnexpectedModelOutput`] when a `model` run
/// returned no output tensors.
pub fn require_outputs(count: usize, model: &str) -> Result<(), FaceToolsError> {
    if count == 0 {
        return Err(FaceToolsError::UnexpectedModelOutput(format!(
            "{model} model produced no outputs"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_session_missing_file_names_path() {
        let path = Path::new("/nonexistent/model.onnx");
        match load_session(path) {
            Err(FaceToolsError::ModelLoad { path: p, .. }) => assert_eq!(p, path),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected failure"),
        }
    }

    #[test]
    fn test_require_outputs_rejects_empty_run() {
        match require_outputs(0, "landmark") {
            Err(FaceToolsError::UnexpectedModelOutput(msg)) => {
                assert_eq!(msg, "landmark model produced no outputs")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_require_outputs_accepts_any_output() {
        assert!(require_outputs(1, "embedding").is_ok());
        assert!(require_outputs(3, "YOLO").is_ok());
    }
}
