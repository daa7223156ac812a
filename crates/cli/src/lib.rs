//! Shared start-up plumbing for the `facegrep` and `facecluster` binaries.

use std::path::Path;

use clap::error::ErrorKind;
use clap::Parser;
use facegrep_core::detection::domain::detector_kind::DetectorKind;
use facegrep_core::pipeline::facegrep_config::FacegrepConfig;
use facegrep_core::shared::error::validate_threshold;
use facegrep_core::shared::model_resolver::{self, ModelResolveError};
use thiserror::Error;

/// A bad command line. Reported together with the usage text.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct UsageError(pub String);

/// Log `warn` and above unless `RUST_LOG` says otherwise.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
}

/// Parse the process arguments into `P`.
///
/// `--help` and `--version` print and exit as clap does. Every other parse
/// failure comes back as a [`UsageError`] so it exits like any other bad
/// command line.
pub fn parse_args<P: Parser>() -> Result<P, UsageError> {
    parse_args_from(std::env::args_os())
}

pub fn parse_args_from<P, I, T>(args: I) -> Result<P, UsageError>
where
    P: Parser,
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    P::try_parse_from(args).map_err(|e| match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
        _ => UsageError(clap_message(&e)),
    })
}

/// clap's message without its `error:` prefix and trailing usage block.
fn clap_message(e: &clap::Error) -> String {
    let text = e.to_string();
    let message = text.split("\nUsage:").next().unwrap_or_default().trim();
    message.strip_prefix("error: ").unwrap_or(message).to_string()
}

/// Jitter is on unless `--no-jitter` was the last of the two flags given.
pub fn resolve_jitter(jitter: bool, no_jitter: bool) -> bool {
    jitter || !no_jitter
}

pub fn require_file(path: &Path, what: &str) -> Result<(), UsageError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(UsageError(format!("{what} not found: {}", path.display())))
    }
}

pub fn require_dir(path: &Path, what: &str) -> Result<(), UsageError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(UsageError(format!("{what} not found: {}", path.display())))
    }
}

pub fn require_threshold(threshold: f32) -> Result<f32, UsageError> {
    validate_threshold(threshold).map_err(|e| UsageError(e.to_string()))
}

/// Resolve every model for `kind` from the default search locations and
/// build a config around them.
pub fn build_config(kind: DetectorKind) -> Result<FacegrepConfig, ModelResolveError> {
    let models = model_resolver::resolve_models(kind, &model_resolver::default_search_dirs())?;
    log::info!(
        "Models: detector={} landmarks={} embedding={}",
        model_resolver::describe(&models.detector),
        model_resolver::describe(&models.landmarks),
        model_resolver::describe(&models.embedding)
    );
    Ok(FacegrepConfig {
        detector_kind: kind,
        ..FacegrepConfig::new(models)
    })
}

/// Progress on a single, rewritten stderr line.
pub fn progress_printer(label: &'static str) -> Box<dyn Fn(usize, usize) + Send + Sync> {
    Box::new(move |done: usize, total: usize| {
        eprint!("\r{label} {done}/{total}");
        if done == total {
            eprintln!();
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Parser, Debug)]
    struct Args {
        target: String,
        #[arg(short, long, default_value_t = 0.6)]
        threshold: f32,
    }

    #[test]
    fn test_parse_args_from_accepts_valid_line() {
        let args: Args = parse_args_from(["prog", "photos", "-t", "0.4"]).unwrap();
        assert_eq!(args.target, "photos");
        assert_eq!(args.threshold, 0.4);
    }

    #[test]
    fn test_missing_argument_is_usage_error() {
        let err = parse_args_from::<Args, _, _>(["prog"]).unwrap_err();
        assert!(err.0.contains("required"), "{}", err.0);
        assert!(!err.0.starts_with("error:"));
        assert!(!err.0.contains("Usage:"));
    }

    #[test]
    fn test_bad_number_is_usage_error() {
        let err =
            parse_args_from::<Args, _, _>(["prog", "photos", "-t", "strict"]).unwrap_err();
        assert!(err.0.contains("strict"), "{}", err.0);
    }

    #[rstest]
    #[case(false, false, true)]
    #[case(true, false, true)]
    #[case(false, true, false)]
    fn test_resolve_jitter(
        #[case] jitter: bool,
        #[case] no_jitter: bool,
        #[case] expected: bool,
    ) {
        assert_eq!(resolve_jitter(jitter, no_jitter), expected);
    }

    #[test]
    fn test_require_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(require_file(file.path(), "Reference").is_ok());
        let err = require_file(Path::new("/no/such/face.jpg"), "Reference").unwrap_err();
        assert_eq!(err.to_string(), "Reference not found: /no/such/face.jpg");
    }

    #[test]
    fn test_require_dir_rejects_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(require_dir(file.path(), "Search directory").is_err());
        let dir = tempfile::tempdir().unwrap();
        assert!(require_dir(dir.path(), "Search directory").is_ok());
    }

    #[test]
    fn test_require_threshold() {
        assert_eq!(require_threshold(0.4).unwrap(), 0.4);
        assert!(require_threshold(0.0).is_err());
    }
}
