use std::path::{Path, PathBuf};

/// What happened to one candidate image during a search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CandidateOutcome {
    Match,
    NoMatch,
    /// The image could not be decoded; the search carries on without it.
    Skipped(String),
    /// Detection or embedding failed; the search as a whole fails.
    Failed(String),
}

/// Progress callback: `(candidates_done, candidates_total)`.
pub type ProgressFn<'a> = dyn Fn(usize, usize) + Send + Sync + 'a;

/// Per-candidate evaluation handed to an executor.
pub type EvaluateFn<'a> = dyn Fn(&Path) -> CandidateOutcome + Sync + 'a;

/// Abstracts how candidate images are fanned out during a search.
///
/// This is a port (application-layer interface). Infrastructure provides
/// the threaded implementation; [`SequentialSearchExecutor`] is the default.
/// Outcomes may come back in any order.
pub trait SearchExecutor: Send + Sync {
    fn execute(
        &self,
        candidates: &[PathBuf],
        evaluate: &EvaluateFn<'_>,
        on_progress: Option<&ProgressFn<'_>>,
    ) -> Vec<(PathBuf, CandidateOutcome)>;
}

/// Evaluates candidates one after another on the calling thread.
pub struct SequentialSearchExecutor;

impl SearchExecutor for SequentialSearchExecutor {
    fn execute(
        &self,
        candidates: &[PathBuf],
        evaluate: &EvaluateFn<'_>,
        on_progress: Option<&ProgressFn<'_>>,
    ) -> Vec<(PathBuf, CandidateOutcome)> {
        let total = candidates.len();
        candidates
            .iter()
            .enumerate()
            .map(|(i, path)| {
                let outcome = evaluate(path);
                if let Some(cb) = on_progress {
                    cb(i + 1, total);
                }
                (path.clone(), outcome)
            })
            .collect()
    }
}
