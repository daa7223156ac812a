use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::pipeline::search_executor::{CandidateOutcome, EvaluateFn, ProgressFn, SearchExecutor};

/// Evaluates candidates on a fixed pool of scoped worker threads.
///
/// Layout: `feeder → [workers] → collector`. Workers pull paths from a
/// shared job channel and push outcomes to a result channel; nothing is
/// appended to shared state from inside a worker.
pub struct ThreadedSearchExecutor {
    workers: usize,
}

impl ThreadedSearchExecutor {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }
}

impl SearchExecutor for ThreadedSearchExecutor {
    fn execute(
        &self,
        candidates: &[PathBuf],
        evaluate: &EvaluateFn<'_>,
        on_progress: Option<&ProgressFn<'_>>,
    ) -> Vec<(PathBuf, CandidateOutcome)> {
        let total = candidates.len();
        let (job_tx, job_rx) = crossbeam_channel::unbounded::<&PathBuf>();
        let (result_tx, result_rx) = crossbeam_channel::unbounded::<(PathBuf, CandidateOutcome)>();
        for path in candidates {
            // Receiver is alive for the whole scope below.
            let _ = job_tx.send(path);
        }
        drop(job_tx);

        let done = AtomicUsize::new(0);
        std::thread::scope(|scope| {
            for _ in 0..self.workers.min(total.max(1)) {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                let done = &done;
                scope.spawn(move || {
                    for path in job_rx {
                        let outcome = evaluate(path);
                        let finished = done.fetch_add(1, Ordering::SeqCst) + 1;
                        if let Some(cb) = on_progress {
                            cb(finished, total);
                        }
                        if result_tx.send((path.clone(), outcome)).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(result_tx);
            result_rx.iter().collect()
        })
    }
}
