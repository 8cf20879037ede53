//! Bounded worker pool for per-page stage invocations.
//!
//! A thin wrapper over `buffer_unordered`: items are dispatched greedily up
//! to the concurrency ceiling, and the outcome vector is scattered back
//! into submission order so "page N's outcome" is deterministic even though
//! completion timing is not.
//!
//! Every worker runs in its own spawned task. A worker that panics is
//! captured as a failed [`StageOutcome`] for that page alone; siblings are
//! never cancelled or skipped.

use crate::output::StageOutcome;
use futures::stream::{self, StreamExt};
use std::future::Future;

/// Run `worker` once for every page, at most `max_concurrency` at a time.
///
/// The returned vector has the same length and index order as `pages`.
/// `max_concurrency` values below 1 are treated as 1 (fully sequential,
/// deterministic order); values above the item count simply mean every
/// page runs at once.
pub async fn run_all<F, Fut>(pages: &[u32], max_concurrency: usize, worker: F) -> Vec<StageOutcome>
where
    F: Fn(u32) -> Fut,
    Fut: Future<Output = StageOutcome> + Send + 'static,
{
    let limit = max_concurrency.max(1);

    // Placeholder outcomes; every index is overwritten below because each
    // submitted page yields exactly one (index, outcome) pair.
    let mut outcomes: Vec<StageOutcome> = pages
        .iter()
        .map(|&p| StageOutcome::failed(p, "not attempted"))
        .collect();

    let completed: Vec<(usize, StageOutcome)> =
        stream::iter(pages.iter().copied().enumerate().map(|(idx, page)| {
            let fut = worker(page);
            async move {
                let outcome = match tokio::spawn(fut).await {
                    Ok(outcome) => outcome,
                    // JoinError: the worker panicked (or was aborted). Fold
                    // it into a per-page failure instead of tearing down
                    // the batch.
                    Err(e) => StageOutcome::failed(page, format!("worker task failed: {e}")),
                };
                (idx, outcome)
            }
        }))
        .buffer_unordered(limit)
        .collect()
        .await;

    for (idx, outcome) in completed {
        outcomes[idx] = outcome;
    }

    outcomes
}
