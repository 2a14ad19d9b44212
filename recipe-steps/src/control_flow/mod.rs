//! ABOUTME: Control-flow step handlers, special-cased inside the Executor
//! ABOUTME: Each takes an &Executor so it can recurse into nested step lists

pub(crate) mod conditional;
pub(crate) mod execute_recipe;
pub(crate) mod loop_step;
pub(crate) mod parallel;

use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Run `tasks` with at most `max_concurrency` in flight at once, preserving
/// input order in the returned `Vec` regardless of completion order.
/// `max_concurrency == 0` means unlimited.
pub(crate) async fn run_bounded<T, F>(tasks: Vec<F>, max_concurrency: usize) -> Vec<T>
where
    T: Send + 'static,
    F: Future<Output = T> + Send + 'static,
{
    if max_concurrency == 1 {
        let mut out = Vec::with_capacity(tasks.len());
        for task in tasks {
            out.push(task.await);
        }
        return out;
    }

    let semaphore = (max_concurrency > 0).then(|| Arc::new(Semaphore::new(max_concurrency)));
    let mut set = JoinSet::new();
    for (index, task) in tasks.into_iter().enumerate() {
        let permit_guard = match &semaphore {
            Some(sem) => Some(sem.clone().acquire_owned().await.expect("semaphore not closed")),
            None => None,
        };
        set.spawn(async move {
            let result = task.await;
            drop(permit_guard);
            (index, result)
        });
    }

    let mut indexed = Vec::with_capacity(set.len());
    while let Some(joined) = set.join_next().await {
        indexed.push(joined.expect("control-flow subtask panicked"));
    }
    indexed.sort_by_key(|(index, _)| *index);
    indexed.into_iter().map(|(_, result)| result).collect()
}
