//! Concurrent fan-out with a join barrier
//!
//! Used by the emergency shutdown: one job per environment, all started at
//! once, and the caller gets every result back only after the last job has
//! finished. A panicking job is reported as a failure of that job alone.

use futures_util::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tokio::task::JoinSet;
use tracing::{debug, error};

/// Result of one job, in submission order
#[derive(Debug)]
pub struct JobResult<T> {
    pub label: String,
    pub outcome: Result<T, String>,
}

impl<T> JobResult<T> {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Run every job concurrently and wait for all of them
pub async fn run_all<T, F>(jobs: Vec<(String, F)>) -> Vec<JobResult<T>>
where
    T: Send + 'static,
    F: Future<Output = T> + Send + 'static,
{
    let mut labels = Vec::with_capacity(jobs.len());
    let mut tasks = JoinSet::new();

    for (index, (label, job)) in jobs.into_iter().enumerate() {
        debug!(job = %label, "Starting job");
        labels.push(label);
        tasks.spawn(async move { (index, AssertUnwindSafe(job).catch_unwind().await) });
    }

    let mut outcomes: Vec<Option<Result<T, String>>> = labels.iter().map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, Ok(value))) => outcomes[index] = Some(Ok(value)),
            Ok((index, Err(panic))) => {
                let message = panic_message(panic.as_ref());
                error!(job = %labels[index], %message, "Job panicked");
                outcomes[index] = Some(Err(format!("panicked: {}", message)));
            }
            // Only reachable if the runtime cancels the task
            Err(e) => error!(error = %e, "Job was cancelled"),
        }
    }

    labels
        .into_iter()
        .zip(outcomes)
        .map(|(label, outcome)| JobResult {
            label,
            outcome: outcome.unwrap_or_else(|| Err("cancelled".to_string())),
        })
        .collect()
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
