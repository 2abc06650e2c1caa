//! Resolve many funds at once with a bounded number in flight.
//!
//! Each resolution is independent; the only shared state is the read-only
//! registry and sector tables. Tasks live in a `JoinSet`, so dropping the
//! batch future aborts everything still running.

use super::Pipeline;
use crate::error::ResolveError;
use crate::models::ResolutionResult;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchRequest {
    pub ticker: Option<String>,
    pub url: Option<String>,
}

/// Resolve every request, at most `concurrency` at a time. Results come
/// back in request order.
pub async fn run_batch(
    pipeline: Arc<Pipeline>,
    requests: Vec<BatchRequest>,
    concurrency: usize,
) -> Vec<Result<ResolutionResult, ResolveError>> {
    let total = requests.len();
    let sem = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();

    for (idx, request) in requests.into_iter().enumerate() {
        let pipeline = Arc::clone(&pipeline);
        let sem = Arc::clone(&sem);

        tasks.spawn(async move {
            let outcome = match sem.acquire_owned().await {
                Ok(_permit) => {
                    pipeline
                        .resolve(request.ticker.as_deref(), request.url.as_deref())
                        .await
                }
                Err(e) => Err(ResolveError::Task(e.to_string())),
            };
            (idx, outcome)
        });
    }

    let mut slots: Vec<Option<Result<ResolutionResult, ResolveError>>> =
        (0..total).map(|_| None).collect();
    let mut completed = 0usize;

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((idx, outcome)) => {
                completed += 1;
                info!("Progress: {}/{}", completed, total);
                slots[idx] = Some(outcome);
            }
            Err(e) => error!("Resolution task panicked: {}", e),
        }
    }

    slots
        .into_iter()
        .map(|slot| slot.unwrap_or_else(|| Err(ResolveError::Task("task did not complete".into()))))
        .collect()
}
