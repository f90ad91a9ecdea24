use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{error, info};

use crate::config::RunConfig;
use crate::error::{AppError, AppResult};
use crate::http::ClientFactory;
use crate::report::{EventSender, ReportEvent, emit};

use super::types::{RunResult, WorkerId, WorkerResult, average};
use super::worker::run_worker;

/// Fans out `worker_count` workers, waits for all of them, and reduces
/// their averages into the overall average.
///
/// Every client is built before the first worker starts, so a construction
/// failure launches nothing.
///
/// # Errors
///
/// Returns an error when a client cannot be built or a worker task fails
/// outside its per-request containment (e.g. panics). Remaining workers are
/// aborted in that case.
pub async fn execute<F>(
    config: Arc<RunConfig>,
    factory: &F,
    events: EventSender,
) -> AppResult<RunResult>
where
    F: ClientFactory,
{
    let worker_count = config.worker_count().get();
    let clients = (0..worker_count)
        .map(|_| factory.build())
        .collect::<AppResult<Vec<_>>>()?;

    info!(
        url = config.target_url(),
        workers = worker_count,
        requests = config.requests_per_worker().get(),
        "Starting run"
    );

    let mut workers = JoinSet::new();
    for (index, client) in clients.into_iter().enumerate() {
        workers.spawn(run_worker(
            WorkerId(index),
            Arc::clone(&config),
            client,
            events.clone(),
        ));
    }

    let mut per_worker: Vec<WorkerResult> = Vec::new();
    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok(result) => per_worker.push(result),
            Err(err) => {
                error!("Worker aborted the run: {}", err);
                workers.abort_all();
                return Err(AppError::from(err));
            }
        }
    }
    per_worker.sort_by_key(|result| result.worker_id);

    let total = per_worker
        .iter()
        .fold(Duration::ZERO, |sum, result| {
            sum.saturating_add(result.average_elapsed)
        });
    let overall_average = average(total, u64::try_from(worker_count).unwrap_or(u64::MAX));

    emit(&events, ReportEvent::Total(overall_average)).await;

    Ok(RunResult {
        per_worker,
        overall_average,
    })
}
