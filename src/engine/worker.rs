use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::RunConfig;
use crate::http::HttpClient;
use crate::report::{EventSender, ReportEvent, emit};

use super::types::{RequestOutcome, WorkerId, WorkerResult, average};

/// Runs the configured number of sequential GET requests and returns the
/// worker's average latency.
///
/// A failed request never aborts the loop: it is reported, contributes
/// nothing to the sum, and still counts in the denominator.
pub(super) async fn run_worker<C>(
    worker_id: WorkerId,
    config: Arc<RunConfig>,
    client: C,
    events: EventSender,
) -> WorkerResult
where
    C: HttpClient,
{
    let requests = config.requests_per_worker().get();
    let keep_body = config.verbose();
    let mut total = Duration::ZERO;

    for request_index in 0..requests {
        let start = Instant::now();
        let result = client.get(config.target_url(), keep_body).await;
        let elapsed = start.elapsed();

        let outcome = match result {
            Ok(response) => {
                debug!(
                    worker = worker_id.0,
                    request = request_index,
                    status = response.status,
                    "Request completed"
                );
                total = total.saturating_add(elapsed);
                let body = if keep_body { response.body } else { None };
                RequestOutcome::success(worker_id, request_index, elapsed, body)
            }
            Err(err) => {
                warn!(
                    worker = worker_id.0,
                    request = request_index,
                    "{}",
                    err
                );
                RequestOutcome::failure(worker_id, request_index)
            }
        };
        emit(&events, ReportEvent::Request(outcome)).await;
    }

    let result = WorkerResult {
        worker_id,
        average_elapsed: average(total, requests),
    };
    emit(&events, ReportEvent::WorkerAverage(result)).await;
    result
}
