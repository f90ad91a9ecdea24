use std::time::Duration;

use crate::engine::{RequestOutcome, WorkerResult};

/// Line printed in place of the timing line for a failed attempt.
const REQUEST_ERROR_LINE: &str = "Error in request";

#[must_use]
pub fn request_line(outcome: &RequestOutcome) -> String {
    if !outcome.succeeded {
        return REQUEST_ERROR_LINE.to_owned();
    }
    format!(
        "Process: {}, Request: {}, Elapsed Time: {:.2}",
        outcome.worker_id,
        outcome.request_index,
        outcome.elapsed.as_secs_f64()
    )
}

#[must_use]
pub fn worker_average_line(result: &WorkerResult) -> String {
    format!(
        "Process: {}, AVERAGE   , Elapsed Time: {:.2}",
        result.worker_id,
        result.average_elapsed.as_secs_f64()
    )
}

#[must_use]
pub fn total_line(overall_average: Duration) -> String {
    format!(
        "TOTAL AVERAGE ELAPSED TIME: {:.6}",
        overall_average.as_secs_f64()
    )
}
