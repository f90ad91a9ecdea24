use std::fmt;
use std::time::Duration;

/// Index of a worker in `0..worker_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkerId(pub usize);

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Observed result of one GET attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOutcome {
    pub worker_id: WorkerId,
    pub request_index: u64,
    /// Zero for failed attempts.
    pub elapsed: Duration,
    pub succeeded: bool,
    /// Set only for successful requests in verbose mode.
    pub body: Option<String>,
}

impl RequestOutcome {
    pub(super) const fn success(
        worker_id: WorkerId,
        request_index: u64,
        elapsed: Duration,
        body: Option<String>,
    ) -> Self {
        Self {
            worker_id,
            request_index,
            elapsed,
            succeeded: true,
            body,
        }
    }

    pub(super) const fn failure(worker_id: WorkerId, request_index: u64) -> Self {
        Self {
            worker_id,
            request_index,
            elapsed: Duration::ZERO,
            succeeded: false,
            body: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerResult {
    pub worker_id: WorkerId,
    pub average_elapsed: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    /// Ordered by worker id.
    pub per_worker: Vec<WorkerResult>,
    pub overall_average: Duration,
}

/// Mean of `total` over `count` samples, truncated to whole nanoseconds.
pub(super) fn average(total: Duration, count: u64) -> Duration {
    let nanos = total
        .as_nanos()
        .checked_div(u128::from(count))
        .unwrap_or_default();
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}
