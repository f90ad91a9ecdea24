//! Concurrent request-execution engine: per-worker request loops and the
//! coordinator that fans them out and reduces their results.
mod coordinator;
mod types;
mod worker;

#[cfg(test)]
mod tests;

pub use coordinator::execute;
pub use types::{RequestOutcome, RunResult, WorkerId, WorkerResult};
