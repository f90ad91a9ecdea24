//! Run reporting: the fixed output line formats and the printer task that
//! writes events as soon as they arrive.
mod lines;
mod printer;


use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use crate::engine::{RequestOutcome, WorkerResult};

pub use lines::{request_line, total_line, worker_average_line};
pub use printer::spawn_printer;

/// Capacity of the event channel between workers and the printer.
pub const REPORT_CHANNEL_CAPACITY: usize = 1_024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEvent {
    Request(RequestOutcome),
    WorkerAverage(WorkerResult),
    Total(Duration),
}

pub type EventSender = mpsc::Sender<ReportEvent>;
pub type EventReceiver = mpsc::Receiver<ReportEvent>;

/// Sends an event, dropping it when the printer is gone.
pub(crate) async fn emit(events: &EventSender, event: ReportEvent) {
    if events.send(event).await.is_err() {
        debug!("Report channel closed; dropping event.");
    }
}
