use std::io::Write;

use tokio::task::JoinHandle;

use crate::error::AppResult;

use super::lines::{request_line, total_line, worker_average_line};
use super::{EventReceiver, ReportEvent};

/// Spawns the printer on the blocking pool. It writes and flushes every
/// event as it arrives and hands the writer back once all senders are gone.
pub fn spawn_printer<W>(mut events: EventReceiver, mut out: W) -> JoinHandle<AppResult<W>>
where
    W: Write + Send + 'static,
{
    tokio::task::spawn_blocking(move || -> AppResult<W> {
        while let Some(event) = events.blocking_recv() {
            write_event(&mut out, &event)?;
        }
        Ok(out)
    })
}

fn write_event<W: Write>(out: &mut W, event: &ReportEvent) -> std::io::Result<()> {
    match event {
        ReportEvent::Request(outcome) => {
            if let Some(body) = outcome.body.as_deref() {
                writeln!(out, "{}", body)?;
            }
            writeln!(out, "{}", request_line(outcome))?;
        }
        ReportEvent::WorkerAverage(result) => {
            writeln!(out, "{}", worker_average_line(result))?;
        }
        ReportEvent::Total(overall_average) => {
            writeln!(out, "{}", total_line(*overall_average))?;
        }
    }
    out.flush()
}
