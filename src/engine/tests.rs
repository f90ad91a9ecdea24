use super::*;
use crate::args::{PositiveU64, PositiveUsize};
use crate::config::RunConfig;
use crate::error::{AppError, AppResult, RequestError};
use crate::http::{ClientFactory, HttpClient, HttpResponse};
use crate::report::{ReportEvent, REPORT_CHANNEL_CAPACITY};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

const STUB_BODY: &str = "<html>ok</html>";

#[derive(Debug, Clone, Copy)]
enum Step {
    Ok(u64),
    Fail(u64),
    Panic,
}

#[derive(Debug, Default)]
struct Counters {
    calls: AtomicUsize,
    builds: AtomicUsize,
    max_in_flight: AtomicUsize,
}

struct ScriptedClient {
    script: Vec<Step>,
    cursor: AtomicUsize,
    in_flight: AtomicUsize,
    counters: Arc<Counters>,
}

impl ScriptedClient {
    fn next_step(&self) -> Step {
        let call = self.cursor.fetch_add(1, Ordering::SeqCst);
        let len = self.script.len().max(1);
        call.checked_rem(len)
            .and_then(|index| self.script.get(index).copied())
            .unwrap_or(Step::Ok(0))
    }
}

#[async_trait]
impl HttpClient for ScriptedClient {
    async fn get(&self, _url: &str, keep_body: bool) -> Result<HttpResponse, RequestError> {
        self.counters.calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst).saturating_add(1);
        self.counters
            .max_in_flight
            .fetch_max(current, Ordering::SeqCst);

        let step = self.next_step();
        let result = match step {
            Step::Ok(ms) => {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                Ok(HttpResponse {
                    status: 200,
                    body: keep_body.then(|| STUB_BODY.to_owned()),
                })
            }
            Step::Fail(ms) => {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                Err(RequestError::send(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "connection refused",
                )))
            }
            #[expect(clippy::panic, reason = "simulates a fault outside request containment")]
            Step::Panic => panic!("worker fault"),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Hands script `n` to the `n`-th client it builds.
struct ScriptedFactory {
    scripts: Vec<Vec<Step>>,
    counters: Arc<Counters>,
    fail_build: bool,
}

impl ScriptedFactory {
    fn new(scripts: Vec<Vec<Step>>) -> Self {
        Self {
            scripts,
            counters: Arc::new(Counters::default()),
            fail_build: false,
        }
    }

    fn calls(&self) -> usize {
        self.counters.calls.load(Ordering::SeqCst)
    }
}

impl ClientFactory for ScriptedFactory {
    type Client = ScriptedClient;

    fn build(&self) -> AppResult<Self::Client> {
        if self.fail_build {
            return Err(AppError::from(std::io::Error::other("client unavailable")));
        }
        let index = self.counters.builds.fetch_add(1, Ordering::SeqCst);
        Ok(ScriptedClient {
            script: self.scripts.get(index).cloned().unwrap_or_default(),
            cursor: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            counters: Arc::clone(&self.counters),
        })
    }
}

fn run_config(workers: usize, requests: u64, verbose: bool) -> Result<Arc<RunConfig>, String> {
    let workers = PositiveUsize::try_from(workers).map_err(|err| err.to_string())?;
    let requests = PositiveU64::try_from(requests).map_err(|err| err.to_string())?;
    RunConfig::new("http://localhost:8080/", workers, requests, verbose)
        .map(Arc::new)
        .map_err(|err| err.to_string())
}

fn run_paused<F, T>(future: F) -> Result<T, String>
where
    F: Future<Output = Result<T, String>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(future)
}

async fn execute_collect(
    config: Arc<RunConfig>,
    factory: &ScriptedFactory,
) -> Result<(AppResult<RunResult>, Vec<ReportEvent>), String> {
    let (events_tx, mut events_rx) = mpsc::channel(REPORT_CHANNEL_CAPACITY);
    let collector = tokio::spawn(async move {
        let mut events = Vec::new();
        while let Some(event) = events_rx.recv().await {
            events.push(event);
        }
        events
    });
    let result = execute(config, factory, events_tx).await;
    let events = collector
        .await
        .map_err(|err| format!("collector failed: {}", err))?;
    Ok((result, events))
}

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

#[test]
fn launches_every_worker_and_every_request() -> Result<(), String> {
    run_paused(async {
        let factory = ScriptedFactory::new(vec![vec![Step::Ok(5)]; 3]);
        let (result, events) = execute_collect(run_config(3, 4, false)?, &factory).await?;
        let result = result.map_err(|err| err.to_string())?;

        if factory.counters.builds.load(Ordering::SeqCst) != 3 {
            return Err("Expected one client per worker".to_owned());
        }
        if factory.calls() != 12 {
            return Err(format!("Expected 12 requests, got {}", factory.calls()));
        }
        let ids: Vec<usize> = result.per_worker.iter().map(|r| r.worker_id.0).collect();
        if ids != vec![0, 1, 2] {
            return Err(format!("Unexpected worker ids: {:?}", ids));
        }
        let request_events = events
            .iter()
            .filter(|event| matches!(event, ReportEvent::Request(_)))
            .count();
        if request_events != 12 {
            return Err(format!("Expected 12 request events, got {}", request_events));
        }
        Ok(())
    })
}

#[test]
fn requests_within_a_worker_are_sequential() -> Result<(), String> {
    run_paused(async {
        let factory = ScriptedFactory::new(vec![vec![Step::Ok(10), Step::Ok(20)]; 2]);
        let (result, events) = execute_collect(run_config(2, 5, false)?, &factory).await?;
        result.map_err(|err| err.to_string())?;

        if factory.counters.max_in_flight.load(Ordering::SeqCst) != 1 {
            return Err("Expected at most one in-flight request per worker".to_owned());
        }
        for worker in 0..2 {
            let indices: Vec<u64> = events
                .iter()
                .filter_map(|event| match event {
                    ReportEvent::Request(outcome) if outcome.worker_id.0 == worker => {
                        Some(outcome.request_index)
                    }
                    ReportEvent::Request(_)
                    | ReportEvent::WorkerAverage(_)
                    | ReportEvent::Total(_) => None,
                })
                .collect();
            if indices != vec![0, 1, 2, 3, 4] {
                return Err(format!("Worker {} out of order: {:?}", worker, indices));
            }
        }
        Ok(())
    })
}

#[test]
fn single_worker_average_is_mean_of_latencies() -> Result<(), String> {
    run_paused(async {
        let factory = ScriptedFactory::new(vec![vec![Step::Ok(100), Step::Ok(200), Step::Ok(300)]]);
        let (result, _) = execute_collect(run_config(1, 3, false)?, &factory).await?;
        let result = result.map_err(|err| err.to_string())?;

        let worker = result
            .per_worker
            .first()
            .ok_or_else(|| "Missing worker result".to_owned())?;
        if worker.average_elapsed != ms(200) {
            return Err(format!("Unexpected worker average: {:?}", worker.average_elapsed));
        }
        if result.overall_average != ms(200) {
            return Err(format!("Unexpected overall average: {:?}", result.overall_average));
        }
        Ok(())
    })
}

#[test]
fn overall_average_is_mean_of_worker_averages() -> Result<(), String> {
    run_paused(async {
        let factory = ScriptedFactory::new(vec![
            vec![Step::Ok(100), Step::Ok(100)],
            vec![Step::Ok(300), Step::Ok(300)],
        ]);
        let (result, _) = execute_collect(run_config(2, 2, false)?, &factory).await?;
        let result = result.map_err(|err| err.to_string())?;

        let averages: Vec<Duration> = result
            .per_worker
            .iter()
            .map(|worker| worker.average_elapsed)
            .collect();
        if averages != vec![ms(100), ms(300)] {
            return Err(format!("Unexpected worker averages: {:?}", averages));
        }
        if result.overall_average != ms(200) {
            return Err(format!("Unexpected overall average: {:?}", result.overall_average));
        }
        Ok(())
    })
}

#[test]
fn results_are_ordered_by_worker_id_not_completion() -> Result<(), String> {
    run_paused(async {
        let factory = ScriptedFactory::new(vec![
            vec![Step::Ok(500)],
            vec![Step::Ok(10)],
            vec![Step::Ok(100)],
        ]);
        let (result, events) = execute_collect(run_config(3, 1, false)?, &factory).await?;
        let result = result.map_err(|err| err.to_string())?;

        let completion: Vec<usize> = events
            .iter()
            .filter_map(|event| match event {
                ReportEvent::WorkerAverage(worker) => Some(worker.worker_id.0),
                ReportEvent::Request(_) | ReportEvent::Total(_) => None,
            })
            .collect();
        if completion != vec![1, 2, 0] {
            return Err(format!("Unexpected completion order: {:?}", completion));
        }
        let ids: Vec<usize> = result.per_worker.iter().map(|r| r.worker_id.0).collect();
        if ids != vec![0, 1, 2] {
            return Err(format!("Unexpected result order: {:?}", ids));
        }
        Ok(())
    })
}

#[test]
fn failed_request_counts_in_denominator() -> Result<(), String> {
    run_paused(async {
        let factory = ScriptedFactory::new(vec![vec![Step::Ok(400), Step::Fail(50)]]);
        let (result, events) = execute_collect(run_config(1, 2, false)?, &factory).await?;
        let result = result.map_err(|err| err.to_string())?;

        if result.overall_average != ms(200) {
            return Err(format!("Unexpected average: {:?}", result.overall_average));
        }
        let failed = events.iter().any(|event| {
            matches!(event, ReportEvent::Request(outcome)
                if !outcome.succeeded
                    && outcome.elapsed == Duration::ZERO
                    && outcome.request_index == 1)
        });
        if !failed {
            return Err("Expected a zero-elapsed failure outcome for request 1".to_owned());
        }
        Ok(())
    })
}

#[test]
fn all_failures_still_complete_with_zero_average() -> Result<(), String> {
    run_paused(async {
        let factory = ScriptedFactory::new(vec![vec![Step::Fail(30)], vec![Step::Ok(100)]]);
        let (result, events) = execute_collect(run_config(2, 3, false)?, &factory).await?;
        let result = result.map_err(|err| err.to_string())?;

        let first = result
            .per_worker
            .first()
            .ok_or_else(|| "Missing worker 0".to_owned())?;
        if first.average_elapsed != Duration::ZERO {
            return Err(format!("Expected zero average, got {:?}", first.average_elapsed));
        }
        if result.overall_average != ms(50) {
            return Err(format!("Unexpected overall average: {:?}", result.overall_average));
        }
        if factory.calls() != 6 {
            return Err(format!("Expected 6 attempts, got {}", factory.calls()));
        }
        if !matches!(events.last(), Some(ReportEvent::Total(total)) if *total == ms(50)) {
            return Err("Expected total event last".to_owned());
        }
        Ok(())
    })
}

#[test]
fn identical_configs_produce_identical_results() -> Result<(), String> {
    run_paused(async {
        let scripts = vec![
            vec![Step::Ok(120), Step::Fail(10), Step::Ok(80)],
            vec![Step::Ok(40)],
        ];
        let config = run_config(2, 3, false)?;
        let first_factory = ScriptedFactory::new(scripts.clone());
        let (first, _) = execute_collect(Arc::clone(&config), &first_factory).await?;
        let second_factory = ScriptedFactory::new(scripts);
        let (second, _) = execute_collect(config, &second_factory).await?;

        let first = first.map_err(|err| err.to_string())?;
        let second = second.map_err(|err| err.to_string())?;
        if first != second {
            return Err(format!("Results differ: {:?} vs {:?}", first, second));
        }
        Ok(())
    })
}

#[test]
fn one_by_one_emits_three_events() -> Result<(), String> {
    run_paused(async {
        let factory = ScriptedFactory::new(vec![vec![Step::Ok(250)]]);
        let (result, events) = execute_collect(run_config(1, 1, false)?, &factory).await?;
        result.map_err(|err| err.to_string())?;

        match events.as_slice() {
            [
                ReportEvent::Request(outcome),
                ReportEvent::WorkerAverage(worker),
                ReportEvent::Total(total),
            ] => {
                if outcome.elapsed != ms(250) || !outcome.succeeded {
                    return Err(format!("Unexpected outcome: {:?}", outcome));
                }
                if worker.average_elapsed != ms(250) || *total != ms(250) {
                    return Err("Unexpected averages".to_owned());
                }
                Ok(())
            }
            other => Err(format!("Unexpected events: {:?}", other)),
        }
    })
}

#[test]
fn body_is_kept_only_in_verbose_mode() -> Result<(), String> {
    run_paused(async {
        for verbose in [false, true] {
            let factory = ScriptedFactory::new(vec![vec![Step::Ok(10), Step::Fail(10)]]);
            let (result, events) = execute_collect(run_config(1, 2, verbose)?, &factory).await?;
            result.map_err(|err| err.to_string())?;

            let bodies: Vec<Option<&str>> = events
                .iter()
                .filter_map(|event| match event {
                    ReportEvent::Request(outcome) => Some(outcome.body.as_deref()),
                    ReportEvent::WorkerAverage(_) | ReportEvent::Total(_) => None,
                })
                .collect();
            let expected = if verbose {
                vec![Some(STUB_BODY), None]
            } else {
                vec![None, None]
            };
            if bodies != expected {
                return Err(format!("verbose={} bodies: {:?}", verbose, bodies));
            }
        }
        Ok(())
    })
}

#[test]
fn client_build_failure_launches_nothing() -> Result<(), String> {
    run_paused(async {
        let mut factory = ScriptedFactory::new(vec![vec![Step::Ok(10)]]);
        factory.fail_build = true;
        let (result, events) = execute_collect(run_config(2, 2, false)?, &factory).await?;

        if !matches!(result, Err(AppError::Io { .. })) {
            return Err(format!("Expected build failure, got {:?}", result.map(|_| ())));
        }
        if factory.calls() != 0 || !events.is_empty() {
            return Err("Expected no requests and no events".to_owned());
        }
        Ok(())
    })
}

#[test]
fn worker_fault_is_fatal() -> Result<(), String> {
    run_paused(async {
        let factory = ScriptedFactory::new(vec![vec![Step::Ok(1_000)], vec![Step::Panic]]);
        let (result, events) = execute_collect(run_config(2, 3, false)?, &factory).await?;

        if !matches!(result, Err(AppError::Join { .. })) {
            return Err(format!("Expected join failure, got {:?}", result.map(|_| ())));
        }
        if events.iter().any(|event| matches!(event, ReportEvent::Total(_))) {
            return Err("Expected no total after a fatal fault".to_owned());
        }
        Ok(())
    })
}

#[test]
fn average_truncates_to_nanoseconds() -> Result<(), String> {
    let mean = types::average(Duration::from_nanos(10), 3);
    if mean != Duration::from_nanos(3) {
        return Err(format!("Unexpected mean: {:?}", mean));
    }
    Ok(())
}
