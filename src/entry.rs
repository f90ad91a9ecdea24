use std::ffi::OsString;
use std::num::NonZeroUsize;
use std::process::ExitCode;
use std::sync::Arc;

use clap::error::ErrorKind;
use clap::{ArgMatches, CommandFactory, FromArgMatches};
use tokio::sync::mpsc;
use tracing::error;

use crate::args::ThorArgs;
use crate::config::{self, RunConfig};
use crate::engine;
use crate::error::{AppError, AppResult};
use crate::http::ReqwestFactory;
use crate::report::{self, REPORT_CHANNEL_CAPACITY};

/// Runs the CLI and maps the outcome to a process exit status: 0 for a
/// completed run (or help/version), 1 for usage errors and fatal faults.
#[must_use]
pub fn run() -> ExitCode {
    match try_run(std::env::args_os()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_failure(&err);
            ExitCode::FAILURE
        }
    }
}

fn try_run<I>(raw_args: I) -> AppResult<()>
where
    I: IntoIterator<Item = OsString>,
{
    let Some((args, run_config)) = prepare(raw_args)? else {
        return Ok(());
    };

    crate::logger::init_logging(run_config.verbose(), args.no_color);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(runtime_threads(&run_config))
        .enable_all()
        .build()?;

    runtime.block_on(run_async(run_config))
}

/// Parses arguments and merges them with the config file. `None` means
/// help or version was printed.
fn prepare<I>(raw_args: I) -> AppResult<Option<(ThorArgs, RunConfig)>>
where
    I: IntoIterator<Item = OsString>,
{
    let Some((args, matches)) = parse_args(raw_args)? else {
        return Ok(None);
    };
    let file = config::load_config(args.config.as_deref())?;
    let run_config = config::resolve_run_config(&args, &matches, file.as_ref())?;
    Ok(Some((args, run_config)))
}

fn parse_args<I>(raw_args: I) -> AppResult<Option<(ThorArgs, ArgMatches)>>
where
    I: IntoIterator<Item = OsString>,
{
    let matches = match ThorArgs::command().try_get_matches_from(raw_args) {
        Ok(matches) => matches,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.print()?;
            return Ok(None);
        }
        Err(err) => return Err(err.into()),
    };
    let args = ThorArgs::from_arg_matches(&matches)?;

    Ok(Some((args, matches)))
}

/// One OS thread per worker, capped at the machine's parallelism.
fn runtime_threads(config: &RunConfig) -> usize {
    let available = std::thread::available_parallelism().map_or(1, NonZeroUsize::get);
    config.worker_count().get().min(available)
}

async fn run_async(config: RunConfig) -> AppResult<()> {
    let (events_tx, events_rx) = mpsc::channel(REPORT_CHANNEL_CAPACITY);
    let printer = report::spawn_printer(events_rx, std::io::stdout());

    let outcome = engine::execute(Arc::new(config), &ReqwestFactory, events_tx).await;
    let printed = printer.await?;

    let result = outcome?;
    printed?;
    tracing::debug!(
        workers = result.per_worker.len(),
        overall_ns = u64::try_from(result.overall_average.as_nanos()).unwrap_or(u64::MAX),
        "Run completed"
    );
    Ok(())
}

fn report_failure(err: &AppError) {
    match err {
        AppError::Clap { source } => {
            if source.print().is_err() {
                eprintln!("{}", source);
            }
        }
        AppError::Validation(_) | AppError::Config(_) => {
            eprintln!("error: {}", err);
            eprintln!("{}", ThorArgs::command().render_usage());
        }
        AppError::Io { .. } | AppError::Join { .. } | AppError::Http(_) => {
            error!("{}", err);
        }
    }
}
