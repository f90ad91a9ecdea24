use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{PositiveU64, PositiveUsize, ThorArgs};
use crate::error::{AppError, AppResult, ConfigError, ValidationError};

use super::run::RunConfig;
use super::types::ConfigFile;

/// Merges CLI arguments with an optional config file into a [`RunConfig`].
///
/// Values set on the command line or through the environment win over the
/// config file; the file wins over built-in defaults.
///
/// # Errors
///
/// Returns an error when no URL is available, a config count is zero, or
/// the URL is unusable.
pub fn resolve_run_config(
    args: &ThorArgs,
    matches: &ArgMatches,
    config: Option<&ConfigFile>,
) -> AppResult<RunConfig> {
    let empty = ConfigFile::default();
    let config = config.unwrap_or(&empty);

    let url = match (args.target_url(), config.url.as_deref()) {
        (Some(url), _) | (None, Some(url)) => url,
        (None, None) => return Err(AppError::validation(ValidationError::MissingUrl)),
    };

    let mut worker_count = args.processes;
    if !is_explicit(matches, "processes")
        && let Some(processes) = config.processes
    {
        worker_count = ensure_positive_usize(processes, "processes")?;
    }

    let mut requests_per_worker = args.requests;
    if !is_explicit(matches, "requests")
        && let Some(requests) = config.requests
    {
        requests_per_worker = ensure_positive_u64(requests, "requests")?;
    }

    let verbose = args.verbose || config.verbose.unwrap_or(false);

    RunConfig::new(url, worker_count, requests_per_worker, verbose).map_err(AppError::from)
}

fn is_explicit(matches: &ArgMatches, name: &str) -> bool {
    matches!(
        matches.value_source(name),
        Some(ValueSource::CommandLine | ValueSource::EnvVariable)
    )
}

fn ensure_positive_u64(value: u64, field: &'static str) -> AppResult<PositiveU64> {
    PositiveU64::try_from(value)
        .map_err(|err| AppError::config(ConfigError::FieldMustBePositive { field, source: err }))
}

fn ensure_positive_usize(value: usize, field: &'static str) -> AppResult<PositiveUsize> {
    PositiveUsize::try_from(value)
        .map_err(|err| AppError::config(ConfigError::FieldMustBePositive { field, source: err }))
}
