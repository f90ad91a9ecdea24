use url::Url;

use crate::args::{PositiveU64, PositiveUsize};
use crate::error::ValidationError;

/// Upper bound on concurrent workers for one run.
pub const MAX_WORKERS: usize = 10_000;

/// Immutable parameters for one execution.
///
/// Fields are private so the only way to obtain a value is [`RunConfig::new`],
/// which rejects unusable targets. Counts are positive by type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    target_url: String,
    worker_count: PositiveUsize,
    requests_per_worker: PositiveU64,
    verbose: bool,
}

impl RunConfig {
    /// Builds a run configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the URL does not parse or is not `http`/`https`,
    /// or when more than [`MAX_WORKERS`] workers are requested.
    pub fn new(
        target_url: &str,
        worker_count: PositiveUsize,
        requests_per_worker: PositiveU64,
        verbose: bool,
    ) -> Result<Self, ValidationError> {
        if worker_count.get() > MAX_WORKERS {
            return Err(ValidationError::TooManyWorkers {
                requested: worker_count.get(),
                max: MAX_WORKERS,
            });
        }

        let trimmed = target_url.trim();
        let parsed = Url::parse(trimmed).map_err(|err| ValidationError::InvalidUrl {
            url: trimmed.to_owned(),
            source: err,
        })?;
        match parsed.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(ValidationError::UnsupportedScheme {
                    scheme: scheme.to_owned(),
                });
            }
        }

        Ok(Self {
            target_url: trimmed.to_owned(),
            worker_count,
            requests_per_worker,
            verbose,
        })
    }

    #[must_use]
    pub fn target_url(&self) -> &str {
        &self.target_url
    }

    #[must_use]
    pub const fn worker_count(&self) -> PositiveUsize {
        self.worker_count
    }

    #[must_use]
    pub const fn requests_per_worker(&self) -> PositiveU64 {
        self.requests_per_worker
    }

    #[must_use]
    pub const fn verbose(&self) -> bool {
        self.verbose
    }
}
