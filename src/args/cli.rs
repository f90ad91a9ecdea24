use clap::Parser;

use super::parsers::{parse_positive_u64, parse_positive_usize};
use super::types::{PositiveU64, PositiveUsize};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Minimal HTTP load generator - fan out concurrent workers, time sequential GET requests, and report per-request and aggregate latency.",
    override_usage = "thor [-p PROCESSES -r REQUESTS -v] URL"
)]
pub struct ThorArgs {
    /// Target URL; when given more than once the last one wins
    #[arg(value_name = "URL")]
    pub urls: Vec<String>,

    /// Number of processes (concurrent workers) to utilize
    #[arg(
        long,
        short = 'p',
        value_name = "PROCESSES",
        default_value = "1",
        env = "THOR_PROCESSES",
        value_parser = parse_positive_usize
    )]
    pub processes: PositiveUsize,

    /// Number of requests per process
    #[arg(
        long,
        short = 'r',
        value_name = "REQUESTS",
        default_value = "1",
        env = "THOR_REQUESTS",
        value_parser = parse_positive_u64
    )]
    pub requests: PositiveU64,

    /// Display verbose output (response bodies and debug logs)
    #[arg(long, short)]
    pub verbose: bool,

    /// Path to config file (TOML/JSON). Defaults to ./thor.toml or ./thor.json
    #[arg(long, short)]
    pub config: Option<String>,

    /// Disable colored log output
    #[arg(long = "no-color", env = "NO_COLOR")]
    pub no_color: bool,
}

impl ThorArgs {
    /// The target URL: the last positional token on the command line.
    #[must_use]
    pub fn target_url(&self) -> Option<&str> {
        self.urls.last().map(String::as_str)
    }
}
