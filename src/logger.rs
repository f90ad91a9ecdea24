use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Filter used when neither `THOR_LOG` nor `RUST_LOG` is set.
const fn default_directives(verbose: bool) -> &'static str {
    if verbose { "thor=debug,info" } else { "info" }
}

/// Installs the global `tracing` subscriber. Logs go to stderr so stdout
/// carries only report lines.
pub fn init_logging(verbose: bool, no_color: bool) {
    let filter = std::env::var("THOR_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .map_or_else(
            |_| EnvFilter::new(default_directives(verbose)),
            |value| EnvFilter::try_new(value).unwrap_or_else(|_| EnvFilter::new("info")),
        );

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_ansi(!no_color)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set global default subscriber: {}", err);
    }
}
