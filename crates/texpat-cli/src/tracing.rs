use tracing::metadata::LevelFilter;
use tracing_subscriber::util::TryInitError;

use crate::args::CliArguments;

/// Initializes the tracing system, printing events to stderr.
pub fn setup_tracing(args: &CliArguments) -> Result<(), TryInitError> {
    use tracing_subscriber::prelude::*;

    // Short circuit if we don't need to log anything.
    if args.verbosity == 0 {
        return Ok(());
    }

    let fmt_layer = tracing_subscriber::fmt::layer()
        .without_time()
        .with_writer(std::io::stderr)
        .with_filter(level_filter(args));

    tracing_subscriber::registry().with(fmt_layer).try_init()
}

/// Returns the log level filter for the given verbosity level.
fn level_filter(args: &CliArguments) -> LevelFilter {
    match args.verbosity {
        0 => LevelFilter::OFF,
        1 => LevelFilter::WARN,
        2 => LevelFilter::INFO,
        3 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}
