use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the stderr subscriber used by the CLI.
///
/// `RUST_LOG` wins when set; otherwise the crate logs at info (debug with
/// `verbose`) and dependencies at warn. Stdout is left for JSON output.
pub fn init_logging(verbose: bool) {
    let default_directive = if verbose {
        "venue_scout=debug,warn"
    } else {
        "venue_scout=info,warn"
    };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE);

    // A second init (tests, embedding) is not an error worth surfacing.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();
}
