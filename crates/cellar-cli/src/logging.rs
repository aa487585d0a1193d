//! Console logging for the CLI.
//!
//! Events go to stderr so stdout only carries the response. `RUST_LOG` takes
//! precedence; otherwise the level is `warn`, or `debug` with `--verbose`.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "cellar_client=debug,cellar_cli=debug,warn"
    } else {
        "warn"
    }
}

/// Install the global subscriber. Safe to call more than once.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
