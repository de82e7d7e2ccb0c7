//! Tracing subscriber set-up.
//!
//! The core and adapter crates only emit events; the binary installs the
//! one subscriber. Logs always go to stderr so stdout stays parseable.

use std::io::IsTerminal as _;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::GlobalArgs;

const CRATES: [&str; 3] = ["docfill", "docfill_core", "docfill_adapters"];

/// Install the global subscriber. Call once, before the first event.
pub fn init_logging(args: &GlobalArgs) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(level_for(args))));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_ansi(!args.no_color && std::io::stderr().is_terminal())
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracing subscriber already installed: {e}"))
}

/// Same level for every docfill crate, dependencies stay silent.
fn filter_directive(level: &str) -> String {
    CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// warn by default, `-v` steps down to trace, `-q` keeps errors only.
fn level_for(args: &GlobalArgs) -> &'static str {
    match (args.quiet, args.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    }
}
