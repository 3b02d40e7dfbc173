//! Logging setup
//!
//! Logs go to stderr so stdout carries only the progress dots and the report.
//! `RUST_LOG` overrides the default level (`warn`, or `info` with `--verbose`).

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber
pub fn init_logging(verbose: bool, json: bool) -> anyhow::Result<()> {
    let default_level = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let fmt = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if json {
        fmt.json().try_init()
    } else {
        fmt.try_init()
    }
    .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {}", e))
}
