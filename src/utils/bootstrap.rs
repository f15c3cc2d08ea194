//! Bootstrap utilities for shopcore binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LOG_ENV_VAR;

/// Initialize tracing with SHOPCORE_LOG environment variable.
///
/// Defaults to "info" level if SHOPCORE_LOG is not set.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env(LOG_ENV_VAR)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Split `--config <path>` (or `--config=<path>`) out of an argument list.
///
/// Returns the config path, if any, and the remaining positional arguments.
pub fn parse_config_path<I>(args: I) -> (Option<String>, Vec<String>)
where
    I: IntoIterator<Item = String>,
{
    let mut config_path = None;
    let mut rest = Vec::new();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        if arg == "--config" || arg == "-c" {
            config_path = args.next();
        } else if let Some(path) = arg.strip_prefix("--config=") {
            config_path = Some(path.to_string());
        } else {
            rest.push(arg);
        }
    }

    (config_path, rest)
}
