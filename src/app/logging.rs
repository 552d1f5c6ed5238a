use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::domain::AppError;

/// Install the global subscriber. `RUST_LOG` wins over `verbose`.
///
/// Logs go to stderr; stdout carries command output.
pub fn init_tracing(verbose: bool) -> Result<(), AppError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            if verbose {
                EnvFilter::try_new("mediaforge=debug,tower_http=debug,warn")
            } else {
                EnvFilter::try_new("mediaforge=info,warn")
            }
        })
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose)
                .with_thread_ids(false)
                .with_line_number(false)
                .with_file(false)
                .compact(),
        )
        .try_init()
        .map_err(|e| AppError::config_error(format!("Failed to initialize logging: {}", e)))
}
