//! Logging infrastructure
//!
//! Console logging goes to stderr. With a log directory configured, JSON
//! logs are also written to a daily rolling file.

use crate::config::TelemetryConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_NAME: &str = "llmcc.log";

fn make_env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug,hyper=info,reqwest=info,h2=info,rustls=info")
        } else {
            EnvFilter::new("warn,hyper=warn,reqwest=warn,h2=warn,rustls=warn")
        }
    })
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop and must be held
/// until the program exits. Installing twice is a no-op.
pub fn init(config: &TelemetryConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    let guard = if let Some(log_dir) = &config.log_dir {
        std::fs::create_dir_all(log_dir)?;

        // Set up file appender for JSON logs
        let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_NAME);
        let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);

        tracing_subscriber::registry()
            .with(make_env_filter(config.verbose))
            .with(console)
            .with(fmt::layer().json().with_writer(non_blocking))
            .try_init()
            .ok();
        Some(file_guard)
    } else {
        tracing_subscriber::registry()
            .with(make_env_filter(config.verbose))
            .with(console)
            .try_init()
            .ok();
        None
    };

    tracing::debug!(
        verbose = config.verbose,
        log_dir = ?config.log_dir,
        "Telemetry initialized"
    );
    Ok(guard)
}
