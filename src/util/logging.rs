use std::path::Path;

use anyhow::{Result, anyhow};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Initialize the logging system with tracing.
///
/// If `log_dir` is provided, logs will also be written to a daily rolling file
/// in that directory; keep the returned guard alive until shutdown so buffered
/// lines are flushed. The `verbose` flag controls whether debug logs are shown.
/// `RUST_LOG` overrides both defaults.
pub fn init_logging(log_dir: Option<&Path>, verbose: bool) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("sound_manager=debug,soundboard=debug,warn")
        } else {
            EnvFilter::new("sound_manager=info,soundboard=info,warn")
        }
    });

    let registry = tracing_subscriber::registry().with(filter);

    if let Some(dir) = log_dir {
        let file_appender = RollingFileAppender::new(Rotation::DAILY, dir, "sound-manager.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        registry
            .with(fmt::layer().with_target(true))
            .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
            .try_init()
            .map_err(|e| anyhow!("Failed to install log subscriber: {e}"))?;
        Ok(Some(guard))
    } else {
        registry
            .with(fmt::layer().with_target(true))
            .try_init()
            .map_err(|e| anyhow!("Failed to install log subscriber: {e}"))?;
        Ok(None)
    }
}
