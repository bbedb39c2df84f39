use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::EngineConfig;

/// Keeps the non-blocking file writer alive; hold it for the process
/// lifetime when file logging is on.
pub struct LogHandle {
    file_guard: Option<WorkerGuard>,
}

impl LogHandle {
    pub fn file_logging_active(&self) -> bool {
        self.file_guard.is_some()
    }
}

/// Initializes tracing from the engine config: stdout always, plus a daily
/// rolling `engine.log` when `log_dir` is set. Safe to call more than once;
/// later calls leave the installed subscriber in place.
pub fn init_tracing(config: &EngineConfig) -> LogHandle {
    let env_filter =
        EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(true);

    let file = config.log_dir.as_deref().and_then(|dir| {
        if let Err(err) = std::fs::create_dir_all(dir) {
            eprintln!("failed to create log directory {dir}: {err}");
            return None;
        }
        let (writer, guard) = tracing_appender::non_blocking(rolling::daily(dir, "engine.log"));
        Some((
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
            guard,
        ))
    });

    match file {
        Some((file_layer, guard)) => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(stdout_layer)
                .with(file_layer)
                .try_init()
                .ok();
            LogHandle {
                file_guard: Some(guard),
            }
        }
        None => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(stdout_layer)
                .try_init()
                .ok();
            LogHandle { file_guard: None }
        }
    }
}
