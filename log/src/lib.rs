use std::sync::Mutex;

use slog::Drain;
use slog::Fuse;
use slog_async::Async;
use slog_json::Json;

pub use slog::{debug, error, info, o, trace, warn, Discard, Logger};

/// Builds the root logger: JSON lines on stderr behind an async drain,
/// tagged with the build metadata.
pub fn initialize_logger() -> Logger {
    let drain = Mutex::new(Json::default(std::io::stderr())).map(Fuse);

    #[cfg(feature = "env_logging")]
    let drain = slog_envlogger::new(drain).ignore_res();

    let drain = Async::new(drain).build().fuse();

    Logger::root(
        drain,
        o!("version" => info::VERSION, "revision" => info::REVISION, "build_timestamp" => info::BUILD_TIMESTAMP),
    )
}

/// Installs `logger` as the global `slog-scope` logger. The guard must be
/// kept alive for as long as the global logger is needed.
#[cfg(feature = "env_logging")]
pub fn install_global(logger: &Logger) -> slog_scope::GlobalLoggerGuard {
    slog_scope::set_global_logger(logger.clone())
}

/// A logger that drops everything, for tests and tools that run quietly.
pub fn discard() -> Logger {
    Logger::root(Discard, o!())
}
