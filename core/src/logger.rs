use tracing::Level;

/// Logging capability handed to the supervisor and each fetcher at construction.
pub trait Logger: Send + Sync {
    fn log(&self, level: Level, message: &str);
}

/// Forwards to `tracing` under the `edb::fetcher` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: Level, message: &str) {
        match level {
            Level::ERROR => tracing::error!(target: "edb::fetcher", "{}", message),
            Level::WARN => tracing::warn!(target: "edb::fetcher", "{}", message),
            Level::INFO => tracing::info!(target: "edb::fetcher", "{}", message),
            Level::DEBUG => tracing::debug!(target: "edb::fetcher", "{}", message),
            _ => tracing::trace!(target: "edb::fetcher", "{}", message),
        }
    }
}
