use crate::Value;

/// Minimum level recognized by the logger, most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl From<&str> for LogLevel {
    /// Unrecognized values select `Debug`.
    fn from(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "info" => LogLevel::Info,
            "warn" => LogLevel::Warn,
            "error" => LogLevel::Error,
            _ => LogLevel::Debug,
        }
    }
}

/// Leveled logger threaded explicitly through compilation and execution.
///
/// Emits `tracing` events gated by a minimum level, so callers keep their
/// usual subscriber setup while the core never reads ambient process state
/// outside the `from_env` convenience constructor.
#[derive(Debug, Clone)]
pub struct FlowLogger {
    min: LogLevel,
}

impl FlowLogger {
    pub fn with_level(min: LogLevel) -> Self {
        Self { min }
    }

    /// Builds a logger from the `LOOMFLOW_LOG` environment variable; unset
    /// or unrecognized values default to `debug`.
    pub fn from_env() -> Self {
        let min = std::env::var("LOOMFLOW_LOG")
            .map(|v| LogLevel::from(v.as_str()))
            .unwrap_or(LogLevel::Debug);
        Self::with_level(min)
    }

    pub fn debug(&self, message: &str, data: Value) {
        if self.min <= LogLevel::Debug {
            tracing::debug!(%data, "{}", message);
        }
    }

    pub fn info(&self, message: &str, data: Value) {
        if self.min <= LogLevel::Info {
            tracing::info!(%data, "{}", message);
        }
    }

    pub fn warn(&self, message: &str, data: Value) {
        if self.min <= LogLevel::Warn {
            tracing::warn!(%data, "{}", message);
        }
    }

    pub fn error(&self, message: &str, data: Value) {
        if self.min <= LogLevel::Error {
            tracing::error!(%data, "{}", message);
        }
    }
}

impl Default for FlowLogger {
    fn default() -> Self {
        Self::with_level(LogLevel::Debug)
    }
}
