use crate::logging::LogFormat;

/// Default address the relay socket binds to.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default UDP port the relay listens on.
pub const DEFAULT_PORT: u16 = 10300;

/// Default log filter expression used by the daemon.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default log filter expression used by the daemon.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format for the daemon.
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}
