//! Structured telemetry initialisation for the relay.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

use relay_config::{Config, LogFormat};

/// Format of the subscriber installed by the first successful call.
static INSTALLED_FORMAT: OnceCell<LogFormat> = OnceCell::new();

/// Proof that the global subscriber is in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryHandle {
    format: LogFormat,
}

impl TelemetryHandle {
    /// Output format of the installed subscriber.
    ///
    /// This reflects the first configuration that installed telemetry, which
    /// may differ from the configuration passed to a later call.
    #[must_use]
    pub const fn format(&self) -> LogFormat {
        self.format
    }
}

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The configured log filter expression does not parse.
    #[error("invalid log filter '{filter}': {message}")]
    Filter {
        /// Expression as configured.
        filter: String,
        /// Parser diagnostic.
        message: String,
    },
    /// Another subscriber is already installed.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Installs the global tracing subscriber on first use.
///
/// The filter expression is validated on every call, so a bad `--log-filter`
/// is reported even when an earlier bootstrap already installed telemetry.
/// Only the first valid call touches global state.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] for an unparseable filter and
/// [`TelemetryError::Subscriber`] when a foreign subscriber is already set.
///
/// # Examples
///
/// ```rust
/// use relay_config::Config;
/// use relayd::telemetry;
///
/// # fn main() -> Result<(), relayd::TelemetryError> {
/// let config = Config::default();
/// let first = telemetry::initialise(&config)?;
/// let second = telemetry::initialise(&config)?;
/// assert_eq!(first.format(), second.format());
/// # Ok(())
/// # }
/// ```
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    let filter = build_filter(config.log_filter())?;
    let format = INSTALLED_FORMAT.get_or_try_init(|| {
        let format = config.log_format();
        tracing::subscriber::set_global_default(build_subscriber(filter, format))
            .map_err(TelemetryError::Subscriber)?;
        Ok::<_, TelemetryError>(format)
    })?;
    Ok(TelemetryHandle { format: *format })
}

fn build_filter(expression: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(expression).map_err(|error| TelemetryError::Filter {
        filter: expression.to_owned(),
        message: error.to_string(),
    })
}

fn build_subscriber(filter: EnvFilter, format: LogFormat) -> Box<dyn Subscriber + Send + Sync> {
    let stderr_is_terminal = io::stderr().is_terminal();
    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(io::stderr)
        .with_ansi(stderr_is_terminal)
        .with_timer(fmt::time::UtcTime::rfc_3339());

    match format {
        LogFormat::Json => Box::new(builder.json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder.compact().finish()),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn config_with_filter(filter: &str) -> Config {
        Config {
            log_filter: filter.to_owned(),
            ..Config::default()
        }
    }

    #[rstest]
    #[case::level("info")]
    #[case::target("relayd=debug")]
    #[case::mixed("warn,relayd::dispatch=trace")]
    fn accepts_filter_expressions(#[case] expression: &str) {
        assert!(build_filter(expression).is_ok());
    }

    #[test]
    fn rejects_unknown_levels() {
        let error = build_filter("relayd=verbose").expect_err("filter should fail");
        assert!(
            matches!(&error, TelemetryError::Filter { filter, .. } if filter == "relayd=verbose"),
            "unexpected error: {error:?}"
        );
    }

    #[test]
    fn malformed_filter_is_rejected_after_installation() {
        let installed = initialise(&Config::default()).expect("install telemetry");

        let error = initialise(&config_with_filter("relayd=verbose"))
            .expect_err("filter should fail");
        assert!(matches!(error, TelemetryError::Filter { .. }));

        let again = initialise(&Config::default()).expect("reuse telemetry");
        assert_eq!(again.format(), installed.format());
    }

    #[rstest]
    #[case::json(LogFormat::Json)]
    #[case::compact(LogFormat::Compact)]
    fn builds_subscriber_for_each_format(#[case] format: LogFormat) {
        let filter = build_filter("relayd=info").expect("valid filter");
        let subscriber = build_subscriber(filter, format);
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "relayd::telemetry", "subscriber active");
        });
    }
}
