//! Shared configuration for the relay daemon.
//!
//! Configuration is resolved by `clap` from command-line flags and `RELAY_*`
//! environment variables. Flags take precedence over the environment, which
//! takes precedence over the built-in defaults in [`defaults`].

use std::ffi::OsString;

use clap::Parser;

mod defaults;
mod logging;
mod policy;

pub use self::defaults::{
    DEFAULT_HOST, DEFAULT_LOG_FILTER, DEFAULT_PORT, default_log_filter, default_log_format,
};
pub use self::logging::{LogFormat, LogFormatParseError};
pub use self::policy::{PolicySpec, PolicySpecError};

/// Resolved daemon configuration.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "relayd", version, about = "Connectionless chat relay daemon")]
pub struct Config {
    /// Address the relay socket binds to.
    #[arg(long, env = "RELAY_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// UDP port the relay socket binds to.
    #[arg(long, env = "RELAY_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Tracing filter expression, for example `info` or `relayd=debug`.
    #[arg(long, env = "RELAY_LOG_FILTER", default_value = DEFAULT_LOG_FILTER)]
    pub log_filter: String,

    /// Log output format.
    #[arg(long, env = "RELAY_LOG_FORMAT", default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,

    /// Policy declaration `<policy>:<commands>[:<argument>]`; repeatable.
    #[arg(
        long = "policy",
        value_name = "POLICY",
        env = "RELAY_POLICIES",
        value_delimiter = ','
    )]
    pub policies: Vec<PolicySpec>,
}

impl Config {
    /// Loads configuration from the process arguments and environment.
    ///
    /// # Errors
    ///
    /// Returns the `clap` error describing the invalid input. Help and version
    /// requests are also reported as errors so the caller can print them.
    pub fn load() -> Result<Self, clap::Error> {
        Self::try_parse()
    }

    /// Loads configuration from an explicit argument list.
    ///
    /// The first item is the program name, as with [`std::env::args_os`].
    ///
    /// # Errors
    ///
    /// Returns the `clap` error describing the invalid input.
    pub fn load_from_iter<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::try_parse_from(args)
    }

    /// Host and port pair the relay socket binds to.
    pub fn bind_address(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }

    /// Log filter expression.
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Policy declarations in load order.
    pub fn policies(&self) -> &[PolicySpec] {
        &self.policies
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            log_filter: default_log_filter().to_owned(),
            log_format: default_log_format(),
            policies: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        use clap::CommandFactory;
        Config::command().debug_assert();
    }
}
