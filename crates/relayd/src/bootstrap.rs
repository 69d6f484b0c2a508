//! Relay bootstrap orchestration.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use thiserror::Error;

use relay_config::Config;
use relay_policy::{PolicyChain, PolicyError};

use crate::dispatch::Dispatcher;
use crate::health::HealthReporter;
use crate::telemetry::{self, TelemetryError, TelemetryHandle};
use crate::transport::{DatagramSocket, RelayServer, ServerHandle, TransportError};

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the relay configuration.
    fn load(&self) -> Result<Config, Arc<clap::Error>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<clap::Error>> {
        Config::load().map_err(Arc::new)
    }
}

/// Loader that hands out a fixed configuration.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps `config`.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<clap::Error>> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying parser error.
        #[source]
        source: Arc<clap::Error>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// A policy declaration could not be turned into a policy.
    #[error("failed to load policy chain: {source}")]
    Policy {
        /// Underlying policy error.
        #[source]
        source: PolicyError,
    },
    /// The relay socket could not be bound.
    #[error("failed to bind relay socket: {source}")]
    Transport {
        /// Underlying transport error.
        #[source]
        source: TransportError,
    },
}

/// A bootstrapped relay, bound and ready to serve.
pub struct Relay {
    config: Config,
    server: RelayServer,
    telemetry: TelemetryHandle,
    reporter: Arc<dyn HealthReporter>,
}

impl Relay {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Address the relay socket is bound to.
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.server.local_addr()
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Serves requests on the current thread until `shutdown` is set.
    pub fn run(mut self, shutdown: &AtomicBool) {
        let address = self.local_addr();
        self.reporter.relay_started(address);
        self.server.run(shutdown);
        self.reporter.relay_stopped(address);
    }

    /// Serves requests on a background thread.
    #[must_use = "dropping the handle stops the relay"]
    pub fn start(self) -> ServerHandle {
        let address = self.local_addr();
        ServerHandle::spawn(address, move |shutdown| self.run(shutdown))
    }
}

impl std::fmt::Debug for Relay {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Relay")
            .field("config", &self.config)
            .field("server", &self.server)
            .finish_non_exhaustive()
    }
}

/// Bootstraps the relay using the supplied collaborators.
///
/// Loads configuration, installs telemetry, builds the policy chain from the
/// configured declarations and binds the socket. Every failure is reported to
/// `reporter` before being returned.
///
/// # Errors
///
/// Returns [`BootstrapError`] naming the stage that failed.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
) -> Result<Relay, BootstrapError> {
    reporter.bootstrap_starting();
    let fail = |error: BootstrapError| {
        reporter.bootstrap_failed(&error);
        error
    };

    let config = loader
        .load()
        .map_err(|source| fail(BootstrapError::Configuration { source }))?;

    let telemetry = telemetry::initialise(&config)
        .map_err(|source| fail(BootstrapError::Telemetry { source }))?;

    let policies = PolicyChain::from_specs(config.policies())
        .map_err(|source| fail(BootstrapError::Policy { source }))?;
    reporter.policies_loaded(&policies);

    let (host, port) = config.bind_address();
    let socket = DatagramSocket::bind(host, port)
        .map_err(|source| fail(BootstrapError::Transport { source }))?;

    let server = RelayServer::new(socket, Dispatcher::new(policies));
    reporter.bootstrap_succeeded(&config, server.local_addr());

    Ok(Relay {
        config,
        server,
        telemetry,
        reporter,
    })
}
