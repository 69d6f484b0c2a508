//! Structured health reporting for relay lifecycle events.

use std::net::SocketAddr;
use std::sync::Arc;

use relay_config::Config;
use relay_policy::PolicyChain;

use crate::bootstrap::BootstrapError;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked once the policy chain has been built.
    fn policies_loaded(&self, chain: &PolicyChain);

    /// Invoked after the socket is bound and bootstrap is complete.
    fn bootstrap_succeeded(&self, config: &Config, address: SocketAddr);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked when the receive loop starts.
    fn relay_started(&self, address: SocketAddr);

    /// Invoked after the receive loop exits.
    fn relay_stopped(&self, address: SocketAddr);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter + ?Sized,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn policies_loaded(&self, chain: &PolicyChain) {
        (**self).policies_loaded(chain);
    }

    fn bootstrap_succeeded(&self, config: &Config, address: SocketAddr) {
        (**self).bootstrap_succeeded(config, address);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn relay_started(&self, address: SocketAddr) {
        (**self).relay_started(address);
    }

    fn relay_stopped(&self, address: SocketAddr) {
        (**self).relay_stopped(address);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "starting relay bootstrap"
        );
    }

    fn policies_loaded(&self, chain: &PolicyChain) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "policies_loaded",
            count = chain.len(),
            policies = ?chain.names().collect::<Vec<_>>(),
            "policy chain loaded"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config, address: SocketAddr) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            %address,
            log_filter = %config.log_filter(),
            log_format = %config.log_format(),
            "relay bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "relay bootstrap failed"
        );
    }

    fn relay_started(&self, address: SocketAddr) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "relay_started",
            %address,
            "relay accepting datagrams"
        );
    }

    fn relay_stopped(&self, address: SocketAddr) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "relay_stopped",
            %address,
            "relay shut down"
        );
    }
}
