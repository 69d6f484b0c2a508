//! Connectionless chat relay daemon.
//!
//! Clients send small JSON datagrams to a single UDP endpoint. The relay
//! binds a display name to each client endpoint, groups endpoints into named
//! channels and forwards private, channel and broadcast messages between
//! them. Requests are handled one at a time, to completion, by the
//! [`Dispatcher`]; a configurable [`relay_policy::PolicyChain`] may veto any
//! command it governs before it executes.
//!
//! The binary calls [`bootstrap_with`] with the [`SystemConfigLoader`] and
//! [`StructuredHealthReporter`], then runs the returned [`Relay`] until a
//! shutdown signal arrives. Tests substitute a [`StaticConfigLoader`] and a
//! recording reporter.

mod bootstrap;
pub mod dispatch;
mod health;
pub mod registry;
pub mod telemetry;
pub mod transport;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Relay, StaticConfigLoader, SystemConfigLoader, bootstrap_with,
};
pub use dispatch::{Delivery, Dispatcher, Session};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::{DatagramSocket, RelayServer, ServerHandle, TransportError};

#[cfg(test)]
mod tests;
