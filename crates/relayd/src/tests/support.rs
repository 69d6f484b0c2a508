//! Test harness utilities for the relay behavioural suites.

use std::collections::HashMap;
use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use relay_config::{Config, PolicySpec};
use relay_policy::PolicyChain;
use relay_protocol::MAX_DATAGRAM_BYTES;
use serde_json::Value;

use crate::bootstrap::{BootstrapError, StaticConfigLoader, bootstrap_with};
use crate::health::HealthReporter;
use crate::transport::ServerHandle;

const RESPONSE_TIMEOUT: Duration = Duration::from_secs(2);
const SILENCE_TIMEOUT: Duration = Duration::from_millis(200);

/// Configuration bound to an ephemeral loopback port.
pub fn loopback_config(policies: &[&str]) -> Config {
    Config {
        host: "127.0.0.1".into(),
        port: 0,
        policies: policies
            .iter()
            .map(|declaration| declaration.parse::<PolicySpec>())
            .collect::<Result<Vec<_>, _>>()
            .expect("valid policy declarations"),
        ..Config::default()
    }
}

/// Lifecycle events captured by [`RecordingHealthReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    BootstrapStarting,
    PoliciesLoaded(Vec<String>),
    BootstrapSucceeded(SocketAddr),
    BootstrapFailed(String),
    RelayStarted(SocketAddr),
    RelayStopped(SocketAddr),
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn policies_loaded(&self, chain: &PolicyChain) {
        self.record(HealthEvent::PoliciesLoaded(
            chain.names().map(str::to_owned).collect(),
        ));
    }

    fn bootstrap_succeeded(&self, _config: &Config, address: SocketAddr) {
        self.record(HealthEvent::BootstrapSucceeded(address));
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn relay_started(&self, address: SocketAddr) {
        self.record(HealthEvent::RelayStarted(address));
    }

    fn relay_stopped(&self, address: SocketAddr) {
        self.record(HealthEvent::RelayStopped(address));
    }
}

/// Scenario world: a relay on a background thread and named client sockets.
pub struct RelayWorld {
    pub reporter: Arc<RecordingHealthReporter>,
    relay: Option<ServerHandle>,
    bootstrap_error: Option<BootstrapError>,
    clients: HashMap<String, UdpSocket>,
}

impl RelayWorld {
    pub fn new() -> Self {
        Self {
            reporter: Arc::new(RecordingHealthReporter::default()),
            relay: None,
            bootstrap_error: None,
            clients: HashMap::new(),
        }
    }

    /// Bootstraps a relay with `policies` and starts it when bootstrap
    /// succeeds.
    pub fn start(&mut self, policies: &[&str]) {
        let loader = StaticConfigLoader::new(loopback_config(policies));
        match bootstrap_with(&loader, self.reporter.clone()) {
            Ok(relay) => self.relay = Some(relay.start()),
            Err(error) => self.bootstrap_error = Some(error),
        }
    }

    /// Returns the bootstrap error, if any.
    pub fn bootstrap_error(&self) -> Option<&BootstrapError> {
        self.bootstrap_error.as_ref()
    }

    /// Returns true when a relay is running.
    pub fn relay_running(&self) -> bool {
        self.relay.is_some()
    }

    fn relay_addr(&self) -> SocketAddr {
        self.relay
            .as_ref()
            .map(ServerHandle::local_addr)
            .expect("relay should be running")
    }

    fn client(&mut self, name: &str) -> &UdpSocket {
        self.clients.entry(name.to_owned()).or_insert_with(|| {
            let socket = UdpSocket::bind("127.0.0.1:0").expect("bind client socket");
            socket
                .set_read_timeout(Some(RESPONSE_TIMEOUT))
                .expect("set read timeout");
            socket
        })
    }

    /// Sends `request` from the named client.
    pub fn send(&mut self, client: &str, request: &Value) {
        let to = self.relay_addr();
        let payload = serde_json::to_vec(request).expect("encode request");
        self.client(client)
            .send_to(&payload, to)
            .expect("send request");
    }

    /// Waits for the next datagram addressed to the named client.
    pub fn next_response(&mut self, client: &str) -> Value {
        let mut buffer = [0_u8; MAX_DATAGRAM_BYTES];
        let (length, _) = self
            .client(client)
            .recv_from(&mut buffer)
            .unwrap_or_else(|error| panic!("client {client} received nothing: {error}"));
        serde_json::from_slice(&buffer[..length]).expect("response is JSON")
    }

    /// Returns the next datagram when one arrives shortly.
    pub fn try_next_response(&mut self, client: &str) -> Option<Value> {
        let socket = self.client(client);
        socket
            .set_read_timeout(Some(SILENCE_TIMEOUT))
            .expect("set read timeout");
        let mut buffer = [0_u8; MAX_DATAGRAM_BYTES];
        let received = match socket.recv_from(&mut buffer) {
            Ok((length, _)) => Some(serde_json::from_slice(&buffer[..length]).expect("JSON")),
            Err(error)
                if matches!(
                    error.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                ) =>
            {
                None
            }
            Err(error) => panic!("client {client} receive failed: {error}"),
        };
        socket
            .set_read_timeout(Some(RESPONSE_TIMEOUT))
            .expect("set read timeout");
        received
    }
}

impl Default for RelayWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RelayWorld {
    fn drop(&mut self) {
        if let Some(handle) = self.relay.take() {
            handle.shutdown();
            let _ = handle.join();
        }
    }
}
