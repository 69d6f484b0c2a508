//! Error types for the datagram transport.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Errors surfaced while binding or running the relay socket.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to resolve UDP address {host}:{port}: {source}")]
    Resolve {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },
    #[error("no UDP addresses resolved for {host}:{port}")]
    ResolveEmpty { host: String, port: u16 },
    #[error("failed to bind UDP socket at {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("failed to enable non-blocking socket: {source}")]
    NonBlocking {
        #[source]
        source: io::Error,
    },
    #[error("failed to read bound socket address: {source}")]
    LocalAddr {
        #[source]
        source: io::Error,
    },
    #[error("relay thread panicked")]
    ThreadPanic,
}
