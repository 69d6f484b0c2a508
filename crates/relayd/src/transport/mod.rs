//! UDP transport for the relay.
//!
//! [`DatagramSocket`] owns the bound socket and the datagram size limits;
//! [`RelayServer`] drives the receive, dispatch and deliver loop either on
//! the calling thread or on a background thread behind a [`ServerHandle`].

mod errors;
mod server;
mod socket;

pub use self::errors::TransportError;
pub use self::server::{RelayServer, ServerHandle};
pub use self::socket::DatagramSocket;

const TRANSPORT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
