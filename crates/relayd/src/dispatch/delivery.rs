//! Outbound datagrams produced by the dispatcher.

use std::net::SocketAddr;

use relay_protocol::Response;

/// A response addressed to one endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Recipient endpoint.
    pub to: SocketAddr,
    /// Payload to send.
    pub response: Response,
}

impl Delivery {
    /// Addresses `response` to `to`.
    pub fn new(to: SocketAddr, response: Response) -> Self {
        Self { to, response }
    }
}
