//! Bound UDP socket with the relay's datagram limits.

use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use relay_protocol::{EncodeError, MAX_DATAGRAM_BYTES, Request, Response};
use tracing::{debug, warn};

use super::{TRANSPORT_TARGET, TransportError};
use crate::dispatch::Delivery;

/// Non-blocking UDP socket that decodes requests and encodes responses.
#[derive(Debug)]
pub struct DatagramSocket {
    socket: UdpSocket,
    local_addr: SocketAddr,
    // One byte past the cap so oversized datagrams are detectable.
    buffer: Box<[u8; MAX_DATAGRAM_BYTES + 1]>,
}

impl DatagramSocket {
    /// Resolves `host:port`, binds the first address and enables
    /// non-blocking mode.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when resolution, binding or switching to
    /// non-blocking mode fails.
    pub fn bind(host: &str, port: u16) -> Result<Self, TransportError> {
        let mut addrs = (host, port)
            .to_socket_addrs()
            .map_err(|source| TransportError::Resolve {
                host: host.to_string(),
                port,
                source,
            })?;
        let addr = addrs
            .find(|addr| matches!(addr, SocketAddr::V4(_) | SocketAddr::V6(_)))
            .ok_or_else(|| TransportError::ResolveEmpty {
                host: host.to_string(),
                port,
            })?;
        let socket =
            UdpSocket::bind(addr).map_err(|source| TransportError::Bind { addr, source })?;
        socket
            .set_nonblocking(true)
            .map_err(|source| TransportError::NonBlocking { source })?;
        let local_addr = socket
            .local_addr()
            .map_err(|source| TransportError::LocalAddr { source })?;

        Ok(Self {
            socket,
            local_addr,
            buffer: Box::new([0; MAX_DATAGRAM_BYTES + 1]),
        })
    }

    /// Address the socket is bound to, with the real port when bound to `0`.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Receives and decodes one datagram.
    ///
    /// Returns `Ok(None)` when nothing is waiting or the datagram fails to
    /// decode; the two cases are indistinguishable to the caller.
    ///
    /// # Errors
    ///
    /// Returns receive errors other than `WouldBlock` and `Interrupted`.
    pub fn receive(&mut self) -> io::Result<Option<(SocketAddr, Request)>> {
        let (length, sender) = match self.socket.recv_from(&mut self.buffer[..]) {
            Ok(received) => received,
            Err(error)
                if matches!(
                    error.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                ) =>
            {
                return Ok(None);
            }
            Err(error) => return Err(error),
        };

        match Request::decode(&self.buffer[..length]) {
            Ok(request) => Ok(Some((sender, request))),
            Err(error) => {
                debug!(
                    target: TRANSPORT_TARGET,
                    %sender,
                    %error,
                    "dropping undecodable datagram"
                );
                Ok(None)
            }
        }
    }

    /// Encodes and sends each delivery in order.
    ///
    /// Oversized responses are dropped and send failures are logged; neither
    /// stops the remaining deliveries.
    pub fn deliver(&self, deliveries: &[Delivery]) {
        for delivery in deliveries {
            self.send(delivery.to, &delivery.response);
        }
    }

    fn send(&self, to: SocketAddr, response: &Response) {
        let payload = match response.encode() {
            Ok(payload) => payload,
            Err(error @ EncodeError::Oversized { .. }) => {
                debug!(
                    target: TRANSPORT_TARGET,
                    recipient = %to,
                    %error,
                    "dropping oversized response"
                );
                return;
            }
            Err(error) => {
                warn!(
                    target: TRANSPORT_TARGET,
                    recipient = %to,
                    %error,
                    "failed to encode response"
                );
                return;
            }
        };

        if let Err(error) = self.socket.send_to(&payload, to) {
            warn!(
                target: TRANSPORT_TARGET,
                recipient = %to,
                %error,
                "failed to send response"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use relay_protocol::CommandKind;
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn relay_socket() -> DatagramSocket {
        DatagramSocket::bind("127.0.0.1", 0).expect("bind relay socket")
    }

    fn client() -> UdpSocket {
        let socket = UdpSocket::bind("127.0.0.1:0").expect("bind client");
        socket
            .set_read_timeout(Some(Duration::from_millis(500)))
            .expect("read timeout");
        socket
    }

    fn receive_within(socket: &mut DatagramSocket) -> Option<(SocketAddr, Request)> {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if let Some(received) = socket.receive().expect("receive") {
                return Some(received);
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        None
    }

    #[rstest]
    fn bind_reports_assigned_port(relay_socket: DatagramSocket) {
        assert_ne!(relay_socket.local_addr().port(), 0);
    }

    #[test]
    fn unresolvable_host_is_reported() {
        let error = DatagramSocket::bind("host.invalid.", 0).expect_err("resolution fails");
        assert!(matches!(
            error,
            TransportError::Resolve { .. } | TransportError::ResolveEmpty { .. }
        ));
    }

    #[rstest]
    fn empty_socket_yields_nothing(mut relay_socket: DatagramSocket) {
        assert!(relay_socket.receive().expect("receive").is_none());
    }

    #[rstest]
    fn decodes_request_with_sender(mut relay_socket: DatagramSocket) {
        let client = client();
        client
            .send_to(br#"{"command":0}"#, relay_socket.local_addr())
            .expect("send");

        let (sender, request) = receive_within(&mut relay_socket).expect("datagram");
        assert_eq!(sender, client.local_addr().expect("client addr"));
        assert_eq!(request.kind(), Some(CommandKind::Blank));
    }

    #[rstest]
    fn malformed_datagrams_are_dropped(mut relay_socket: DatagramSocket) {
        let client = client();
        let oversized = format!(
            r#"{{"command":0,"pad":"{}"}}"#,
            "x".repeat(MAX_DATAGRAM_BYTES)
        );
        let payloads: [&[u8]; 3] = [b"not json", br#"{"nickname":"x"}"#, oversized.as_bytes()];
        for payload in payloads {
            client
                .send_to(payload, relay_socket.local_addr())
                .expect("send");
        }
        client
            .send_to(br#"{"command":1,"nickname":"alice"}"#, relay_socket.local_addr())
            .expect("send");

        let (_, request) = receive_within(&mut relay_socket).expect("valid datagram");
        assert_eq!(request.kind(), Some(CommandKind::SetNickname));
    }

    #[rstest]
    fn deliver_sends_encoded_responses(relay_socket: DatagramSocket) {
        let client = client();
        let to = client.local_addr().expect("client addr");
        relay_socket.deliver(&[
            Delivery::new(to, Response::Users(vec!["a".repeat(MAX_DATAGRAM_BYTES)])),
            Delivery::new(to, Response::Ok),
        ]);

        let mut buffer = [0_u8; MAX_DATAGRAM_BYTES];
        let (length, _) = client.recv_from(&mut buffer).expect("receive ok");
        assert_eq!(&buffer[..length], br#"{"code":1}"#);
    }
}
