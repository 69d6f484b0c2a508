//! Receive loop driving the dispatcher from the datagram socket.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use super::{DatagramSocket, TRANSPORT_TARGET, TransportError};
use crate::dispatch::Dispatcher;

const IDLE_BACKOFF: Duration = Duration::from_millis(10);
const ERROR_BACKOFF: Duration = Duration::from_millis(150);

/// Single-threaded relay: one request is fully handled before the next is
/// received.
#[derive(Debug)]
pub struct RelayServer {
    socket: DatagramSocket,
    dispatcher: Dispatcher,
}

impl RelayServer {
    /// Pairs a bound socket with a dispatcher.
    pub fn new(socket: DatagramSocket, dispatcher: Dispatcher) -> Self {
        Self { socket, dispatcher }
    }

    /// Address clients should send to.
    pub fn local_addr(&self) -> SocketAddr {
        self.socket.local_addr()
    }

    /// Handles at most one inbound datagram.
    ///
    /// Returns `Ok(true)` when a request was dispatched and `Ok(false)` when
    /// nothing decodable was waiting.
    ///
    /// # Errors
    ///
    /// Returns socket receive errors.
    pub fn poll_once(&mut self) -> io::Result<bool> {
        let Some((sender, request)) = self.socket.receive()? else {
            return Ok(false);
        };
        let deliveries = self.dispatcher.handle(sender, &request);
        self.socket.deliver(&deliveries);
        Ok(true)
    }

    /// Runs the receive loop on the current thread until `shutdown` is set.
    pub fn run(&mut self, shutdown: &AtomicBool) {
        info!(
            target: TRANSPORT_TARGET,
            address = %self.local_addr(),
            "relay listening"
        );
        let mut last_error = None::<io::ErrorKind>;
        while !shutdown.load(Ordering::SeqCst) {
            match self.poll_once() {
                Ok(true) => last_error = None,
                Ok(false) => thread::sleep(IDLE_BACKOFF),
                Err(error) => {
                    let kind = error.kind();
                    if last_error != Some(kind) {
                        warn!(
                            target: TRANSPORT_TARGET,
                            error = %error,
                            "socket receive error"
                        );
                    }
                    last_error = Some(kind);
                    thread::sleep(ERROR_BACKOFF);
                }
            }
        }
        info!(target: TRANSPORT_TARGET, "relay stopped");
    }

    /// Moves the server onto a background thread.
    pub fn start(mut self) -> ServerHandle {
        let local_addr = self.local_addr();
        ServerHandle::spawn(local_addr, move |shutdown| self.run(shutdown))
    }
}

/// Handle to a relay running on a background thread.
///
/// Dropping the handle requests shutdown without waiting for the thread.
#[derive(Debug)]
pub struct ServerHandle {
    shutdown: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
    local_addr: SocketAddr,
}

impl ServerHandle {
    pub(crate) fn spawn<F>(local_addr: SocketAddr, run: F) -> Self
    where
        F: FnOnce(&AtomicBool) + Send + 'static,
    {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_flag = Arc::clone(&shutdown);
        let handle = thread::spawn(move || run(&shutdown_flag));
        Self {
            shutdown,
            handle: Some(handle),
            local_addr,
        }
    }

    /// Address the relay is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Asks the receive loop to stop after its current iteration.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// Waits for the relay thread to finish.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::ThreadPanic`] when the thread panicked.
    pub fn join(mut self) -> Result<(), TransportError> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| TransportError::ThreadPanic),
            None => Ok(()),
        }
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }
}
