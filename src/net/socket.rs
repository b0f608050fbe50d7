//! Pre-connected non-blocking UDP socket for the link.
//!
//! The socket is created once at link construction: bound to a local port,
//! its send buffer sized for several outstanding frames, and connected to
//! the single remote peer so the per-tick path is plain `send`/`recv` with
//! no address handling. mio sockets are non-blocking by construction, which
//! is exactly the contract the real-time tick requires.

use std::io::{self, ErrorKind};
use std::net::AddrParseError;
use std::os::fd::AsFd;

use mio::net::UdpSocket as MioUdpSocket;
use thiserror::Error;

use super::Endpoint;
use crate::trace::debug;

/// Fatal transport setup failure.
///
/// Every variant names the construction step that failed; the link object
/// is never usable after any of them. The already-bound socket is released
/// by drop even when a later step fails.
#[derive(Debug, Error)]
pub enum TransportInitError {
    /// Could not bind the local datagram port.
    #[error("could not bind UDP port {port}: {source}")]
    Bind { port: u16, source: io::Error },
    /// Could not query or size the socket send buffer.
    #[error("could not size the link send buffer: {source}")]
    SendBuffer { source: io::Error },
    /// The remote host string is not a valid IPv4 address.
    #[error("bad remote address '{host}': {source}")]
    RemoteAddr {
        host: String,
        source: AddrParseError,
    },
    /// Could not set the datagram destination.
    #[error("could not set datagram destination {remote}: {source}")]
    Connect {
        remote: Endpoint,
        source: io::Error,
    },
}

/// A non-blocking UDP socket connected to one peer.
#[derive(Debug)]
pub struct LinkSocket {
    inner: MioUdpSocket,
}

impl LinkSocket {
    /// Opens the link socket: bind, size the send buffer, connect.
    ///
    /// The kernel is asked for at least `min_send_buffer` bytes of send
    /// buffer (it may grant more); both the prior and granted sizes are
    /// traced for field diagnosis of drop-heavy links.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportInitError`] naming the failing step. The
    /// socket, once bound, is closed on every error path.
    pub fn open(
        local_port: u16,
        remote: Endpoint,
        min_send_buffer: usize,
    ) -> Result<Self, TransportInitError> {
        let inner = MioUdpSocket::bind(Endpoint::any(local_port).into())
            .map_err(|source| TransportInitError::Bind {
                port: local_port,
                source,
            })?;

        let socket = Self { inner };

        let _before = socket
            .send_buffer_size()
            .map_err(|source| TransportInitError::SendBuffer { source })?;
        socket
            .set_send_buffer_size(min_send_buffer)
            .map_err(|source| TransportInitError::SendBuffer { source })?;
        let _granted = socket
            .send_buffer_size()
            .map_err(|source| TransportInitError::SendBuffer { source })?;
        debug!(
            requested = min_send_buffer,
            before = _before,
            granted = _granted,
            "sized link send buffer"
        );

        socket
            .inner
            .connect(remote.into())
            .map_err(|source| TransportInitError::Connect { remote, source })?;

        Ok(socket)
    }

    /// Returns the local address this socket is bound to.
    ///
    /// # Errors
    ///
    /// Returns an error if the local address cannot be retrieved.
    pub fn local_addr(&self) -> io::Result<Endpoint> {
        self.inner.local_addr().map(Endpoint::from)
    }

    /// Returns the peer this socket is connected to.
    ///
    /// # Errors
    ///
    /// Returns an error if the peer address cannot be retrieved.
    pub fn peer_addr(&self) -> io::Result<Endpoint> {
        self.inner.peer_addr().map(Endpoint::from)
    }

    /// Attempts to send one datagram to the peer, returning `Ok(None)`
    /// instead of `WouldBlock`.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure other than `WouldBlock`.
    pub fn try_send(&self, frame: &[u8]) -> io::Result<Option<usize>> {
        match self.inner.send(frame) {
            Ok(n) => Ok(Some(n)),
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Attempts to receive one datagram from the peer, returning
    /// `Ok(None)` instead of `WouldBlock`.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure other than `WouldBlock`.
    pub fn try_recv(&self, buf: &mut [u8]) -> io::Result<Option<usize>> {
        match self.inner.recv(buf) {
            Ok(n) => Ok(Some(n)),
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Gets the socket's send buffer size.
    ///
    /// # Errors
    ///
    /// Returns an error if the option cannot be retrieved.
    pub fn send_buffer_size(&self) -> io::Result<usize> {
        let fd = self.inner.as_fd();
        Ok(rustix::net::sockopt::socket_send_buffer_size(fd)?)
    }

    /// Sets the socket's send buffer size.
    ///
    /// # Errors
    ///
    /// Returns an error if the option cannot be set.
    pub fn set_send_buffer_size(&self, size: usize) -> io::Result<()> {
        let fd = self.inner.as_fd();
        rustix::net::sockopt::set_socket_send_buffer_size(fd, size)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::UdpSocket as StdUdpSocket;

    fn peer() -> (StdUdpSocket, Endpoint) {
        let socket = StdUdpSocket::bind("127.0.0.1:0").unwrap();
        socket.set_nonblocking(true).unwrap();
        let addr = Endpoint::from(socket.local_addr().unwrap());
        (socket, addr)
    }

    #[test]
    fn open_binds_and_connects() {
        let (_peer, peer_addr) = peer();
        let socket = LinkSocket::open(0, peer_addr, 1024).unwrap();
        assert_ne!(socket.local_addr().unwrap().port(), 0);
        assert_eq!(socket.peer_addr().unwrap().port(), peer_addr.port());
    }

    #[test]
    fn open_requests_send_buffer() {
        let (_peer, peer_addr) = peer();
        let socket = LinkSocket::open(0, peer_addr, 64 * 1024).unwrap();
        // Kernel may round up (Linux doubles), never below the request
        assert!(socket.send_buffer_size().unwrap() >= 64 * 1024);
    }

    #[test]
    fn try_recv_empty_returns_none() {
        let (_peer, peer_addr) = peer();
        let socket = LinkSocket::open(0, peer_addr, 1024).unwrap();
        let mut buf = [0u8; 64];
        assert!(socket.try_recv(&mut buf).unwrap().is_none());
    }

    #[test]
    fn connected_loopback_roundtrip() {
        let (peer, peer_addr) = peer();
        let socket = LinkSocket::open(0, peer_addr, 1024).unwrap();
        let local = socket.local_addr().unwrap();

        socket.try_send(b"ping").unwrap();
        std::thread::sleep(std::time::Duration::from_millis(10));

        let mut buf = [0u8; 64];
        let (n, from) = peer.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"ping");
        assert_eq!(from.port(), local.port());

        // Reply lands on the connected socket
        peer.send_to(b"pong", ("127.0.0.1", local.port())).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(10));
        let n = socket.try_recv(&mut buf).unwrap().expect("reply pending");
        assert_eq!(&buf[..n], b"pong");
    }

    #[test]
    fn bind_conflict_is_fatal() {
        let (_peer, peer_addr) = peer();
        let first = LinkSocket::open(0, peer_addr, 1024).unwrap();
        let taken = first.local_addr().unwrap().port();
        let err = LinkSocket::open(taken, peer_addr, 1024).unwrap_err();
        assert!(matches!(err, TransportInitError::Bind { port, .. } if port == taken));
    }
}
