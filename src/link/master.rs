//! Per-tick exchange loop.
//!
//! [`MasterLink`] is owned by the real-time scheduler and driven through
//! [`MasterLink::operate`] once per tick. A [`LinkHandle`] gives a
//! supervisory thread the link/unlink controls without touching the
//! scheduler's state.

use std::sync::Arc;

use crate::joint::{JointState, JointVector};
use crate::link::config::LinkConfig;
use crate::link::monitor::LinkMonitor;
use crate::link::wire::{self, Decoded, PARTIAL_ELEMS};
use crate::net::{Endpoint, LinkSocket, TransportInitError};
use crate::trace::{debug, info};

/// Maximum UDP datagram size we'll receive.
///
/// Large enough to observe oversized frames instead of having the kernel
/// truncate them to the read size.
const MAX_DATAGRAM_SIZE: usize = 65535;

/// One side of a master-to-master teleoperation link.
///
/// `DOF` is the joint count of the local arm; the remote position estimate
/// has the same length regardless of the peer's actual joint count (a
/// 4-DOF peer fills the first four joints, see [`Decoded::Partial4`]).
#[derive(Debug)]
pub struct MasterLink<const DOF: usize> {
    name: String,
    socket: LinkSocket,
    monitor: Arc<LinkMonitor>,
    remote: JointVector<DOF>,
    send_buf: Vec<u8>,
    recv_buf: Vec<u8>,
}

impl<const DOF: usize> MasterLink<DOF> {
    /// Opens the link: parses the peer address, binds and connects the
    /// socket, and sizes its send buffer for `send_buffer_frames`
    /// outbound frames.
    ///
    /// The link starts unlinked with a saturated miss counter; it cannot
    /// be linked until the peer is heard.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportInitError`] naming the failing setup step.
    /// No partially-usable link is ever returned.
    pub fn open(config: LinkConfig) -> Result<Self, TransportInitError> {
        let remote = Endpoint::resolve(&config.remote_host, config.port).map_err(|source| {
            TransportInitError::RemoteAddr {
                host: config.remote_host.clone(),
                source,
            }
        })?;

        let min_send_buffer = config.send_buffer_frames * wire::outbound_frame_len(DOF);
        let socket = LinkSocket::open(config.bind_port(), remote, min_send_buffer)?;

        info!(link = %config.name, peer = %remote, dof = DOF, "link open");

        Ok(Self {
            name: config.name,
            socket,
            monitor: Arc::new(LinkMonitor::new()),
            remote: JointVector::zeros(),
            send_buf: Vec::with_capacity(wire::outbound_frame_len(DOF)),
            recv_buf: vec![0u8; MAX_DATAGRAM_SIZE],
        })
    }

    /// Runs one exchange tick. Never blocks.
    ///
    /// Sends the local state, drains all pending inbound frames into the
    /// remote position estimate, and returns the estimate to publish.
    /// While the link is down the estimate tracks `local`'s position, so
    /// consumers see neither stale data nor a jump at relink time.
    pub fn operate(&mut self, local: &JointState<DOF>) -> &JointVector<DOF> {
        wire::encode_state(local, &mut self.send_buf);
        // Best-effort delivery: a failed or would-block send surfaces only
        // through the peer's miss counter.
        let _ = self.socket.try_send(&self.send_buf);

        self.monitor.record_miss();

        loop {
            let Ok(Some(len)) = self.socket.try_recv(&mut self.recv_buf) else {
                break;
            };
            match wire::decode_position::<DOF>(&self.recv_buf[..len]) {
                Decoded::Full(position) => {
                    self.remote = position;
                    self.monitor.record_receipt();
                }
                Decoded::Partial4(head) => {
                    // Lower-DOF peer: its joints land in 0..4, the rest
                    // hold at the local position.
                    self.remote.0[..PARTIAL_ELEMS].copy_from_slice(&head);
                    self.remote.0[PARTIAL_ELEMS..]
                        .copy_from_slice(&local.position.0[PARTIAL_ELEMS..]);
                    self.monitor.record_receipt();
                }
                Decoded::OversizedValid => self.monitor.record_receipt(),
                Decoded::Incomplete => break,
            }
        }

        if !self.monitor.is_linked() || self.monitor.lapsed() {
            if self.monitor.unlink() {
                debug!(link = %self.name, "link down, mirroring local position");
            }
            self.remote = local.position;
        }

        &self.remote
    }

    /// Whether the remote position estimate is currently trusted.
    #[must_use]
    pub fn is_linked(&self) -> bool {
        self.monitor.is_linked()
    }

    /// Requests the link-up transition; a no-op while the peer is silent.
    /// Returns the linked state afterward.
    pub fn try_link(&self) -> bool {
        self.monitor.try_link()
    }

    /// Unconditionally forces the link down.
    pub fn unlink(&self) {
        self.monitor.unlink();
    }

    /// Returns a cloneable control surface for a supervisory thread.
    #[must_use]
    pub fn handle(&self) -> LinkHandle {
        LinkHandle {
            monitor: Arc::clone(&self.monitor),
        }
    }

    /// The latest published remote position estimate.
    #[must_use]
    pub fn remote_position(&self) -> &JointVector<DOF> {
        &self.remote
    }

    /// Display name from the configuration.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Local address the link socket is bound to.
    ///
    /// # Errors
    ///
    /// Returns an error if the local address cannot be retrieved.
    pub fn local_addr(&self) -> std::io::Result<Endpoint> {
        self.socket.local_addr()
    }

    /// The peer this link is connected to.
    ///
    /// # Errors
    ///
    /// Returns an error if the peer address cannot be retrieved.
    pub fn peer_addr(&self) -> std::io::Result<Endpoint> {
        self.socket.peer_addr()
    }
}

/// Shared link/unlink controls for threads outside the scheduler.
///
/// Backed by the same atomics the exchange loop reads; calls are safe
/// concurrently with [`MasterLink::operate`].
#[derive(Clone)]
pub struct LinkHandle {
    monitor: Arc<LinkMonitor>,
}

impl LinkHandle {
    /// Whether the remote position estimate is currently trusted.
    #[must_use]
    pub fn is_linked(&self) -> bool {
        self.monitor.is_linked()
    }

    /// Requests the link-up transition; a no-op while the peer is silent.
    /// Returns the linked state afterward.
    pub fn try_link(&self) -> bool {
        self.monitor.try_link()
    }

    /// Unconditionally forces the link down.
    pub fn unlink(&self) {
        self.monitor.unlink();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::UdpSocket as StdUdpSocket;

    #[test]
    fn bad_remote_host_is_fatal() {
        let err = MasterLink::<7>::open(LinkConfig::new("wam-left.local").with_local_port(0))
            .unwrap_err();
        assert!(matches!(err, TransportInitError::RemoteAddr { host, .. } if host == "wam-left.local"));
    }

    #[test]
    fn handle_shares_monitor_state() {
        let peer = StdUdpSocket::bind("127.0.0.1:0").unwrap();
        let peer_port = peer.local_addr().unwrap().port();
        let link = MasterLink::<7>::open(
            LinkConfig::new("127.0.0.1")
                .with_port(peer_port)
                .with_local_port(0),
        )
        .unwrap();

        let handle = link.handle();
        assert!(!handle.is_linked());
        // Saturated at start: the request must not take
        assert!(!handle.try_link());
        assert!(!link.is_linked());
    }
}
