//! Link construction parameters.

/// Default UDP port, used for both the bind side and the peer side.
pub const DEFAULT_PORT: u16 = 5553;

/// Default send-buffer depth in outbound frames.
pub const DEFAULT_SEND_BUFFER_FRAMES: usize = 5;

/// Construction parameters for a [`MasterLink`](crate::link::MasterLink).
///
/// In the common deployment both peers bind and target the same port on
/// different hosts, so a single `port` covers both sides; `local_port`
/// overrides the bind side for loopback or test setups (0 lets the OS
/// pick an ephemeral port).
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// Peer host, textual IPv4 address.
    pub remote_host: String,
    /// Peer port; also the bind port unless `local_port` is set.
    pub port: u16,
    /// Bind-port override.
    pub local_port: Option<u16>,
    /// Display name used in trace output.
    pub name: String,
    /// Minimum send-buffer capacity, in outbound frames.
    pub send_buffer_frames: usize,
}

impl LinkConfig {
    /// Creates a configuration for the given peer host with defaults for
    /// everything else.
    #[must_use]
    pub fn new(remote_host: impl Into<String>) -> Self {
        Self {
            remote_host: remote_host.into(),
            port: DEFAULT_PORT,
            local_port: None,
            name: "master-link".to_owned(),
            send_buffer_frames: DEFAULT_SEND_BUFFER_FRAMES,
        }
    }

    /// Builder-style setter for the peer port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Builder-style setter for the bind-port override.
    #[must_use]
    pub const fn with_local_port(mut self, port: u16) -> Self {
        self.local_port = Some(port);
        self
    }

    /// Builder-style setter for the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Builder-style setter for the send-buffer depth.
    ///
    /// # Panics
    ///
    /// Panics if `frames == 0`.
    #[must_use]
    pub fn with_send_buffer_frames(mut self, frames: usize) -> Self {
        assert!(frames > 0, "send_buffer_frames must be > 0");
        self.send_buffer_frames = frames;
        self
    }

    /// The port the local socket binds to.
    #[must_use]
    pub fn bind_port(&self) -> u16 {
        self.local_port.unwrap_or(self.port)
    }
}
