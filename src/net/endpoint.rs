//! Network endpoint types.

use std::net::{AddrParseError, IpAddr, Ipv4Addr, SocketAddr, SocketAddrV4};
use std::str::FromStr;

/// A network endpoint (IP address + port).
///
/// Wrapper around [`SocketAddr`] that provides a stable API across
/// transport backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint(SocketAddr);

impl Endpoint {
    /// Creates a new IPv4 endpoint.
    #[must_use]
    pub const fn new_v4(a: u8, b: u8, c: u8, d: u8, port: u16) -> Self {
        Self(SocketAddr::V4(SocketAddrV4::new(
            Ipv4Addr::new(a, b, c, d),
            port,
        )))
    }

    /// Creates an endpoint bound to all interfaces (0.0.0.0) on the given port.
    #[must_use]
    pub const fn any(port: u16) -> Self {
        Self::new_v4(0, 0, 0, 0, port)
    }

    /// Creates a localhost endpoint on the given port.
    #[must_use]
    pub const fn localhost(port: u16) -> Self {
        Self::new_v4(127, 0, 0, 1, port)
    }

    /// Parses a textual IPv4 address (e.g. `"192.168.1.20"`) into an
    /// endpoint on the given port.
    ///
    /// # Errors
    ///
    /// Returns an error if `host` is not a valid dotted-quad IPv4 address.
    pub fn resolve(host: &str, port: u16) -> Result<Self, AddrParseError> {
        let addr = Ipv4Addr::from_str(host)?;
        Ok(Self(SocketAddr::V4(SocketAddrV4::new(addr, port))))
    }

    /// Returns the IP address.
    #[must_use]
    pub const fn ip(&self) -> IpAddr {
        self.0.ip()
    }

    /// Returns the port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.0.port()
    }

    /// Returns the underlying [`SocketAddr`].
    #[must_use]
    pub const fn as_socket_addr(&self) -> SocketAddr {
        self.0
    }
}

impl From<SocketAddr> for Endpoint {
    fn from(addr: SocketAddr) -> Self {
        Self(addr)
    }
}

impl From<Endpoint> for SocketAddr {
    fn from(ep: Endpoint) -> Self {
        ep.0
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_new_v4() {
        let ep = Endpoint::new_v4(192, 168, 1, 100, 5553);
        assert_eq!(ep.ip(), IpAddr::V4(Ipv4Addr::new(192, 168, 1, 100)));
        assert_eq!(ep.port(), 5553);
    }

    #[test]
    fn endpoint_any() {
        let ep = Endpoint::any(9000);
        assert_eq!(ep.ip(), IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(ep.port(), 9000);
    }

    #[test]
    fn resolve_dotted_quad() {
        let ep = Endpoint::resolve("10.0.0.7", 5553).unwrap();
        assert_eq!(ep.ip(), IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7)));
        assert_eq!(ep.port(), 5553);
    }

    #[test]
    fn resolve_rejects_garbage() {
        assert!(Endpoint::resolve("not-an-address", 5553).is_err());
        assert!(Endpoint::resolve("10.0.0", 5553).is_err());
    }

    #[test]
    fn endpoint_display() {
        let ep = Endpoint::localhost(5553);
        assert_eq!(format!("{ep}"), "127.0.0.1:5553");
    }
}
