//! Network transport primitives.
//!
//! Provides the pre-connected non-blocking UDP socket the exchange loop
//! runs on. Endpoint types are kept backend-agnostic so the codec and
//! exchange-loop logic never touch raw socket APIs.

pub mod endpoint;
pub mod socket;

pub use endpoint::Endpoint;
pub use socket::{LinkSocket, TransportInitError};
