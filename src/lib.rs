//! Real-time bilateral teleoperation link.
//!
//! `tether` keeps two independent robot control loops ("masters") mirrored
//! over an unreliable UDP link. Each side runs a [`MasterLink`] inside its
//! periodic real-time scheduler: once per tick the link sends the local
//! joint state, drains whatever the peer managed to deliver, and publishes
//! the freshest remote position it trusts. Delivery is strictly best-effort;
//! the only health signal is a consecutive-miss counter that forces the link
//! down after ten silent ticks.
//!
//! The per-tick path never blocks: the socket is non-blocking by
//! construction and all runtime I/O errors are absorbed into the miss
//! counter.

pub mod joint;
pub mod link;
pub mod net;

mod trace;

pub use trace::init_tracing;

pub use joint::{JointState, JointVector};
pub use link::{LinkConfig, LinkHandle, LinkMonitor, MasterLink};
pub use net::{Endpoint, TransportInitError};
