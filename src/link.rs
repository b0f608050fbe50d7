//! Master-to-master joint state exchange.
//!
//! Two peers run the same loop: every scheduler tick each side sends one
//! frame of local state and drains whatever the other side delivered since
//! the last tick. There is no handshake, no retransmission and no ordering;
//! a consecutive-miss counter is the only link-health mechanism.
//!
//! ## Wire Format
//!
//! All values are native-endian `f64`; both peers must share endianness
//! and word layout. For a link with `DOF` joints:
//!
//! | Frame | Layout | Size (bytes) |
//! |-------|--------|--------------|
//! | Outbound state | `[position: DOF][velocity: DOF][torque: DOF]` | `DOF * 24` |
//! | Full position | `[position: DOF]` | `DOF * 8` |
//! | Partial position | `[position: 4]` | `32` |
//!
//! Inbound datagrams are classified purely by size (see
//! [`wire::Decoded`]). Anything longer than a full position frame counts
//! as received with the excess ignored; anything shorter than the
//! recognized sizes ends the drain for the tick.
//!
//! ## Link State
//!
//! ```text
//!              try_link() && missed < 10
//!   Unlinked ─────────────────────────────> Linked
//!      ^                                       │
//!      └───────────────────────────────────────┘
//!        unlink()  or  missed reaches 10
//! ```
//!
//! While unlinked the published remote position tracks the local position,
//! so downstream consumers never see stale data or a jump at relink time.

pub mod config;
pub mod master;
pub mod monitor;
pub mod wire;

pub use config::LinkConfig;
pub use master::{LinkHandle, MasterLink};
pub use monitor::LinkMonitor;
pub use wire::Decoded;
