//! Frame encode/decode for the joint state exchange.
//!
//! Encoding is deterministic and fixed-size. Decoding never fails hard:
//! datagrams may be truncated non-deterministically by the transport, so
//! unrecognized small sizes classify as [`Decoded::Incomplete`] rather
//! than an error.

use crate::joint::{JointState, JointVector};

/// Width of one wire element.
pub const ELEM_SIZE: usize = core::mem::size_of::<f64>();

/// Number of joints carried by a partial position frame.
pub const PARTIAL_ELEMS: usize = 4;

/// Size of a partial position frame.
pub const PARTIAL_FRAME_LEN: usize = PARTIAL_ELEMS * ELEM_SIZE;

/// Size of the outbound state frame for a `dof`-joint link.
#[must_use]
pub const fn outbound_frame_len(dof: usize) -> usize {
    dof * 3 * ELEM_SIZE
}

/// Size of a full inbound position frame for a `dof`-joint link.
#[must_use]
pub const fn position_frame_len(dof: usize) -> usize {
    dof * ELEM_SIZE
}

/// Classification of one inbound datagram.
///
/// The variants are exhaustive on purpose: the size dispatch is the one
/// place correctness silently breaks when `DOF` changes, so every case is
/// spelled out and matched in declaration order (`Full` wins over
/// `Partial4` when `DOF == 4` makes both sizes coincide).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decoded<const DOF: usize> {
    /// Exactly `DOF` joints: replaces the remote position wholesale.
    Full(JointVector<DOF>),
    /// Exactly four joints from a lower-DOF peer: the first four remote
    /// joints update, the rest hold at the local position.
    Partial4([f64; PARTIAL_ELEMS]),
    /// Longer than a full frame: counts as received, excess payload
    /// ignored (kept as a forward-compatibility allowance).
    OversizedValid,
    /// Smaller than any recognized frame: nothing more to read this tick.
    Incomplete,
}

/// Encodes the local state into `buf` as one outbound frame.
///
/// `buf` is cleared and refilled; callers reuse one allocation across
/// ticks (`Vec::clear` preserves capacity).
pub fn encode_state<const DOF: usize>(state: &JointState<DOF>, buf: &mut Vec<u8>) {
    buf.clear();
    buf.reserve(outbound_frame_len(DOF));
    for vector in [&state.position, &state.velocity, &state.torque] {
        for value in vector.as_slice() {
            buf.extend_from_slice(&value.to_ne_bytes());
        }
    }
}

/// Classifies one inbound datagram by size and decodes its payload.
#[must_use]
pub fn decode_position<const DOF: usize>(bytes: &[u8]) -> Decoded<DOF> {
    let full = position_frame_len(DOF);
    if bytes.len() == full {
        Decoded::Full(JointVector(read_elems::<DOF>(bytes)))
    } else if bytes.len() == PARTIAL_FRAME_LEN && DOF > PARTIAL_ELEMS {
        Decoded::Partial4(read_elems::<PARTIAL_ELEMS>(bytes))
    } else if bytes.len() > full {
        Decoded::OversizedValid
    } else {
        Decoded::Incomplete
    }
}

/// Reads the first `N` native-endian doubles out of `bytes`.
fn read_elems<const N: usize>(bytes: &[u8]) -> [f64; N] {
    let mut out = [0.0; N];
    for (value, chunk) in out.iter_mut().zip(bytes.chunks_exact(ELEM_SIZE)) {
        let mut raw = [0u8; ELEM_SIZE];
        raw.copy_from_slice(chunk);
        *value = f64::from_ne_bytes(raw);
    }
    out
}
