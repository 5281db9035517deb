// SPDX-License-Identifier: MIT OR Apache-2.0
//! Change fingerprints for applied keyframe states.
//!
//! A sequence remembers the fingerprint of the last state it wrote into its
//! target and only reports a change when the next evaluation produces a
//! different one. Numeric states compare by value. Opaque state blobs are
//! summarized with a 64-bit FNV-1a hash, so two distinct blobs collide with
//! a probability of roughly 2^-64; a collision only hides a single "changed"
//! report, it never corrupts the target.

use std::fmt;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Summary of an applied state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Fingerprint {
    /// Nothing has been applied since the cache was last reset
    #[default]
    Never,
    /// Hash of an opaque state blob
    State(u64),
    /// Bit pattern of a numeric value
    Numeric(u64),
}

impl Fingerprint {
    /// Fingerprint an opaque state blob
    pub fn of_state(state: &str) -> Self {
        Self::State(fnv1a(state.as_bytes()))
    }

    /// Fingerprint a numeric value.
    ///
    /// `-0.0` and `0.0` produce the same fingerprint.
    pub fn of_number(value: f64) -> Self {
        let value = if value == 0.0 { 0.0 } else { value };
        Self::Numeric(value.to_bits())
    }

    /// Whether this is the "never applied" sentinel
    pub fn is_never(&self) -> bool {
        matches!(self, Self::Never)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Never => write!(f, "never"),
            Self::State(hash) => write!(f, "state:{hash:016x}"),
            Self::Numeric(bits) => write!(f, "number:{}", f64::from_bits(*bits)),
        }
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}
