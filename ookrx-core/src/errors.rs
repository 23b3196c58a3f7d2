//! Error Types for the Decoder
//!
//! ## Design Philosophy
//!
//! Errors here follow the same rules as the rest of the crate:
//!
//! 1. **Small and Copy**: every variant is a handful of integers, so
//!    errors can be returned from the edge-handling hot path and stored
//!    without allocation.
//! 2. **No Heap**: no `String`, only inline data.
//! 3. **Non-Fatal by Construction**: nothing in this crate panics on a
//!    bad radio frame. A decode error means one dropped reading; the
//!    sensor retransmits periodically and the next burst self-heals.
//!
//! ## Taxonomy
//!
//! - [`DecodeError`]: internal invariant violations in the bit-capture
//!    path. `BitOutOfRange` should never occur given the state machine's
//!    own index management; it exists as a defensive bound and aborts the
//!    transmission it occurs in.
//! - [`PacketError`]: per-packet integrity failures (parity, checksum).
//!    Expected under radio noise; the next packet copy is tried.
//! - [`RegistryError`]: misconfiguration at registration time.

use thiserror_no_std::Error;

/// Errors from the bit-capture path (state machine and payload buffer).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// A payload write targeted an index outside the 3×56-bit buffer.
    ///
    /// Indicates a logic bug in the state machine, not a radio problem;
    /// the write is refused and the current transmission is aborted.
    #[error("payload write out of range: packet {packet}, bit {bit}")]
    BitOutOfRange {
        /// Packet index that was targeted (valid: 0..3)
        packet: u8,
        /// Bit index that was targeted (valid: 0..56)
        bit: u8,
    },
}

/// Integrity failures for a single 7-byte packet.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketError {
    /// A protected byte (2..=5) failed its even-parity check.
    #[error("parity check failed on byte {byte}")]
    ParityFailed {
        /// Index of the offending byte within the packet
        byte: u8,
    },

    /// Byte 6 does not equal the sum of bytes 0..=5 mod 256.
    #[error("checksum mismatch: expected {expected:#04x}, computed {computed:#04x}")]
    ChecksumMismatch {
        /// Checksum byte carried in the packet
        expected: u8,
        /// Checksum recomputed over bytes 0..=5
        computed: u8,
    },
}

/// Errors raised when wiring up the device registry.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// The device id is already mapped to a sink.
    #[error("device {id:#06x} already registered")]
    DuplicateDevice {
        /// The 16-bit composite device id
        id: u16,
    },

    /// No free registry slots.
    #[error("registry full")]
    RegistryFull,
}

#[cfg(feature = "defmt")]
impl defmt::Format for DecodeError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::BitOutOfRange { packet, bit } => {
                defmt::write!(fmt, "payload write out of range: packet {}, bit {}", packet, bit)
            }
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PacketError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::ParityFailed { byte } => {
                defmt::write!(fmt, "parity check failed on byte {}", byte)
            }
            Self::ChecksumMismatch { expected, computed } => {
                defmt::write!(fmt, "checksum mismatch: expected {:#04x}, computed {:#04x}", expected, computed)
            }
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for RegistryError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::DuplicateDevice { id } => {
                defmt::write!(fmt, "device {:#06x} already registered", id)
            }
            Self::RegistryFull => defmt::write!(fmt, "registry full"),
        }
    }
}
