//! Fixed-Capacity Payload Buffer
//!
//! Storage for the 3 × 7-byte packets of one transmission, written one
//! bit at a time as the state machine slices them off the air. The write
//! path is bounds-checked: an index outside the buffer is refused with an
//! error instead of wrapping or touching adjacent memory, because the
//! writer runs in interrupt-adjacent code where corruption would be
//! unrecoverable and undebuggable.
//!
//! Bits are addressed MSB-first within each byte, matching the order the
//! sensor clocks them onto the air.

use crate::constants::{BITS_PER_PACKET, PACKETS_PER_TRANSMISSION};
use crate::errors::DecodeError;
use crate::packet::RawPacket;

/// Bit-addressable storage for one transmission's packets.
#[derive(Debug, Clone)]
pub struct PayloadBuffer {
    packets: [RawPacket; PACKETS_PER_TRANSMISSION],
}

impl PayloadBuffer {
    /// Create a zeroed buffer. Usable in const/static context.
    pub const fn new() -> Self {
        Self {
            packets: [RawPacket::ZERO; PACKETS_PER_TRANSMISSION],
        }
    }

    /// Write one payload bit at `(packet, bit)`.
    ///
    /// `bit` counts from the start of the packet, MSB of byte 0 first.
    /// Out-of-range indices leave the buffer untouched and return
    /// [`DecodeError::BitOutOfRange`].
    pub fn write_bit(&mut self, packet: usize, bit: usize, value: bool) -> Result<(), DecodeError> {
        if packet >= PACKETS_PER_TRANSMISSION || bit >= BITS_PER_PACKET {
            return Err(DecodeError::BitOutOfRange {
                packet: packet as u8,
                bit: bit as u8,
            });
        }

        let byte = bit / 8;
        let mask = 1u8 << (7 - (bit % 8));

        let bytes = self.packets[packet].bytes_mut();
        if value {
            bytes[byte] |= mask;
        } else {
            bytes[byte] &= !mask;
        }
        Ok(())
    }

    /// Borrow one captured packet.
    pub fn packet(&self, index: usize) -> Option<&RawPacket> {
        self.packets.get(index)
    }

    /// All packet slots in capture order (including not-yet-written ones).
    pub fn packets(&self) -> &[RawPacket] {
        &self.packets
    }

    /// Zero every slot for the next transmission.
    pub fn clear(&mut self) {
        self.packets = [RawPacket::ZERO; PACKETS_PER_TRANSMISSION];
    }
}

impl Default for PayloadBuffer {
    fn default() -> Self {
        Self::new()
    }
}
