//! Packet Parser & Validator
//!
//! ## Wire Format
//!
//! Each packet carries 7 bytes, MSB first:
//!
//! ```text
//! | Byte 0    | Byte 1    | Byte 2    | Byte 3    | Byte 4    | Byte 5    | Byte 6    |
//! | --------- | --------- | --------- | --------- | --------- | --------- | --------- |
//! | CCII IIII | IIII IIII | pB00 0100 | pHHH HHHH | p??? TTTT | pTTT TTTT | KKKK KKKK |
//! ```
//!
//! - `C`: 2-bit channel, `I`: 14-bit serial. Together they form the
//!   16-bit device id used as the registry key.
//! - `B`: battery OK flag.
//! - `H`: relative humidity, percent.
//! - `T`: 11-bit temperature, Celsius tenths biased by +1000.
//! - `p`: even-parity bit over the whole byte (bytes 2..=5 only).
//! - `K`: checksum, sum of bytes 0..=5 mod 256.
//!
//! ## Validation Policy
//!
//! [`DecodedPacket::decode`] always extracts every field and records
//! overall validity in the `valid` flag; the caller decides whether to
//! trust an invalid packet (diagnostics do, dispatch does not).
//! [`DecodedPacket::parse`] is the strict variant that reports *why* a
//! packet failed.

use crate::constants::{BYTES_PER_PACKET, TEMPERATURE_BIAS_TENTHS};
use crate::errors::PacketError;

/// Byte indices protected by a per-byte even-parity bit.
const PARITY_BYTES: core::ops::RangeInclusive<usize> = 2..=5;

/// One captured 7-byte packet, exactly as received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawPacket([u8; BYTES_PER_PACKET]);

impl RawPacket {
    /// All-zero packet, used for buffer initialization.
    pub const ZERO: Self = Self([0; BYTES_PER_PACKET]);

    /// Packet from raw captured bytes.
    pub const fn new(bytes: [u8; BYTES_PER_PACKET]) -> Self {
        Self(bytes)
    }

    /// The raw bytes, exactly as received.
    pub const fn bytes(&self) -> &[u8; BYTES_PER_PACKET] {
        &self.0
    }

    pub(crate) fn bytes_mut(&mut self) -> &mut [u8; BYTES_PER_PACKET] {
        &mut self.0
    }

    /// Checksum over bytes 0..=5, mod 256.
    pub fn computed_checksum(&self) -> u8 {
        self.0[..6]
            .iter()
            .fold(0u8, |sum, &byte| sum.wrapping_add(byte))
    }
}

impl From<[u8; BYTES_PER_PACKET]> for RawPacket {
    fn from(bytes: [u8; BYTES_PER_PACKET]) -> Self {
        Self(bytes)
    }
}

/// True when `byte` has an even number of set bits.
///
/// The parity bit is the MSB of the byte and is included in the count,
/// so a correctly stamped byte always comes out even.
pub const fn has_even_parity(byte: u8) -> bool {
    byte.count_ones() % 2 == 0
}

/// Compose the 16-bit registry key from a 2-bit channel and 14-bit serial.
pub const fn device_id(channel: u8, serial: u16) -> u16 {
    ((channel as u16 & 0x03) << 14) | (serial & 0x3FFF)
}

/// Fields extracted from one packet, plus overall validity.
///
/// Immutable once produced; derived purely from the raw bytes.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecodedPacket {
    /// 16-bit composite id: channel in the top 2 bits, serial below.
    pub device_id: u16,
    /// Battery state (true = OK).
    pub battery_ok: bool,
    /// Relative humidity, percent.
    pub humidity_percent: u8,
    /// Temperature in Celsius tenths (bias already removed).
    pub temperature_tenths: i16,
    /// True iff all four parity checks pass and the checksum matches.
    ///
    /// Authoritative for whether to act on the reading.
    pub valid: bool,
}

impl DecodedPacket {
    /// Extract all fields from `raw`, flagging validity.
    ///
    /// Extraction happens regardless of integrity: diagnostics want the
    /// fields of a corrupt packet too.
    pub fn decode(raw: &RawPacket) -> Self {
        let b = raw.bytes();

        let device_id = (b[0] as u16) << 8 | b[1] as u16;
        let battery_ok = (b[2] >> 6) & 0x01 == 1;
        let humidity_percent = b[3] & 0x7F;

        let raw_temperature = ((b[4] as u16) << 7) & 0x0780 | (b[5] as u16) & 0x007F;
        let temperature_tenths = raw_temperature as i16 - TEMPERATURE_BIAS_TENTHS;

        let parity_ok = PARITY_BYTES.clone().all(|i| has_even_parity(b[i]));
        let valid = parity_ok && raw.computed_checksum() == b[6];

        Self {
            device_id,
            battery_ok,
            humidity_percent,
            temperature_tenths,
            valid,
        }
    }

    /// Strict decode: `Err` with the first integrity failure.
    ///
    /// Parity is checked byte by byte before the checksum, mirroring the
    /// order of protection on the wire.
    pub fn parse(raw: &RawPacket) -> Result<Self, PacketError> {
        let b = raw.bytes();

        for i in PARITY_BYTES {
            if !has_even_parity(b[i]) {
                return Err(PacketError::ParityFailed { byte: i as u8 });
            }
        }

        let computed = raw.computed_checksum();
        if computed != b[6] {
            return Err(PacketError::ChecksumMismatch {
                expected: b[6],
                computed,
            });
        }

        Ok(Self::decode(raw))
    }

    /// Temperature in Celsius, 0.1 °C resolution.
    pub fn temperature_celsius(&self) -> f32 {
        self.temperature_tenths as f32 / 10.0
    }

    /// The 2-bit channel the sensor is switched to.
    pub const fn channel(&self) -> u8 {
        (self.device_id >> 14) as u8
    }

    /// The sensor's 14-bit serial number.
    pub const fn serial(&self) -> u16 {
        self.device_id & 0x3FFF
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Reference capture: channel 2, serial 0x1234, battery OK,
    /// 45 % RH, 25.0 °C.
    const REFERENCE: [u8; 7] = [0x92, 0x34, 0x44, 0x2D, 0x09, 0xE2, 0x22];

    /// Stamp parity bits on bytes 2..=5 and the checksum on byte 6.
    fn stamp(bytes: &mut [u8; 7]) {
        for i in 2..=5 {
            bytes[i] &= 0x7F;
            if bytes[i].count_ones() % 2 == 1 {
                bytes[i] |= 0x80;
            }
        }
        bytes[6] = bytes[..6].iter().fold(0u8, |s, &b| s.wrapping_add(b));
    }

    #[test]
    fn reference_packet_decodes() {
        let decoded = DecodedPacket::decode(&RawPacket::new(REFERENCE));

        assert!(decoded.valid);
        assert_eq!(decoded.device_id, 0x9234);
        assert_eq!(decoded.channel(), 2);
        assert_eq!(decoded.serial(), 0x1234);
        assert!(decoded.battery_ok);
        assert_eq!(decoded.humidity_percent, 45);
        assert_eq!(decoded.temperature_tenths, 250);
        assert_eq!(decoded.temperature_celsius(), 25.0);
    }

    #[test]
    fn reference_packet_parses() {
        assert!(DecodedPacket::parse(&RawPacket::new(REFERENCE)).is_ok());
    }

    #[test]
    fn temperature_bias_mapping() {
        // raw 1250 → 25.0 °C
        let mut warm = [0x92, 0x34, 0x44, 0x2D, 0x00, 0x00, 0x00];
        warm[4] = ((1250u16 >> 7) & 0x0F) as u8;
        warm[5] = (1250u16 & 0x7F) as u8;
        stamp(&mut warm);
        let decoded = DecodedPacket::decode(&RawPacket::new(warm));
        assert!(decoded.valid);
        assert_eq!(decoded.temperature_celsius(), 25.0);

        // raw 950 → −5.0 °C
        let mut cold = warm;
        cold[4] = ((950u16 >> 7) & 0x0F) as u8;
        cold[5] = (950u16 & 0x7F) as u8;
        stamp(&mut cold);
        let decoded = DecodedPacket::decode(&RawPacket::new(cold));
        assert!(decoded.valid);
        assert_eq!(decoded.temperature_celsius(), -5.0);
    }

    #[test]
    fn single_bit_flip_in_protected_bytes_invalidates() {
        for byte in 2..=5 {
            for bit in 0..8 {
                let mut mutated = REFERENCE;
                mutated[byte] ^= 1 << bit;
                let decoded = DecodedPacket::decode(&RawPacket::new(mutated));
                assert!(
                    !decoded.valid,
                    "flip of byte {byte} bit {bit} went undetected"
                );
            }
        }
    }

    #[test]
    fn checksum_byte_mutation_invalidates() {
        let mut mutated = REFERENCE;
        mutated[6] ^= 0x01;

        let err = DecodedPacket::parse(&RawPacket::new(mutated)).unwrap_err();
        assert_eq!(
            err,
            crate::errors::PacketError::ChecksumMismatch {
                expected: 0x23,
                computed: 0x22,
            }
        );
    }

    #[test]
    fn parity_failure_reports_first_bad_byte() {
        let mut mutated = REFERENCE;
        mutated[3] ^= 0x01;
        // Keep the checksum consistent so parity is the only failure.
        mutated[6] = mutated[..6].iter().fold(0u8, |s, &b| s.wrapping_add(b));

        let err = DecodedPacket::parse(&RawPacket::new(mutated)).unwrap_err();
        assert_eq!(err, crate::errors::PacketError::ParityFailed { byte: 3 });
    }

    #[test]
    fn device_id_composition() {
        assert_eq!(device_id(2, 0x1234), 0x9234);
        assert_eq!(device_id(0, 0), 0);
        // Out-of-range inputs are masked, never spill.
        assert_eq!(device_id(0xFF, 0xFFFF), 0xFFFF);
    }

    proptest! {
        #[test]
        fn stamped_packets_round_trip(
            channel in 0u8..4,
            serial in 0u16..0x4000,
            battery_ok in any::<bool>(),
            humidity in 0u8..=100,
            temperature_tenths in -400i16..=700,
        ) {
            let id = device_id(channel, serial);
            let raw_temp = (temperature_tenths + 1000) as u16;

            let mut bytes = [0u8; 7];
            bytes[0] = (id >> 8) as u8;
            bytes[1] = id as u8;
            bytes[2] = 0x04 | if battery_ok { 0x40 } else { 0x00 };
            bytes[3] = humidity & 0x7F;
            bytes[4] = ((raw_temp >> 7) & 0x0F) as u8;
            bytes[5] = (raw_temp & 0x7F) as u8;
            stamp(&mut bytes);

            let decoded = DecodedPacket::decode(&RawPacket::new(bytes));
            prop_assert!(decoded.valid);
            prop_assert_eq!(decoded.device_id, id);
            prop_assert_eq!(decoded.channel(), channel);
            prop_assert_eq!(decoded.serial(), serial);
            prop_assert_eq!(decoded.battery_ok, battery_ok);
            prop_assert_eq!(decoded.humidity_percent, humidity);
            prop_assert_eq!(decoded.temperature_tenths, temperature_tenths);
        }
    }
}
