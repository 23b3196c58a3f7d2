//! Protocol Constants for the OOK Sensor Link
//!
//! Centralized timing and geometry constants for the supported sensor
//! protocol. All numeric values live here with their units and the
//! rationale for choosing them; the rest of the crate never uses magic
//! numbers for protocol timing.
//!
//! The timings describe a 433 MHz 3-channel temperature/humidity sensor
//! that transmits each reading as three identical 7-byte packets, each
//! preceded by a 4-bit sync preamble.

// ===== PREAMBLE TIMING =====

/// Nominal width of a sync pulse (µs).
///
/// The preamble alternates pulses and gaps of roughly equal width.
/// Measured from live captures; individual units drift noticeably, hence
/// the wide tolerance.
pub const SYNC_PULSE_US: u32 = 632;

/// Tolerance applied when matching a sync pulse (µs).
pub const SYNC_PULSE_TOLERANCE_US: u32 = 350;

/// Nominal width of a sync gap (µs).
pub const SYNC_GAP_US: u32 = 580;

/// Tolerance applied when matching a sync gap (µs).
pub const SYNC_GAP_TOLERANCE_US: u32 = 350;

// ===== FRAMING TIMING =====

/// Nominal gap between the repeated packets of one transmission (µs).
///
/// Distinctly longer than any payload gap, so it never collides with a
/// data bit; the tolerance is tighter than the sync tolerances for the
/// same reason.
pub const RESET_GAP_US: u32 = 2180;

/// Tolerance applied when matching the inter-packet reset gap (µs).
pub const RESET_GAP_TOLERANCE_US: u32 = 200;

/// Hard upper bound on any in-transmission silence (µs).
///
/// A gap this long cannot be followed by valid data. Used both by the
/// edge handler (give up on the current frame) and by the stall
/// supervisor (force completion when the link drops mid-burst). A hard
/// bound, not a tolerance band.
pub const CANCELLATION_LIMIT_US: u32 = 5_000;

// ===== PACKET GEOMETRY =====

/// Bytes in one packet.
pub const BYTES_PER_PACKET: usize = 7;

/// Bits in one packet.
pub const BITS_PER_PACKET: usize = BYTES_PER_PACKET * 8;

/// Identical packet copies per transmission.
pub const PACKETS_PER_TRANSMISSION: usize = 3;

/// Sync edges (half-bits) required before payload bits are read.
///
/// 4 full sync bits = 4 pulses + 4 gaps.
pub const SYNC_EDGES_REQUIRED: u8 = 8;

// ===== CAPACITIES =====

/// Default edge queue capacity (events). Must be a power of 2.
///
/// One packet is 56 pulse/gap pairs = 112 edges; 128 gives the consumer
/// a full packet of slack per polling interval.
pub const EDGE_QUEUE_CAPACITY: usize = 128;

/// Maximum registered devices per receiver.
///
/// The protocol has 3 channels; 8 leaves room for co-located units on
/// the same frequency.
pub const MAX_DEVICES: usize = 8;

/// Bias applied to the raw 11-bit temperature field.
///
/// The sensor encodes Celsius tenths offset by +1000 so negative
/// temperatures stay unsigned on the wire: raw 1250 → 25.0 °C,
/// raw 950 → −5.0 °C.
pub const TEMPERATURE_BIAS_TENTHS: i16 = 1000;
