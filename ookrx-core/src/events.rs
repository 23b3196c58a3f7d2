//! Event and Reading Types
//!
//! ## Overview
//!
//! Two kinds of values flow through the receiver:
//!
//! - [`EdgeEvent`]: one electrical transition on the receiver pin,
//!   produced by the edge interrupt and carried through the SPSC queue to
//!   the decoding context. Deliberately minimal: the interrupt handler
//!   does nothing but read the pin, read the clock, and enqueue.
//! - [`Reading`]: one decoded, validated sensor report, handed to the
//!   registered [`crate::registry::ReadingSink`] for the matching device.
//!
//! ## Memory Model
//!
//! Both types are small `Copy` structs: an `EdgeEvent` is 16 bytes and
//! lives in a fixed ring buffer slot, a `Reading` is stack-only. Nothing
//! here allocates.

use crate::time::Timestamp;

/// Electrical level of the receiver pin after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PinLevel {
    /// Line idle / gap in progress.
    Low = 0,
    /// Carrier present / pulse in progress.
    High = 1,
}

impl PinLevel {
    /// Level from a raw pin read (non-zero = high).
    pub const fn from_raw(raw: u8) -> Self {
        if raw == 0 {
            PinLevel::Low
        } else {
            PinLevel::High
        }
    }
}

/// One transition observed on the receiver pin.
///
/// `level` is the level *after* the transition: a `High` event is a
/// rising edge, and the time since the previous event measures the gap
/// that just ended; a `Low` event is a falling edge measuring the pulse
/// that just ended. Durations are derived by the decoder from
/// consecutive timestamps, so the interrupt handler carries no state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EdgeEvent {
    /// Pin level after the transition.
    pub level: PinLevel,
    /// Microsecond timestamp of the transition.
    pub timestamp: Timestamp,
}

impl EdgeEvent {
    /// Event for a transition to `level` at `timestamp`.
    pub const fn new(level: PinLevel, timestamp: Timestamp) -> Self {
        Self { level, timestamp }
    }

    /// Placeholder value for ring buffer initialization.
    pub(crate) const EMPTY: Self = Self::new(PinLevel::Low, 0);
}

/// A decoded sensor report, delivered once per validated transmission.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    /// Temperature in Celsius, 0.1 °C resolution.
    pub temperature_celsius: f32,
    /// Relative humidity in percent (0..=100 from a healthy sensor).
    pub humidity_percent: u8,
    /// Battery state reported by the sensor (true = OK).
    pub battery_ok: bool,
}
