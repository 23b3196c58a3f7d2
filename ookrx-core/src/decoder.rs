//! Transmission State Machine and Stall Supervisor
//!
//! ## Overview
//!
//! The [`Decoder`] consumes one [`EdgeEvent`] at a time and reconstructs
//! up to three 7-byte packets per transmission. It runs entirely in the
//! consumer context, fed from the SPSC queue; the interrupt side never
//! touches decoder state.
//!
//! ## Protocol Shape
//!
//! A transmission starts with an 8-edge preamble of alternating
//! fixed-width pulses and gaps, then 56 payload bits, repeated three
//! times with a distinctive reset gap between copies:
//!
//! ```text
//! pulse gap pulse gap pulse gap pulse gap │ b0 b1 … b55 │ reset gap │ …
//! ╰──────────── preamble ────────────────╯ ╰─ payload ──╯
//! ```
//!
//! Preamble edges are matched against fixed bands to establish lock.
//! Payload bits are classified *relatively*: a bit is 1 when its pulse is
//! strictly wider than the gap that follows it. Relative classification
//! rides out per-unit clock drift that would defeat fixed thresholds over
//! 56 consecutive bits.
//!
//! ## Completion and Handoff
//!
//! The machine marks itself `Complete` when the third packet lands, when
//! an in-transmission gap exceeds the cancellation limit, or when the
//! stall supervisor ([`Decoder::poll_stall`]) notices the link went
//! silent mid-burst. After completion it writes nothing until
//! [`Decoder::reset`]; that is the handoff boundary to the consumer.

use crate::constants::{
    BITS_PER_PACKET, CANCELLATION_LIMIT_US, PACKETS_PER_TRANSMISSION, RESET_GAP_TOLERANCE_US,
    RESET_GAP_US, SYNC_EDGES_REQUIRED, SYNC_GAP_TOLERANCE_US, SYNC_GAP_US, SYNC_PULSE_TOLERANCE_US,
    SYNC_PULSE_US,
};
use crate::diag::diag_error;
use crate::events::{EdgeEvent, PinLevel};
use crate::packet::RawPacket;
use crate::payload::PayloadBuffer;
use crate::time::Timestamp;
use crate::timing::classify;

/// Observable phase of the state machine, derived from its counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecoderState {
    /// No transmission in progress.
    Idle,
    /// In the preamble, expecting the next sync pulse.
    SyncingPulse,
    /// In the preamble, expecting the next sync gap.
    SyncingGap,
    /// Preamble locked; slicing payload bits.
    ReadingPayload,
    /// Transmission finished (normally or forced); awaiting consumption.
    Complete,
}

/// Counters for decoder health, in the consumer context only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderStats {
    /// Transmissions that captured all three packets.
    pub completed: u32,
    /// Transmissions force-completed by a stall or an over-long gap.
    pub forced: u32,
    /// Preamble locks lost to a mistimed edge.
    pub sync_resets: u32,
    /// Transmissions aborted by an internal bounds error.
    pub aborted: u32,
}

/// The transmission state machine.
///
/// Owns all mutable decoding state ([`PayloadBuffer`] included); callers
/// interact through [`handle_edge`](Self::handle_edge),
/// [`poll_stall`](Self::poll_stall) and, after observing
/// [`is_complete`](Self::is_complete), the packet accessors and
/// [`reset`](Self::reset).
#[derive(Debug)]
pub struct Decoder {
    /// Correctly timed preamble edges seen so far (0..=8).
    sync_edges: u8,
    /// Packet currently being filled (0..3).
    packet_index: usize,
    /// Bit cursor within the current packet (0..56).
    bit_index: usize,
    /// Width of the pulse preceding the gap now being measured (µs).
    current_pulse_us: u32,
    /// Timestamp of the most recent edge.
    last_edge: Timestamp,
    /// Set once per transmission; no writes happen past it.
    completed: bool,
    payload: PayloadBuffer,
    stats: DecoderStats,
}

impl Decoder {
    /// Idle machine awaiting its first transmission.
    pub const fn new() -> Self {
        Self {
            sync_edges: 0,
            packet_index: 0,
            bit_index: 0,
            current_pulse_us: 0,
            last_edge: 0,
            completed: false,
            payload: PayloadBuffer::new(),
            stats: DecoderStats {
                completed: 0,
                forced: 0,
                sync_resets: 0,
                aborted: 0,
            },
        }
    }

    /// Feed one pin transition into the machine.
    ///
    /// Ignored after completion; the consumer must [`reset`](Self::reset)
    /// before the next transmission can be decoded.
    pub fn handle_edge(&mut self, edge: EdgeEvent) {
        if self.completed {
            return;
        }

        let duration = self.elapsed_us(edge.timestamp);
        self.last_edge = edge.timestamp;

        match edge.level {
            PinLevel::High => self.on_rising(duration),
            PinLevel::Low => self.on_falling(duration),
        }
    }

    /// Rising edge: `duration` is the width of the gap that just ended.
    fn on_rising(&mut self, duration: u32) {
        // A silence this long cannot be followed by valid data; hand the
        // partial capture to the consumer.
        if duration > CANCELLATION_LIMIT_US && self.sync_edges > 0 {
            self.completed = true;
            self.stats.forced += 1;
            return;
        }

        // Deliberate gap between the repeated packets of one
        // transmission: resync for the next copy, keep what we have.
        if classify(duration, RESET_GAP_US, RESET_GAP_TOLERANCE_US).is_match() {
            self.sync_edges = 0;
            self.bit_index = 0;
            return;
        }

        if self.sync_edges < SYNC_EDGES_REQUIRED {
            if classify(duration, SYNC_GAP_US, SYNC_GAP_TOLERANCE_US).is_match() {
                self.sync_edges += 1;
                if self.sync_edges == SYNC_EDGES_REQUIRED {
                    // Locked; payload bits start with the next pulse.
                    self.bit_index = 0;
                }
            } else {
                self.lose_sync();
            }
            return;
        }

        // Payload: one pulse/gap pair per bit, wider pulse means 1.
        let bit = self.current_pulse_us > duration;
        if let Err(err) = self.payload.write_bit(self.packet_index, self.bit_index, bit) {
            diag_error!("internal decoder error, aborting transmission: {}", err);
            let _ = err; // diagnostics only
            self.abort();
            return;
        }
        self.bit_index += 1;

        if self.bit_index == BITS_PER_PACKET {
            self.sync_edges = 0;
            self.bit_index = 0;
            self.packet_index += 1;
            if self.packet_index == PACKETS_PER_TRANSMISSION {
                self.completed = true;
                self.stats.completed += 1;
            }
        }
    }

    /// Falling edge: `duration` is the width of the pulse that just ended.
    fn on_falling(&mut self, duration: u32) {
        if self.sync_edges < SYNC_EDGES_REQUIRED {
            if classify(duration, SYNC_PULSE_US, SYNC_PULSE_TOLERANCE_US).is_match() {
                self.sync_edges += 1;
            } else {
                self.lose_sync();
            }
            return;
        }

        // Only recorded here; the comparison happens on the next rising
        // edge once the matching gap width is known.
        self.current_pulse_us = duration;
    }

    /// Stall supervisor: force completion when the link goes silent
    /// mid-transmission.
    ///
    /// Polled periodically from the consumer context. Without it a burst
    /// that dies after its first edge would leave the machine waiting
    /// forever for a completing edge.
    pub fn poll_stall(&mut self, now: Timestamp) {
        if self.completed || !self.in_progress() {
            return;
        }
        if now.saturating_sub(self.last_edge) > CANCELLATION_LIMIT_US as u64 {
            self.completed = true;
            self.stats.forced += 1;
        }
    }

    /// Whether a transmission has accumulated any state.
    pub fn in_progress(&self) -> bool {
        self.sync_edges > 0 || self.bit_index > 0 || self.packet_index > 0
    }

    /// Whether the current transmission is ready for consumption.
    pub fn is_complete(&self) -> bool {
        self.completed
    }

    /// Fully captured packets of the completed transmission, in capture
    /// order. Excludes the partially filled packet, if any.
    pub fn packets(&self) -> &[RawPacket] {
        &self.payload.packets()[..self.packet_index]
    }

    /// Number of fully captured packets.
    pub fn packet_count(&self) -> usize {
        self.packet_index
    }

    /// Derived observable state.
    pub fn state(&self) -> DecoderState {
        if self.completed {
            DecoderState::Complete
        } else if self.sync_edges >= SYNC_EDGES_REQUIRED {
            DecoderState::ReadingPayload
        } else if !self.in_progress() {
            DecoderState::Idle
        } else if self.sync_edges % 2 == 0 {
            // Preamble alternates pulse first, gap second.
            DecoderState::SyncingPulse
        } else {
            DecoderState::SyncingGap
        }
    }

    /// Decoder health counters.
    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    /// Prepare for the next transmission.
    ///
    /// `now` re-arms the stall supervisor so the idle time before the
    /// next burst is not mistaken for a stall.
    pub fn reset(&mut self, now: Timestamp) {
        self.sync_edges = 0;
        self.packet_index = 0;
        self.bit_index = 0;
        self.current_pulse_us = 0;
        self.last_edge = now;
        self.completed = false;
        self.payload.clear();
    }

    fn lose_sync(&mut self) {
        if self.sync_edges > 0 {
            self.stats.sync_resets += 1;
        }
        self.sync_edges = 0;
    }

    /// Discard the current transmission entirely.
    ///
    /// Used when an internal invariant is violated: a corrupted partial
    /// frame must not reach dispatch.
    fn abort(&mut self) {
        self.stats.aborted += 1;
        self.sync_edges = 0;
        self.packet_index = 0;
        self.bit_index = 0;
        self.current_pulse_us = 0;
        self.completed = false;
        self.payload.clear();
    }

    fn elapsed_us(&self, timestamp: Timestamp) -> u32 {
        timestamp.saturating_sub(self.last_edge).min(u32::MAX as u64) as u32
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}
