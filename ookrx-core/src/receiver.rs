//! Receiver: the Periodic Consumer
//!
//! ## Overview
//!
//! [`Receiver`] ties the pieces together on the consumer side of the
//! edge queue. One call to [`poll`](Receiver::poll) performs bounded
//! work:
//!
//! ```text
//! EdgeQueue ──drain──→ Decoder ──complete?──→ parse → registry → sink
//!                         ↑
//!                    poll_stall(now)
//! ```
//!
//! The interrupt side only ever pushes into the queue; everything else
//! (the state machine, the payload buffer, the stall supervisor, parse
//! and dispatch) runs here, single-threaded. Poll at least every few
//! milliseconds so the queue never accumulates more than one packet's
//! worth of edges (112 per packet).
//!
//! ## Dispatch Policy
//!
//! A transmission carries up to three identical packet copies. Dispatch
//! decodes them in capture order and acts on the first valid one; later
//! copies are redundancy, not extra information, so they are not
//! re-checked and never cross-voted. If no copy validates, the
//! transmission yields no reading; the sensor retransmits within a
//! minute, so a lost reading heals on its own.
//!
//! ## Configuration Invariant
//!
//! One receiver per queue, one queue per pin. Decoding interleaved
//! transmissions from several pins through a single queue is not
//! supported; instantiate a separate queue and receiver per pin instead.

use crate::decoder::{Decoder, DecoderStats};
use crate::diag::{diag_debug, diag_info, diag_warn};
use crate::events::Reading;
use crate::packet::DecodedPacket;
use crate::queue::EdgeQueue;
use crate::registry::DeviceRegistry;
use crate::time::TimeSource;

#[cfg(feature = "log")]
use crate::packet::RawPacket;

/// Consumer-side driver for one receiver pin.
pub struct Receiver<'q, T: TimeSource, const N: usize> {
    queue: &'q EdgeQueue<N>,
    decoder: Decoder,
    registry: DeviceRegistry,
    clock: T,
}

impl<'q, T: TimeSource, const N: usize> Receiver<'q, T, N> {
    /// Build a receiver over a shared edge queue.
    ///
    /// The registry is taken by value: registration happens before the
    /// receiver starts polling, and dispatch is its only reader
    /// afterwards.
    pub fn new(queue: &'q EdgeQueue<N>, registry: DeviceRegistry, clock: T) -> Self {
        let mut decoder = Decoder::new();
        decoder.reset(clock.now());
        Self {
            queue,
            decoder,
            registry,
            clock,
        }
    }

    /// Run one bounded polling cycle.
    ///
    /// Drains queued edges into the state machine, runs the stall
    /// supervisor, and, once a transmission is complete, parses,
    /// dispatches and resets. Returns the reading dispatched this cycle,
    /// if any.
    pub fn poll(&mut self) -> Option<Reading> {
        for edge in self.queue.drain() {
            self.decoder.handle_edge(edge);
        }

        let now = self.clock.now();
        self.decoder.poll_stall(now);

        if !self.decoder.is_complete() {
            return None;
        }

        let dispatched = self.dispatch();
        self.decoder.reset(self.clock.now());
        dispatched
    }

    /// Parse the completed transmission and forward the first valid
    /// packet's reading to its registered sink.
    fn dispatch(&mut self) -> Option<Reading> {
        let packet_count = self.decoder.packet_count();
        if packet_count > 0 {
            diag_info!("received {} packet(s)", packet_count);
        }

        for raw in self.decoder.packets() {
            diag_debug!("  raw bytes: {}", hex_line(raw));

            let decoded = DecodedPacket::decode(raw);
            if !decoded.valid {
                continue;
            }

            let reading = Reading {
                temperature_celsius: decoded.temperature_celsius(),
                humidity_percent: decoded.humidity_percent,
                battery_ok: decoded.battery_ok,
            };
            diag_info!(
                "  device {:#06x}: {:.1} C, {} %, battery {}",
                decoded.device_id,
                reading.temperature_celsius,
                reading.humidity_percent,
                if reading.battery_ok { "OK" } else { "LOW" }
            );

            // Copies are identical; stop at the first good one.
            return match self.registry.get_mut(decoded.device_id) {
                Some(sink) => {
                    sink.reading(reading);
                    Some(reading)
                }
                None => {
                    diag_warn!("  no consumer registered for device {:#06x}", decoded.device_id);
                    None
                }
            };
        }

        None
    }

    /// Decoder health counters.
    pub fn decoder_stats(&self) -> DecoderStats {
        self.decoder.stats()
    }

    /// The registry, for late inspection.
    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }
}

/// Render a packet's bytes as a spaced hex line without allocating.
#[cfg(feature = "log")]
fn hex_line(raw: &RawPacket) -> heapless::String<24> {
    use core::fmt::Write;

    let mut line = heapless::String::new();
    for byte in raw.bytes() {
        // 7 bytes at 3 chars each always fit in 24.
        let _ = write!(line, "{byte:02X} ");
    }
    line
}
