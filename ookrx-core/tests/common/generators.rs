//! Packet and edge-train generators
//!
//! Builds correctly stamped packets and the microsecond-accurate edge
//! sequences a real sensor would put on the receiver pin, so tests can
//! drive the full decode path without hardware.

use ookrx_core::events::{EdgeEvent, PinLevel};

/// Encode sensor fields into a parity- and checksum-stamped packet.
pub fn encode_packet(
    device_id: u16,
    battery_ok: bool,
    humidity_percent: u8,
    temperature_tenths: i16,
) -> [u8; 7] {
    let raw_temperature = (temperature_tenths + 1000) as u16;

    let mut bytes = [0u8; 7];
    bytes[0] = (device_id >> 8) as u8;
    bytes[1] = device_id as u8;
    bytes[2] = 0x04 | if battery_ok { 0x40 } else { 0x00 };
    bytes[3] = humidity_percent & 0x7F;
    bytes[4] = ((raw_temperature >> 7) & 0x0F) as u8;
    bytes[5] = (raw_temperature & 0x7F) as u8;

    for i in 2..=5 {
        if bytes[i].count_ones() % 2 == 1 {
            bytes[i] |= 0x80;
        }
    }
    bytes[6] = bytes[..6].iter().fold(0u8, |sum, &b| sum.wrapping_add(b));
    bytes
}

/// Builder for the edge sequence of one or more transmissions.
///
/// Tracks time and line level; the line starts low, as it is between
/// transmissions.
pub struct EdgeTrain {
    events: Vec<EdgeEvent>,
    now: u64,
    level: PinLevel,
}

impl EdgeTrain {
    pub fn new(start_us: u64) -> Self {
        Self {
            events: Vec::new(),
            now: start_us,
            level: PinLevel::Low,
        }
    }

    /// Advance `duration` µs, toggle the line, record the edge.
    fn edge(&mut self, duration: u32) {
        self.now += duration as u64;
        self.level = match self.level {
            PinLevel::Low => PinLevel::High,
            PinLevel::High => PinLevel::Low,
        };
        self.events.push(EdgeEvent::new(self.level, self.now));
    }

    /// Rising edge ending pre-transmission silence.
    pub fn silence(&mut self) {
        assert_eq!(self.level, PinLevel::Low);
        self.edge(10_000);
    }

    /// 4 sync pulses and 4 sync gaps at nominal widths.
    pub fn preamble(&mut self) {
        assert_eq!(self.level, PinLevel::High);
        for _ in 0..4 {
            self.edge(632);
            self.edge(580);
        }
    }

    /// 56 payload bits as pulse/gap pairs; wider pulse encodes a 1.
    pub fn bits(&mut self, bytes: &[u8; 7]) {
        for byte in bytes {
            for bit_in_byte in 0..8 {
                let value = byte >> (7 - bit_in_byte) & 1 == 1;
                let (pulse, gap) = if value { (400, 220) } else { (220, 400) };
                self.edge(pulse);
                self.edge(gap);
            }
        }
    }

    /// One full packet copy: preamble plus payload bits.
    pub fn packet(&mut self, bytes: &[u8; 7]) {
        self.preamble();
        self.bits(bytes);
    }

    /// The sync pulse and long reset gap separating packet copies.
    pub fn copy_boundary(&mut self) {
        self.edge(632);
        self.edge(2_180);
    }

    /// A complete transmission: the given copies with boundaries between.
    pub fn transmission(&mut self, copies: &[[u8; 7]]) {
        self.silence();
        for (index, copy) in copies.iter().enumerate() {
            if index > 0 {
                self.copy_boundary();
            }
            self.packet(copy);
        }
    }

    /// Timestamp of the last recorded edge.
    pub fn last_timestamp(&self) -> u64 {
        self.now
    }

    pub fn events(&self) -> &[EdgeEvent] {
        &self.events
    }
}
