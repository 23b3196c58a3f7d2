//! Core decoder for ookrx
//!
//! Reconstructs validated temperature/humidity readings from the raw
//! edge transitions an OOK receiver pin produces for a 3-channel
//! 433 MHz sensor. Designed for edge devices with limited resources.
//!
//! Key constraints:
//! - No heap allocation after setup (one `Box` per registered device)
//! - The interrupt side only enqueues; all decoding runs in the
//!   periodically polled consumer context
//! - Nothing in the decode path blocks or panics on bad radio input
//!
//! ```no_run
//! use ookrx_core::{DeviceRegistry, EdgeQueue, Receiver};
//! use ookrx_core::events::{EdgeEvent, PinLevel};
//! use ookrx_core::time::StdClock;
//!
//! static EDGES: EdgeQueue<128> = EdgeQueue::new();
//!
//! // Wire the pin-change interrupt to the queue (platform specific):
//! // on each transition, push EdgeEvent::new(level, micros()).
//!
//! let mut registry = DeviceRegistry::new();
//! registry.register(0x9234, |reading| {
//!     // forward to the accessory layer
//!     let _ = reading;
//! }).unwrap();
//!
//! let mut receiver = Receiver::new(&EDGES, registry, StdClock::new());
//! loop {
//!     if let Some(reading) = receiver.poll() {
//!         // one validated transmission
//!         let _ = reading;
//!     }
//!     // sleep until the next polling tick
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod constants;
pub mod decoder;
pub mod errors;
pub mod events;
pub mod packet;
pub mod payload;
pub mod queue;
pub mod registry;
pub mod receiver;
pub mod time;
pub mod timing;

mod diag;

// Public API
pub use decoder::{Decoder, DecoderState, DecoderStats};
pub use errors::{DecodeError, PacketError, RegistryError};
pub use events::{EdgeEvent, PinLevel, Reading};
pub use packet::{device_id, DecodedPacket, RawPacket};
pub use queue::EdgeQueue;
pub use receiver::Receiver;
pub use registry::{DeviceRegistry, ReadingSink};
pub use timing::{classify, TimingMatch};

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_exists() {
        assert!(!VERSION.is_empty());
    }
}
