//! Device Registry
//!
//! Maps 16-bit device ids (2-bit channel + 14-bit serial, see
//! [`crate::packet::device_id`]) to reading consumers. The registry is an
//! explicitly constructed object owned by the [`crate::receiver::Receiver`];
//! there is no global device table. Populated before transmissions
//! arrive, then queried read-only by dispatch.
//!
//! Sinks are boxed trait objects in a fixed-capacity `heapless::Vec`:
//! registration allocates once per device, dispatch never allocates.

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(not(feature = "std"))]
use alloc::boxed::Box;

#[cfg(feature = "std")]
use std::boxed::Box;

use heapless::Vec;

use crate::constants::MAX_DEVICES;
use crate::errors::RegistryError;
use crate::events::Reading;

/// Consumer of decoded readings for one registered device.
///
/// Implemented by whatever the readings feed: an accessory bridge, a
/// data logger, a test probe.
pub trait ReadingSink {
    /// Called once per validated, registry-matched transmission.
    fn reading(&mut self, reading: Reading);
}

// Closures make convenient sinks in tests and small integrations.
impl<F: FnMut(Reading)> ReadingSink for F {
    fn reading(&mut self, reading: Reading) {
        self(reading)
    }
}

/// Fixed-capacity map from device id to reading sink.
///
/// At most one sink per id; re-registering an id is refused rather than
/// silently replacing the consumer.
pub struct DeviceRegistry {
    devices: Vec<(u16, Box<dyn ReadingSink>), MAX_DEVICES>,
}

impl DeviceRegistry {
    /// Empty registry with no registered devices.
    pub fn new() -> Self {
        Self {
            devices: Vec::new(),
        }
    }

    /// Associate `id` with `sink`.
    pub fn register<S>(&mut self, id: u16, sink: S) -> Result<(), RegistryError>
    where
        S: ReadingSink + 'static,
    {
        if self.contains(id) {
            return Err(RegistryError::DuplicateDevice { id });
        }
        self.devices
            .push((id, Box::new(sink)))
            .map_err(|_| RegistryError::RegistryFull)
    }

    /// Look up the sink for `id`.
    pub fn get_mut(&mut self, id: u16) -> Option<&mut (dyn ReadingSink + 'static)> {
        self.devices
            .iter_mut()
            .find(|(device_id, _)| *device_id == id)
            .map(|(_, sink)| sink.as_mut())
    }

    /// Whether `id` has a registered sink.
    pub fn contains(&self, id: u16) -> bool {
        self.devices.iter().any(|(device_id, _)| *device_id == id)
    }

    /// Number of registered devices.
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Check if no devices are registered.
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
