//! Time handling for the receiver
//!
//! The protocol is defined entirely in terms of microsecond durations, so
//! the whole crate works on a monotonic microsecond counter. The counter
//! itself comes from outside (a hardware timer register on embedded
//! targets, [`StdClock`] on hosted ones); this module only abstracts over
//! where "now" comes from so the stall supervisor can be driven by a test
//! clock.

/// Timestamp in microseconds since an arbitrary monotonic origin
/// (typically device boot).
pub type Timestamp = u64;

/// Source of the monotonic microsecond counter.
///
/// Implementations must never go backwards; elapsed time is computed with
/// saturating subtraction, so a stuck counter degrades to "no time
/// passing" rather than an underflow.
pub trait TimeSource {
    /// Current timestamp in microseconds.
    fn now(&self) -> Timestamp;
}

/// Monotonic clock backed by [`std::time::Instant`].
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct StdClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl StdClock {
    /// Clock with its origin at the moment of construction.
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl TimeSource for StdClock {
    fn now(&self) -> Timestamp {
        self.origin.elapsed().as_micros() as Timestamp
    }
}

/// Manually advanced time source for testing.
///
/// Interior mutability so the same clock can be shared with a
/// [`crate::receiver::Receiver`] while the test advances it.
#[derive(Debug, Default)]
pub struct FixedTime {
    timestamp: core::cell::Cell<Timestamp>,
}

impl FixedTime {
    /// Clock frozen at `timestamp` until advanced.
    pub fn new(timestamp: Timestamp) -> Self {
        Self {
            timestamp: core::cell::Cell::new(timestamp),
        }
    }

    /// Set the current time.
    pub fn set(&self, timestamp: Timestamp) {
        self.timestamp.set(timestamp);
    }

    /// Advance the clock by `us` microseconds.
    pub fn advance(&self, us: u64) {
        self.timestamp.set(self.timestamp.get() + us);
    }
}

impl TimeSource for FixedTime {
    fn now(&self) -> Timestamp {
        self.timestamp.get()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}
