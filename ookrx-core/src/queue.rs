//! Lock-Free Edge Event Queue
#![allow(unsafe_code)] // Required for the lock-free ring buffer
//!
//! ## Overview
//!
//! Bounded single-producer/single-consumer queue carrying [`EdgeEvent`]s
//! from the pin-change interrupt to the decoding context. The interrupt
//! side must never block and has no locks available, so the handoff is a
//! ring buffer with atomic head/tail indices:
//!
//! ```text
//! Producer (edge ISR)                Consumer (periodic poll)
//!      ↓                                   ↓
//!   push() ───────→ Ring Buffer ───────→ pop()
//!      ↓                                   ↓
//!   Never blocks                     Never blocks
//! ```
//!
//! ## Memory Ordering
//!
//! - The producer publishes a slot with a Release store of `head`; the
//!   consumer observes it with an Acquire load. Symmetrically for `tail`.
//! - Each side loads its own index Relaxed (it is the only writer of it).
//! - Statistics are Relaxed; they never affect correctness.
//!
//! This is the entire cross-context synchronization story of the crate:
//! all decoder state lives on the consumer side, so only the queue has to
//! get memory visibility right.
//!
//! ## Capacity
//!
//! `N` must be a power of two (index masking instead of modulo) and one
//! slot is sacrificed to distinguish full from empty, so an `EdgeQueue<128>`
//! holds 127 events. When full, `push` drops the event and counts it;
//! a dropped edge corrupts at most one transmission, which the sensor's
//! periodic retransmission heals.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use crate::events::EdgeEvent;

/// Lock-free SPSC queue of pin transitions.
///
/// Usable in a `static`, which is how the interrupt side normally reaches
/// it:
///
/// ```rust
/// use ookrx_core::queue::EdgeQueue;
/// use ookrx_core::events::{EdgeEvent, PinLevel};
///
/// static EDGES: EdgeQueue<128> = EdgeQueue::new();
///
/// // Producer (pin-change interrupt): read pin, read clock, enqueue.
/// fn on_pin_change(raw_level: u8, now_us: u64) {
///     let _ = EDGES.push(EdgeEvent::new(PinLevel::from_raw(raw_level), now_us));
/// }
///
/// // Consumer (periodic poll) drains with `pop`/`drain`.
/// # fn poll() { while let Some(_e) = EDGES.pop() {} }
/// ```
pub struct EdgeQueue<const N: usize> {
    /// Ring buffer slots; a slot is only touched by the producer between
    /// claiming it and publishing `head`, and by the consumer between
    /// observing `head` and publishing `tail`.
    buffer: UnsafeCell<[EdgeEvent; N]>,

    /// Next write position (producer owned).
    head: AtomicUsize,

    /// Next read position (consumer owned).
    tail: AtomicUsize,

    /// Queue health counters.
    stats: QueueStats,
}

/// Queue health counters, updated with Relaxed ordering.
pub struct QueueStats {
    /// Total events pushed.
    pub pushed: AtomicU32,
    /// Total events popped.
    pub popped: AtomicU32,
    /// Events dropped because the queue was full.
    pub dropped: AtomicU32,
    /// Maximum depth observed.
    pub max_depth: AtomicU32,
}

impl QueueStats {
    const fn new() -> Self {
        Self {
            pushed: AtomicU32::new(0),
            popped: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
            max_depth: AtomicU32::new(0),
        }
    }

    fn update_max_depth(&self, current: u32) {
        let mut max = self.max_depth.load(Ordering::Relaxed);
        while current > max {
            match self.max_depth.compare_exchange_weak(
                max,
                current,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(actual) => max = actual,
            }
        }
    }
}

impl<const N: usize> EdgeQueue<N> {
    /// Create an empty queue. Usable in a `static`.
    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "EdgeQueue capacity must be a power of 2");
        Self {
            buffer: UnsafeCell::new([EdgeEvent::EMPTY; N]),
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            stats: QueueStats::new(),
        }
    }

    /// Push an event (producer side only).
    ///
    /// Returns `false` and counts a drop when full. Constant time, never
    /// blocks; safe to call from an interrupt handler as long as exactly
    /// one context pushes.
    pub fn push(&self, event: EdgeEvent) -> bool {
        let head = self.head.load(Ordering::Relaxed);
        let next_head = (head + 1) & (N - 1);

        if next_head == self.tail.load(Ordering::Acquire) {
            self.stats.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        // Sole producer: between here and the Release store of `head`,
        // this slot is ours alone.
        unsafe {
            (*self.buffer.get())[head] = event;
        }

        self.head.store(next_head, Ordering::Release);

        self.stats.pushed.fetch_add(1, Ordering::Relaxed);
        self.stats.update_max_depth(self.len() as u32);
        true
    }

    /// Pop the oldest event (consumer side only).
    pub fn pop(&self) -> Option<EdgeEvent> {
        let tail = self.tail.load(Ordering::Relaxed);
        if tail == self.head.load(Ordering::Acquire) {
            return None;
        }

        // Sole consumer: the producer cannot reuse this slot until we
        // publish the new tail below.
        let event = unsafe { (*self.buffer.get())[tail] };

        self.tail.store((tail + 1) & (N - 1), Ordering::Release);
        self.stats.popped.fetch_add(1, Ordering::Relaxed);
        Some(event)
    }

    /// Current number of queued events.
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);

        if head >= tail {
            head - tail
        } else {
            N - tail + head
        }
    }

    /// Check if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.head.load(Ordering::Acquire) == self.tail.load(Ordering::Acquire)
    }

    /// Check if the queue is full.
    pub fn is_full(&self) -> bool {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        ((head + 1) & (N - 1)) == tail
    }

    /// Queue health counters.
    pub fn stats(&self) -> &QueueStats {
        &self.stats
    }

    /// Drain all currently queued events (consumer side only).
    pub fn drain(&self) -> Drain<'_, N> {
        Drain { queue: self }
    }
}

impl<const N: usize> Default for EdgeQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

// The queue is the synchronization mechanism itself; slot access is
// serialized by the head/tail protocol documented above.
unsafe impl<const N: usize> Send for EdgeQueue<N> {}
unsafe impl<const N: usize> Sync for EdgeQueue<N> {}

/// Iterator draining the queue via [`EdgeQueue::pop`].
pub struct Drain<'a, const N: usize> {
    queue: &'a EdgeQueue<N>,
}

impl<const N: usize> Iterator for Drain<'_, N> {
    type Item = EdgeEvent;

    fn next(&mut self) -> Option<Self::Item> {
        self.queue.pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::PinLevel;

    fn edge(timestamp: u64) -> EdgeEvent {
        EdgeEvent::new(PinLevel::High, timestamp)
    }

    #[test]
    fn push_pop_fifo() {
        let queue = EdgeQueue::<16>::new();

        assert!(queue.push(edge(10)));
        assert!(queue.push(edge(20)));
        assert_eq!(queue.len(), 2);

        assert_eq!(queue.pop().unwrap().timestamp, 10);
        assert_eq!(queue.pop().unwrap().timestamp, 20);
        assert!(queue.pop().is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn full_queue_drops() {
        let queue = EdgeQueue::<4>::new();

        // One slot is sacrificed: capacity 4 holds 3 events.
        for i in 0..3 {
            assert!(queue.push(edge(i)));
        }
        assert!(queue.is_full());

        assert!(!queue.push(edge(99)));
        assert_eq!(queue.stats().dropped.load(Ordering::Relaxed), 1);

        // Queued events are unaffected by the dropped push.
        assert_eq!(queue.pop().unwrap().timestamp, 0);
    }

    #[test]
    fn wraps_around() {
        let queue = EdgeQueue::<4>::new();

        for round in 0..10u64 {
            assert!(queue.push(edge(round)));
            assert_eq!(queue.pop().unwrap().timestamp, round);
        }
        assert!(queue.is_empty());
        assert_eq!(queue.stats().pushed.load(Ordering::Relaxed), 10);
        assert_eq!(queue.stats().popped.load(Ordering::Relaxed), 10);
    }

    #[test]
    fn drain_empties_queue() {
        let queue = EdgeQueue::<8>::new();
        for i in 0..5 {
            queue.push(edge(i));
        }

        let timestamps: Vec<u64> = queue.drain().map(|e| e.timestamp).collect();
        assert_eq!(timestamps, vec![0, 1, 2, 3, 4]);
        assert!(queue.is_empty());
    }

    #[test]
    fn max_depth_tracked() {
        let queue = EdgeQueue::<8>::new();
        for i in 0..6 {
            queue.push(edge(i));
        }
        assert_eq!(queue.stats().max_depth.load(Ordering::Relaxed), 6);
    }

    #[test]
    fn shared_across_threads() {
        use std::sync::Arc;

        let queue = Arc::new(EdgeQueue::<64>::new());
        let producer = Arc::clone(&queue);

        let handle = std::thread::spawn(move || {
            for i in 0..1000u64 {
                while !producer.push(edge(i)) {
                    std::thread::yield_now();
                }
            }
        });

        let mut next_expected = 0u64;
        while next_expected < 1000 {
            if let Some(event) = queue.pop() {
                assert_eq!(event.timestamp, next_expected);
                next_expected += 1;
            } else {
                std::thread::yield_now();
            }
        }
        handle.join().unwrap();
    }
}
