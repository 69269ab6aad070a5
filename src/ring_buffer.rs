//! Fixed-capacity FIFO sliding window.
//!
//! Elements are removed from the head and added at the tail.  Unlike the
//! event queues used for ISR handoff, a full buffer never overwrites its
//! oldest entry: `enqueue` refuses the item and reports `false`, and the
//! caller decides whether to make room first (the proximity gate always
//! dequeues before enqueueing once its window is full).

use crate::error::ConfigError;

/// Bounded FIFO with a capacity fixed at construction.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    slots: Box<[Option<T>]>,
    /// Index of the next element to dequeue.
    head: usize,
    /// Index of the next free slot.
    tail: usize,
    count: usize,
}

impl<T> RingBuffer<T> {
    /// Create an empty buffer holding at most `capacity` items.
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::ValidationFailed(
                "ring buffer capacity must be > 0",
            ));
        }
        let slots = (0..capacity).map(|_| None).collect::<Vec<_>>().into_boxed_slice();
        Ok(Self {
            slots,
            head: 0,
            tail: 0,
            count: 0,
        })
    }

    /// Add an item at the tail.
    /// Returns `false` (buffer unchanged) if the buffer is full.
    #[must_use]
    pub fn enqueue(&mut self, item: T) -> bool {
        if self.is_full() {
            return false;
        }
        self.slots[self.tail] = Some(item);
        self.tail = (self.tail + 1) % self.capacity();
        self.count += 1;
        true
    }

    /// Remove the item at the head, or `None` if empty.
    pub fn dequeue(&mut self) -> Option<T> {
        if self.count == 0 {
            return None;
        }
        let item = self.slots[self.head].take();
        self.head = (self.head + 1) % self.capacity();
        self.count -= 1;
        item
    }

    /// Number of items currently held.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.count == self.capacity()
    }

    /// Drop every held item.
    pub fn clear(&mut self) {
        while self.dequeue().is_some() {}
    }

    /// Iterate head to tail without consuming.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        (0..self.count).filter_map(move |i| {
            let idx = (self.head + i) % self.capacity();
            self.slots[idx].as_ref()
        })
    }
}
