//! Bounded multi-producer, single-consumer queue over a ring of slots.
//!
//! # Design
//! - **Producers** (any number of threads, `&self`): claim a unique sequence
//!   number with one `fetch_add` on the write cursor, then wait for that
//!   sequence's turn at slot `seq % capacity` and fill it.
//! - **Consumer** (exactly one, see [`Consumer`]): walks the sequence space
//!   with a private cursor, waiting for each slot in turn to be filled.
//!
//! There is no "full" or "empty" return. A producer facing a full ring and a
//! consumer facing an empty one both block (spin + yield) until the other
//! side makes progress. Callers needing a timeout must wrap the queue.
//!
//! # Shutdown
//! [`MpscQueue::enqueue_stop`] sends a [`StopMarker`] through the same
//! admission path as an item, so the consumer sees it only after every item
//! that was sequenced before it.
//!
//! # Lifetime
//! Dropping the queue while a producer is still blocked on a full ring is a
//! usage error. Borrowing rules rule it out for scoped threads; with `Arc`,
//! join every producer before the last handle goes away.

use crate::consumer::Consumer;
use crate::error::QueueError;
use crate::message::{Dequeued, Item, SlotMetadata, StopMarker};
use crate::ring::{RingConfig, seq_to_index};
use crate::slot::Slot;
use crossbeam_utils::CachePadded;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::debug;

pub struct MpscQueue<T> {
    /// Next sequence number handed to a producer.
    write_cursor: CachePadded<AtomicU64>,
    /// Next sequence number the consumer expects. Only read when a consumer
    /// is claimed and only written when it is released.
    pub(crate) read_cursor: CachePadded<AtomicU64>,
    pub(crate) consumer_claimed: AtomicBool,
    config: RingConfig,
    slots: Box<[Slot<T>]>,
}

impl<T> MpscQueue<T> {
    /// Allocates the ring. This is the only allocation the queue makes.
    ///
    /// # Panics
    /// Panics if `config.capacity` is zero.
    pub fn new(config: RingConfig) -> Self {
        assert!(config.capacity > 0, "Capacity must be non-zero");
        let slots: Box<[Slot<T>]> = (0..config.capacity).map(Slot::new).collect();
        debug!(capacity = config.capacity, "queue ring allocated");

        Self {
            write_cursor: CachePadded::new(AtomicU64::new(0)),
            read_cursor: CachePadded::new(AtomicU64::new(0)),
            consumer_claimed: AtomicBool::new(false),
            config,
            slots,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(RingConfig::new(capacity))
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    pub fn config(&self) -> RingConfig {
        self.config
    }

    /// Enqueues `value`, blocking while its slot is still occupied.
    ///
    /// Returns the sequence number and slot the value was written to.
    pub fn enqueue(&self, value: T) -> SlotMetadata {
        self.admit(|metadata| Dequeued::Item(Item { metadata, payload: value }))
    }

    /// Enqueues a stop marker behind everything sequenced so far.
    pub fn enqueue_stop(&self) -> SlotMetadata {
        self.admit(|metadata| Dequeued::Stop(StopMarker { metadata }))
    }

    /// Claims the single consumer role.
    ///
    /// # Errors
    /// [`QueueError::ConsumerClaimed`] if another [`Consumer`] is still alive.
    pub fn consumer(&self) -> Result<Consumer<'_, T>, QueueError> {
        self.consumer_claimed
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .map_err(|_| QueueError::ConsumerClaimed)?;

        let read_seq = self.read_cursor.load(Ordering::Relaxed);
        debug!(read_seq, "consumer claimed");
        Ok(Consumer::new(self, read_seq))
    }

    /// Sequence numbers handed out so far, stop markers included.
    pub fn enqueued(&self) -> u64 {
        self.write_cursor.load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn slot(&self, index: usize) -> &Slot<T> {
        &self.slots[index]
    }

    fn admit(&self, build: impl FnOnce(SlotMetadata) -> Dequeued<T>) -> SlotMetadata {
        let sequence = self.write_cursor.fetch_add(1, Ordering::Relaxed);
        let index = seq_to_index(sequence, self.config.capacity);
        let metadata = SlotMetadata { sequence, index };

        self.slots[index].write(sequence, self.config.lap(), index, build(metadata));
        metadata
    }
}

impl<T> fmt::Debug for MpscQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MpscQueue")
            .field("capacity", &self.config.capacity)
            .field("enqueued", &self.enqueued())
            .field("consumer_claimed", &self.consumer_claimed.load(Ordering::Relaxed))
            .finish()
    }
}
