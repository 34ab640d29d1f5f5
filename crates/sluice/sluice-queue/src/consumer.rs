//! The single reading side of an [`MpscQueue`].

use crate::message::{Dequeued, Item, StopMarker};
use crate::queue::MpscQueue;
use crate::ring::seq_to_index;
use std::sync::atomic::Ordering;
use tracing::debug;

/// Exclusive reader of an [`MpscQueue`].
///
/// At most one `Consumer` exists per queue at a time. It keeps the read
/// cursor locally, so dequeuing does no atomic cursor traffic; the cursor is
/// written back to the queue on drop and picked up by the next consumer.
pub struct Consumer<'q, T> {
    queue: &'q MpscQueue<T>,
    /// Sequence number of the next value to read.
    read_seq: u64,
}

impl<'q, T> Consumer<'q, T> {
    pub(crate) fn new(queue: &'q MpscQueue<T>, read_seq: u64) -> Self {
        Self { queue, read_seq }
    }

    /// Takes the next value in sequence order, blocking until it is written.
    pub fn dequeue(&mut self) -> Dequeued<T> {
        let index = seq_to_index(self.read_seq, self.queue.capacity());
        self.read_seq = self.read_seq.wrapping_add(1);
        self.queue.slot(index).take(index)
    }

    /// Dequeues until the first stop marker, handing each item to `f`.
    ///
    /// Later stop markers, if any, stay in the queue.
    pub fn drain_until_stop(&mut self, mut f: impl FnMut(Item<T>)) -> StopMarker {
        loop {
            match self.dequeue() {
                Dequeued::Item(item) => f(item),
                Dequeued::Stop(stop) => return stop,
            }
        }
    }

    #[inline]
    pub fn read_cursor(&self) -> u64 {
        self.read_seq
    }
}

impl<T> Drop for Consumer<'_, T> {
    fn drop(&mut self) {
        self.queue.read_cursor.store(self.read_seq, Ordering::Relaxed);
        self.queue.consumer_claimed.store(false, Ordering::Release);
        debug!(read_seq = self.read_seq, "consumer released");
    }
}

#[cfg(test)]
mod tests {
    use crate::error::QueueError;
    use crate::message::{Dequeued, SlotMetadata};
    use crate::queue::MpscQueue;

    #[test]
    fn second_consumer_is_refused_while_first_lives() {
        let queue = MpscQueue::<u8>::with_capacity(4);
        let first = queue.consumer().unwrap();
        assert_eq!(queue.consumer().err(), Some(QueueError::ConsumerClaimed));
        drop(first);
        assert!(queue.consumer().is_ok());
    }

    #[test]
    fn next_consumer_resumes_at_previous_cursor() {
        let queue = MpscQueue::<u8>::with_capacity(4);
        for v in 1..=3 {
            queue.enqueue(v);
        }

        {
            let mut consumer = queue.consumer().unwrap();
            assert_eq!(consumer.dequeue().into_item().map(|i| i.payload), Some(1));
            assert_eq!(consumer.read_cursor(), 1);
        }

        std::thread::scope(|s| {
            s.spawn(|| {
                let mut consumer = queue.consumer().unwrap();
                assert_eq!(consumer.read_cursor(), 1);
                assert_eq!(consumer.dequeue().into_item().map(|i| i.payload), Some(2));
                assert_eq!(consumer.dequeue().into_item().map(|i| i.payload), Some(3));
            });
        });
    }

    #[test]
    fn drain_stops_at_first_marker_and_leaves_the_rest() {
        let queue = MpscQueue::<u32>::with_capacity(8);
        queue.enqueue(10);
        queue.enqueue(20);
        let first_stop = queue.enqueue_stop();
        queue.enqueue(30);
        queue.enqueue_stop();

        let mut consumer = queue.consumer().unwrap();
        let mut seen = Vec::new();
        let stop = consumer.drain_until_stop(|item| seen.push(item.payload));

        assert_eq!(seen, vec![10, 20]);
        assert_eq!(stop.metadata, first_stop);
        assert_eq!(stop.metadata, SlotMetadata { sequence: 2, index: 2 });

        assert!(matches!(consumer.dequeue(), Dequeued::Item(ref i) if i.payload == 30));
        assert!(consumer.dequeue().is_stop());
    }
}
