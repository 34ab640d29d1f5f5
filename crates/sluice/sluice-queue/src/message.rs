//! Values handed across the queue and the metadata stamped on them.

/// Where and when a value was accepted by the queue.
///
/// `sequence` is the global enqueue order; `index` is the slot it landed in
/// and always equals `sequence % capacity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotMetadata {
    pub sequence: u64,
    pub index: usize,
}

/// An application value together with its enqueue metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item<T> {
    pub metadata: SlotMetadata,
    pub payload: T,
}

/// Shutdown sentinel. Occupies a real sequence number, so every item
/// enqueued before it is delivered first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopMarker {
    pub metadata: SlotMetadata,
}

/// What a slot holds while filled, and what the consumer gets back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dequeued<T> {
    Item(Item<T>),
    Stop(StopMarker),
}

impl<T> Dequeued<T> {
    #[inline]
    pub fn metadata(&self) -> SlotMetadata {
        match self {
            Dequeued::Item(item) => item.metadata,
            Dequeued::Stop(stop) => stop.metadata,
        }
    }

    #[inline]
    pub fn is_stop(&self) -> bool {
        matches!(self, Dequeued::Stop(_))
    }

    /// Returns the item, or `None` for a stop marker.
    pub fn into_item(self) -> Option<Item<T>> {
        match self {
            Dequeued::Item(item) => Some(item),
            Dequeued::Stop(_) => None,
        }
    }
}
