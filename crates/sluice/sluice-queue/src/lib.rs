mod consumer;
mod error;
mod message;
mod queue;
mod ring;
mod slot;

pub use consumer::Consumer;
pub use error::QueueError;
pub use message::{Dequeued, Item, SlotMetadata, StopMarker};
pub use queue::MpscQueue;
pub use ring::{RingConfig, seq_to_index};
