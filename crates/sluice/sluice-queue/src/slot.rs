//! A single ring position and its handoff state machine.
//!
//! Every slot cycles through four states:
//!
//! ```text
//!   Empty ──(producer CAS)──▶ WriteInProgress ──(producer)──▶ Filled
//!     ▲                                                          │
//!     └────────(consumer)──── ReadInProgress ◀──(consumer CAS)───┘
//! ```
//!
//! Alongside the state, each slot carries an *admission sequence*: the one
//! sequence number currently allowed to write here. Slot `i` starts at `i`
//! and advances by exactly one lap (`capacity`) per completed write, so a
//! producer that wrapped around the ring can never overtake an earlier
//! producer aimed at the same slot.
//!
//! # Memory Ordering
//!
//! - Loads that gate progress (state, admission) use `Acquire`.
//! - `WriteInProgress → Filled` and `ReadInProgress → Empty` use `Release`,
//!   so the payload write (or move-out) is visible to whoever observes the
//!   new state.
//! - The admission advance uses `Release`, pairing with the next writer's
//!   `Acquire` load of the gate.
//!
//! Any transition that the protocol guarantees must succeed but does not is
//! a broken invariant (a second consumer, a forged sequence, corruption).
//! Those abort the process immediately.

use crate::message::Dequeued;
use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use tracing::error;

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SlotState {
    Empty = 0,
    WriteInProgress = 1,
    Filled = 2,
    ReadInProgress = 3,
}

impl SlotState {
    fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(SlotState::Empty),
            1 => Some(SlotState::WriteInProgress),
            2 => Some(SlotState::Filled),
            3 => Some(SlotState::ReadInProgress),
            _ => None,
        }
    }
}

/// One ring position.
///
/// Each slot starts on its own cache line; no two slots share one.
///
/// # Memory Layout
///
/// ```text
/// ┌──────────────┬─────────────────────┬──────────────────────────────┐
/// │ state (1B)   │ admission (8B)      │ payload: Dequeued<T>         │
/// └──────────────┴─────────────────────┴──────────────────────────────┘
/// ```
#[repr(C, align(64))]
pub(crate) struct Slot<T> {
    state: AtomicU8,
    admission: AtomicU64,
    /// Initialised exactly while `state` is `Filled` or `ReadInProgress`.
    payload: UnsafeCell<MaybeUninit<Dequeued<T>>>,
}

// SAFETY: the payload is only touched by the thread that won the
// corresponding state transition; everything else is atomic. `Send` is
// already derived from the fields.
unsafe impl<T: Send> Sync for Slot<T> {}

impl<T> Slot<T> {
    pub(crate) fn new(index: usize) -> Self {
        Self {
            state: AtomicU8::new(SlotState::Empty as u8),
            admission: AtomicU64::new(index as u64),
            payload: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }

    #[inline]
    pub(crate) fn state(&self) -> SlotState {
        let raw = self.state.load(Ordering::Acquire);
        SlotState::from_raw(raw).unwrap_or_else(|| corrupt_state(raw))
    }

    #[inline]
    pub(crate) fn admission(&self) -> u64 {
        self.admission.load(Ordering::Acquire)
    }

    /// Producer side: writes `value` under sequence `seq`.
    ///
    /// Blocks (spin + yield) until it is `seq`'s turn at this slot and the
    /// previous occupant has been drained, then fills the slot and hands the
    /// admission gate to `seq + lap`.
    pub(crate) fn write(&self, seq: u64, lap: u64, index: usize, value: Dequeued<T>) {
        while self.admission() != seq {
            relax();
        }

        self.claim_write();

        // SAFETY: we own the slot in `WriteInProgress`; the consumer moved
        // the previous payload out before releasing it to `Empty`.
        unsafe { (*self.payload.get()).write(value) };

        self.transition(index, SlotState::WriteInProgress, SlotState::Filled, Ordering::Release);

        let next = seq.wrapping_add(lap);
        if let Err(found) =
            self.admission
                .compare_exchange(seq, next, Ordering::Release, Ordering::Relaxed)
        {
            error!(index, seq, found, "slot admission advanced by another writer");
            std::process::abort();
        }
    }

    fn claim_write(&self) {
        loop {
            match self.state.compare_exchange_weak(
                SlotState::Empty as u8,
                SlotState::WriteInProgress as u8,
                Ordering::Acquire,
                Ordering::Relaxed,
            ) {
                Ok(_) => return,
                Err(_) => relax(),
            }
        }
    }

    /// Consumer side: blocks until the slot is `Filled`, then moves the
    /// payload out and returns the slot to `Empty`.
    pub(crate) fn take(&self, index: usize) -> Dequeued<T> {
        while self.state() != SlotState::Filled {
            relax();
        }

        self.transition(index, SlotState::Filled, SlotState::ReadInProgress, Ordering::Acquire);

        // SAFETY: `Filled` was published with Release after the payload was
        // written, and we now hold the slot exclusively in `ReadInProgress`.
        let value = unsafe { (*self.payload.get()).assume_init_read() };

        self.transition(index, SlotState::ReadInProgress, SlotState::Empty, Ordering::Release);
        value
    }

    /// A transition the protocol guarantees to succeed. Failure aborts.
    #[inline]
    fn transition(&self, index: usize, from: SlotState, to: SlotState, success: Ordering) {
        if let Err(raw) =
            self.state
                .compare_exchange(from as u8, to as u8, success, Ordering::Acquire)
        {
            let found = SlotState::from_raw(raw);
            error!(index, ?from, ?to, ?found, "slot state machine violated");
            std::process::abort();
        }
    }
}

impl<T> Drop for Slot<T> {
    fn drop(&mut self) {
        if *self.state.get_mut() == SlotState::Filled as u8 {
            // SAFETY: `Filled` means the payload is initialised and unread.
            unsafe { self.payload.get_mut().assume_init_drop() };
        }
    }
}

#[inline]
fn relax() {
    std::thread::yield_now();
}

#[cold]
fn corrupt_state(raw: u8) -> ! {
    error!(raw, "slot holds an unknown state value");
    std::process::abort();
}
