//! Ring configuration and sequence-to-slot arithmetic.
//!
//! The ring is addressed by a monotonically increasing sequence number. Any
//! positive capacity is accepted; the slot for a sequence is `seq % capacity`.

use serde::Deserialize;

/// Configuration for a queue ring.
///
/// Deserialising goes through the same non-zero check as [`RingConfig::new`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawRingConfig")]
pub struct RingConfig {
    /// Number of slots in the ring. Must be non-zero.
    pub capacity: usize,
}

#[derive(Deserialize)]
struct RawRingConfig {
    capacity: usize,
}

impl TryFrom<RawRingConfig> for RingConfig {
    type Error = &'static str;

    fn try_from(raw: RawRingConfig) -> Result<Self, Self::Error> {
        if raw.capacity == 0 {
            return Err("ring capacity must be non-zero");
        }
        Ok(Self { capacity: raw.capacity })
    }
}

impl RingConfig {
    /// Creates a new ring configuration with the specified capacity.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    ///
    /// # Example
    /// ```
    /// use sluice_queue::RingConfig;
    /// let cfg = RingConfig::new(100); // any positive size is fine
    /// assert_eq!(cfg.capacity, 100);
    /// // RingConfig::new(0);          // Would panic
    /// ```
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be non-zero");
        Self { capacity }
    }

    /// Distance the admission sequence of a slot advances per lap.
    #[inline(always)]
    pub fn lap(&self) -> u64 {
        self.capacity as u64
    }
}

/// Converts a sequence number to a ring index.
///
/// ```text
/// capacity = 5
/// seq =  0 → 0
/// seq =  4 → 4
/// seq =  5 → 0  (wraps around)
/// seq = 13 → 3
/// ```
#[inline(always)]
pub fn seq_to_index(seq: u64, capacity: usize) -> usize {
    (seq % capacity as u64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_power_of_two_capacity_wraps() {
        let cfg = RingConfig::new(5);
        let indices: Vec<usize> = (0..12).map(|s| seq_to_index(s, cfg.capacity)).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4, 0, 1, 2, 3, 4, 0, 1]);
        assert_eq!(cfg.lap(), 5);
    }

    #[test]
    fn capacity_of_one_always_maps_to_zero() {
        for seq in [0, 1, 7, u64::MAX] {
            assert_eq!(seq_to_index(seq, 1), 0);
        }
    }

    #[test]
    fn deserialising_rejects_zero_capacity() {
        assert_eq!(
            RingConfig::try_from(RawRingConfig { capacity: 0 }),
            Err("ring capacity must be non-zero")
        );
        assert_eq!(RingConfig::try_from(RawRingConfig { capacity: 3 }), Ok(RingConfig::new(3)));
    }

    #[test]
    #[should_panic(expected = "Capacity must be non-zero")]
    fn zero_capacity_panics() {
        let _ = RingConfig::new(0);
    }
}
