//! # Rolling Buffer
//!
//! Fixed-capacity FIFO history of a channel's most recent values.

use std::collections::VecDeque;

/// Default number of samples kept per channel
pub const DEFAULT_HISTORY_LEN: usize = 50;

/// Fixed-capacity history; the oldest value is evicted on overflow
#[derive(Debug, Clone, PartialEq)]
pub struct RollingBuffer {
    values: VecDeque<f64>,
    capacity: usize,
}

impl RollingBuffer {
    /// Create an empty buffer holding at most `capacity` values
    ///
    /// A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a value, evicting the oldest one when full
    pub fn push(&mut self, value: f64) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent value
    pub fn latest(&self) -> Option<f64> {
        self.values.back().copied()
    }

    /// Values from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    /// Copy of the values from oldest to newest
    pub fn to_vec(&self) -> Vec<f64> {
        self.iter().collect()
    }
}

impl Default for RollingBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer_is_empty() {
        let buffer = RollingBuffer::default();
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 50);
        assert_eq!(buffer.latest(), None);
    }

    #[test]
    fn test_fills_up_to_capacity() {
        let mut buffer = RollingBuffer::new(5);
        for i in 0..5 {
            buffer.push(i as f64);
        }
        assert_eq!(buffer.to_vec(), vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_evicts_oldest_first() {
        let mut buffer = RollingBuffer::default();
        for i in 0..=50 {
            buffer.push(i as f64);
        }

        let expected: Vec<f64> = (1..=50).map(|i| i as f64).collect();
        assert_eq!(buffer.len(), 50);
        assert_eq!(buffer.to_vec(), expected);
        assert_eq!(buffer.latest(), Some(50.0));
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut buffer = RollingBuffer::new(50);
        for i in 0..10_000 {
            buffer.push(i as f64);
            assert!(buffer.len() <= 50);
        }
        assert_eq!(buffer.iter().next(), Some(9950.0));
    }

    #[test]
    fn test_zero_capacity_keeps_latest() {
        let mut buffer = RollingBuffer::new(0);
        buffer.push(1.0);
        buffer.push(2.0);
        assert_eq!(buffer.to_vec(), vec![2.0]);
    }
}
