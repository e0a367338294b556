//! Fixed-capacity FIFO histories.

use std::collections::VecDeque;

/// Bounded history that drops its oldest entry on overflow.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedHistory<T> {
    capacity: usize,
    values: VecDeque<T>,
}

impl<T> BoundedHistory<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            values: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a value, returning the evicted oldest one if the cap was hit.
    pub fn push(&mut self, value: T) -> Option<T> {
        self.values.push_back(value);
        if self.values.len() > self.capacity {
            self.values.pop_front()
        } else {
            None
        }
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

    pub fn last(&self) -> Option<&T> {
        self.values.back()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.values.iter()
    }

    /// The most recent `n` entries, oldest first.
    pub fn last_n(&self, n: usize) -> impl Iterator<Item = &T> {
        let skip = self.values.len().saturating_sub(n);
        self.values.iter().skip(skip)
    }
}

impl BoundedHistory<f64> {
    /// Mean of all entries, 0.0 when empty.
    pub fn mean(&self) -> f64 {
        self.mean_last(self.values.len())
    }

    /// Mean of the most recent `n` entries, 0.0 when empty.
    pub fn mean_last(&self, n: usize) -> f64 {
        let take = n.min(self.values.len());
        if take == 0 {
            return 0.0;
        }
        self.last_n(take).sum::<f64>() / take as f64
    }
}
