//! Memory store - bounded, chronologically ordered observations.
//!
//! Overflow triggers an eviction pass that keeps a recency window plus a
//! handful of "landmark" records with the most extreme sentiment, so rare
//! strong events outlive ordinary recent noise.

use std::cmp::Ordering;
use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::clock::MS_PER_SEC;

/// Landmarks are only ranked once the store holds this many records.
pub const LANDMARK_MIN_RECORDS: usize = 20;
/// Upper bound on landmarks regardless of capacity.
pub const LANDMARK_MAX: usize = 50;
pub const LANDMARK_SHARE: f64 = 0.1;
pub const RECENCY_SHARE: f64 = 0.7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub label: String,
    pub sentiment: f64,
    pub captured_at_ms: u64,
    /// Learning rate in force when the observation arrived.
    pub rate_at_capture: f64,
}

impl Observation {
    /// Identity used to collapse duplicates during eviction.
    fn dedup_key(&self) -> (&str, u64, u64) {
        // -0.0 and 0.0 compare equal, keep them as one key
        let s = if self.sentiment == 0.0 { 0.0 } else { self.sentiment };
        (self.label.as_str(), s.to_bits(), self.captured_at_ms / MS_PER_SEC)
    }
}

/// Outcome of one eviction pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eviction {
    pub before: usize,
    pub after: usize,
    /// Survivors that came from the landmark set rather than the recency window.
    pub landmarks_kept: usize,
}

#[derive(Debug, Clone)]
pub struct MemoryStore {
    limit: usize,
    records: VecDeque<Observation>,
}

impl MemoryStore {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            records: VecDeque::with_capacity(limit.saturating_add(1).min(4096)),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Observation> + ExactSizeIterator {
        self.records.iter()
    }

    /// Append an observation, evicting if the store overflows.
    pub fn append(&mut self, obs: Observation) -> Option<Eviction> {
        self.records.push_back(obs);
        if self.records.len() > self.limit {
            Some(self.evict())
        } else {
            None
        }
    }

    /// The `n` most recent sentiments, oldest first.
    pub fn recent_sentiments(&self, n: usize) -> Vec<f64> {
        let skip = self.records.len().saturating_sub(n);
        self.records.iter().skip(skip).map(|o| o.sentiment).collect()
    }

    /// Records captured less than `window_ms` before `now_ms`.
    pub fn count_since(&self, now_ms: u64, window_ms: u64) -> usize {
        self.records
            .iter()
            .filter(|o| now_ms.saturating_sub(o.captured_at_ms) < window_ms)
            .count()
    }

    /// Number of landmark slots for a store of this capacity.
    pub fn landmark_count(&self) -> usize {
        ((self.limit as f64 * LANDMARK_SHARE) as usize).min(LANDMARK_MAX)
    }

    /// Size of the recency window kept on eviction (never zero).
    pub fn recency_count(&self) -> usize {
        ((self.limit as f64 * RECENCY_SHARE) as usize).max(1)
    }

    /// Indices of the most extreme records by |sentiment|, strongest first.
    ///
    /// Ties keep chronological order. Empty while the store is small.
    pub fn select_landmarks(&self) -> Vec<usize> {
        if self.records.len() < LANDMARK_MIN_RECORDS {
            return Vec::new();
        }
        let mut ranked: Vec<usize> = (0..self.records.len()).collect();
        ranked.sort_by(|&a, &b| {
            let sa = self.records[a].sentiment.abs();
            let sb = self.records[b].sentiment.abs();
            sb.partial_cmp(&sa).unwrap_or(Ordering::Equal)
        });
        ranked.truncate(self.landmark_count());
        ranked
    }

    /// Rebuild the store from landmarks plus the recency window.
    pub fn evict(&mut self) -> Eviction {
        let before = self.records.len();
        let recent_start = before.saturating_sub(self.recency_count());
        let combined: Vec<usize> = self
            .select_landmarks()
            .into_iter()
            .chain(recent_start..before)
            .collect();

        // Newest-first scan, first occurrence of a key wins.
        let mut keep: Vec<usize> = {
            let mut seen = HashSet::new();
            combined
                .iter()
                .rev()
                .copied()
                .filter(|&idx| seen.insert(self.records[idx].dedup_key()))
                .collect()
        };
        keep.sort_unstable();
        if keep.len() > self.limit {
            keep.drain(..keep.len() - self.limit);
        }

        let landmarks_kept = keep.iter().filter(|&&i| i < recent_start).count();
        let mut cursor = 0;
        let mut next = VecDeque::with_capacity(keep.len());
        for (idx, obs) in std::mem::take(&mut self.records).into_iter().enumerate() {
            if keep.get(cursor) == Some(&idx) {
                next.push_back(obs);
                cursor += 1;
            }
        }
        self.records = next;

        Eviction {
            before,
            after: self.records.len(),
            landmarks_kept,
        }
    }
}
