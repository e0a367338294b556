//! Decay scheduler.
//!
//! Decay fires on ingestion counts, with the interval stretched by recent
//! activity, and bites harder after a long idle gap. The check runs on the
//! counter before it is incremented, so the very first ingestion decays.

use crate::clock::MS_PER_SEC;
use crate::memory::MemoryStore;

/// Records newer than this count as "recent activity".
pub const ACTIVITY_WINDOW_MS: u64 = 300 * MS_PER_SEC;
/// Recent-record count that corresponds to an activity factor of 1.0.
pub const ACTIVITY_NORM: f64 = 10.0;
pub const ACTIVITY_FACTOR_MAX: f64 = 2.0;
/// Gap after which decay is strengthened.
pub const INACTIVITY_MS: u64 = 3600 * MS_PER_SEC;
pub const INACTIVITY_DECAY: f64 = 0.95;
pub const ADAPTATION_DECAY: f64 = 0.98;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayDecision {
    pub interval: u64,
    pub fired: bool,
    /// Multiplier for the balance; 1.0 when decay did not fire.
    pub balance_factor: f64,
    /// Multiplier for the adaptation score; 1.0 when decay did not fire.
    pub adaptation_factor: f64,
    pub idle: bool,
}

#[derive(Debug, Clone)]
pub struct DecayScheduler {
    decay_interval: u64,
    decay_factor: f64,
}

impl DecayScheduler {
    pub fn new(decay_interval: u64, decay_factor: f64) -> Self {
        Self {
            decay_interval,
            decay_factor,
        }
    }

    pub fn activity_factor(memory: &MemoryStore, now_ms: u64) -> f64 {
        if memory.is_empty() {
            return 1.0;
        }
        let recent = memory.count_since(now_ms, ACTIVITY_WINDOW_MS) as f64;
        (recent / ACTIVITY_NORM).min(ACTIVITY_FACTOR_MAX)
    }

    /// Interval in ingestions, truncated and never below one.
    pub fn adaptive_interval(&self, memory: &MemoryStore, now_ms: u64) -> u64 {
        let scaled = self.decay_interval as f64 * Self::activity_factor(memory, now_ms);
        (scaled as u64).max(1)
    }

    /// Decide whether decay fires for this ingestion.
    ///
    /// `total_inputs` is the pre-increment counter, `last_update_ms` the time
    /// of the previous completed ingestion.
    pub fn evaluate(
        &self,
        memory: &MemoryStore,
        total_inputs: u64,
        now_ms: u64,
        last_update_ms: u64,
    ) -> DecayDecision {
        let interval = self.adaptive_interval(memory, now_ms);
        let idle = now_ms.saturating_sub(last_update_ms) > INACTIVITY_MS;
        if total_inputs % interval != 0 {
            return DecayDecision {
                interval,
                fired: false,
                balance_factor: 1.0,
                adaptation_factor: 1.0,
                idle,
            };
        }
        let balance_factor = if idle {
            self.decay_factor * INACTIVITY_DECAY
        } else {
            self.decay_factor
        };
        DecayDecision {
            interval,
            fired: true,
            balance_factor,
            adaptation_factor: ADAPTATION_DECAY,
            idle,
        }
    }
}
