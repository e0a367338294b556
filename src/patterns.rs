//! Trend detection over the pattern window.
//!
//! The window is split into two contiguous halves; a mean shift above
//! [`TREND_THRESHOLD`] is logged as a trend.

use serde::{Deserialize, Serialize};

use crate::history::BoundedHistory;
use crate::memory::MemoryStore;

pub const PATTERN_LOG_CAP: usize = 100;
pub const MIN_PATTERN_SAMPLES: usize = 10;
pub const TREND_THRESHOLD: f64 = 0.3;
/// Adaptation score gained per detected trend.
pub const ADAPTATION_BOOST: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    Trend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Positive,
    Negative,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Positive => "positive",
            Direction::Negative => "negative",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub kind: PatternKind,
    pub strength: f64,
    pub direction: Direction,
    pub detected_at_ms: u64,
    pub window_size: usize,
}

#[derive(Debug, Clone)]
pub struct PatternDetector {
    window: usize,
    log: BoundedHistory<Pattern>,
}

impl PatternDetector {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            log: BoundedHistory::new(PATTERN_LOG_CAP),
        }
    }

    pub fn log(&self) -> &BoundedHistory<Pattern> {
        &self.log
    }

    /// Most recent `n` patterns, oldest first.
    pub fn recent(&self, n: usize) -> Vec<Pattern> {
        self.log.last_n(n).cloned().collect()
    }

    /// Inspect the newest window and record a trend if one is present.
    pub fn detect(&mut self, memory: &MemoryStore, now_ms: u64) -> Option<Pattern> {
        if memory.len() < self.window {
            return None;
        }
        let sentiments = memory.recent_sentiments(self.window);
        if sentiments.len() < MIN_PATTERN_SAMPLES {
            return None;
        }
        let (first, second) = sentiments.split_at(sentiments.len() / 2);
        let first_avg = first.iter().sum::<f64>() / first.len() as f64;
        let second_avg = second.iter().sum::<f64>() / second.len() as f64;
        let strength = (second_avg - first_avg).abs();
        if strength <= TREND_THRESHOLD {
            return None;
        }

        let pattern = Pattern {
            kind: PatternKind::Trend,
            strength,
            direction: if second_avg > first_avg {
                Direction::Positive
            } else {
                Direction::Negative
            },
            detected_at_ms: now_ms,
            window_size: sentiments.len(),
        };
        self.log.push(pattern.clone());
        Some(pattern)
    }
}
