//! Volatility estimator - dispersion of recent sentiment.

use crate::history::BoundedHistory;
use crate::memory::MemoryStore;

pub const VOLATILITY_HISTORY_CAP: usize = 50;

/// Population standard deviation, 0.0 for fewer than two samples.
pub fn population_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

#[derive(Debug, Clone)]
pub struct VolatilityEstimator {
    window: usize,
    history: BoundedHistory<f64>,
}

impl VolatilityEstimator {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            history: BoundedHistory::new(VOLATILITY_HISTORY_CAP),
        }
    }

    /// Volatility over the last `window` sentiments.
    ///
    /// Below two records this returns 0.0 and leaves the history untouched.
    pub fn estimate(&mut self, memory: &MemoryStore) -> f64 {
        if memory.len() < 2 {
            return 0.0;
        }
        let recent = memory.recent_sentiments(self.window);
        if recent.len() < 2 {
            return 0.0;
        }
        let vol = population_std(&recent);
        self.history.push(vol);
        vol
    }

    pub fn history(&self) -> &BoundedHistory<f64> {
        &self.history
    }

    pub fn average(&self) -> f64 {
        self.history.mean()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Observation;

    fn store_with(values: &[f64]) -> MemoryStore {
        let mut store = MemoryStore::new(100);
        for (i, &s) in values.iter().enumerate() {
            store.append(Observation {
                label: format!("e{}", i),
                sentiment: s,
                captured_at_ms: i as u64 * 1000,
                rate_at_capture: 0.1,
            });
        }
        store
    }

    #[test]
    fn test_single_record_is_zero_without_history() {
        let mut est = VolatilityEstimator::new(20);
        assert_eq!(est.estimate(&store_with(&[0.6])), 0.0);
        assert!(est.history().is_empty());
    }

    #[test]
    fn test_population_std() {
        let mut est = VolatilityEstimator::new(20);
        let vol = est.estimate(&store_with(&[1.0, -1.0]));
        assert!((vol - 1.0).abs() < 1e-12);
        assert_eq!(est.history().len(), 1);
    }

    #[test]
    fn test_window_limits_samples() {
        let mut est = VolatilityEstimator::new(2);
        // only the last two (0.5, 0.5) count
        let vol = est.estimate(&store_with(&[-1.0, 1.0, 0.5, 0.5]));
        assert_eq!(vol, 0.0);
        assert_eq!(est.history().len(), 1);
    }

    #[test]
    fn test_window_of_one_never_records() {
        let mut est = VolatilityEstimator::new(1);
        assert_eq!(est.estimate(&store_with(&[-1.0, 1.0])), 0.0);
        assert!(est.history().is_empty());
    }

    #[test]
    fn test_history_capped() {
        let mut est = VolatilityEstimator::new(20);
        let store = store_with(&[0.1, 0.9]);
        for _ in 0..60 {
            est.estimate(&store);
        }
        assert_eq!(est.history().len(), VOLATILITY_HISTORY_CAP);
        assert!((est.average() - 0.4).abs() < 1e-9);
    }
}
