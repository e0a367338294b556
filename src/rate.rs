//! Learning-rate adapter.
//!
//! Volatility pushes the target rate up, consistently small prediction errors
//! pull it down, and the live rate moves toward the target by an exponential
//! blend so it never jumps.

use crate::history::BoundedHistory;

pub const RATE_MIN: f64 = 0.01;
pub const RATE_MAX: f64 = 0.5;
/// Recent prediction errors considered by the error adjustment.
pub const ERROR_LOOKBACK: usize = 10;

#[derive(Debug, Clone)]
pub struct LearningRateAdapter {
    base: f64,
    adaptation_factor: f64,
    rate: f64,
}

impl LearningRateAdapter {
    pub fn new(base: f64, adaptation_factor: f64) -> Self {
        Self {
            base,
            adaptation_factor,
            rate: base,
        }
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Rate the adapter would move toward under these conditions.
    pub fn target(&self, volatility: f64, errors: &BoundedHistory<f64>) -> f64 {
        let volatility_adjustment = (volatility * 2.0).min(0.5);
        let error_adjustment = if errors.is_empty() {
            1.0
        } else {
            (1.0 - errors.mean_last(ERROR_LOOKBACK)).max(0.5)
        };
        self.base * (1.0 + volatility_adjustment) * error_adjustment
    }

    pub fn adapt(&mut self, volatility: f64, errors: &BoundedHistory<f64>) -> f64 {
        let target = self.target(volatility, errors);
        let a = self.adaptation_factor;
        self.rate = (self.rate * (1.0 - a) + target * a).clamp(RATE_MIN, RATE_MAX);
        self.rate
    }
}
