//! Balance integrator.
//!
//! Fuses the incoming sentiment, the adapted rate, momentum and volatility
//! into the next balance, and scores how well the previous balance predicted
//! the observation.

use crate::history::BoundedHistory;

pub const PREDICTION_ERROR_CAP: usize = 100;
pub const MOMENTUM_FACTOR: f64 = 0.1;
/// Weight kept on the previous balance when volatility is high.
pub const SMOOTHING_FACTOR: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalanceUpdate {
    pub previous: f64,
    pub balance: f64,
    /// |sentiment - previous balance|
    pub prediction_error: f64,
    /// True when volatility exceeded the threshold and the candidate was damped.
    pub smoothed: bool,
}

#[derive(Debug, Clone)]
pub struct BalanceIntegrator {
    balance: f64,
    threshold: f64,
    errors: BoundedHistory<f64>,
}

impl BalanceIntegrator {
    pub fn new(volatility_threshold: f64) -> Self {
        Self {
            balance: 0.0,
            threshold: volatility_threshold,
            errors: BoundedHistory::new(PREDICTION_ERROR_CAP),
        }
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn errors(&self) -> &BoundedHistory<f64> {
        &self.errors
    }

    pub fn average_error(&self) -> f64 {
        self.errors.mean()
    }

    /// Multiply the balance in place (used by decay).
    pub fn scale(&mut self, factor: f64) {
        self.balance *= factor;
    }

    pub fn integrate(
        &mut self,
        sentiment: f64,
        rate: f64,
        momentum: f64,
        volatility: f64,
    ) -> BalanceUpdate {
        let previous = self.balance;
        let mut candidate =
            (1.0 - rate) * previous + rate * sentiment + MOMENTUM_FACTOR * momentum;
        let smoothed = volatility > self.threshold;
        if smoothed {
            candidate = SMOOTHING_FACTOR * previous + (1.0 - SMOOTHING_FACTOR) * candidate;
        }
        self.balance = candidate;

        let prediction_error = (sentiment - previous).abs();
        self.errors.push(prediction_error);

        BalanceUpdate {
            previous,
            balance: candidate,
            prediction_error,
            smoothed,
        }
    }
}
