//! Read-only kernel snapshot.

use serde::Serialize;

use crate::clock::Clock;
use crate::config::KernelConfig;
use crate::kernel::Kernel;
use crate::patterns::Pattern;

/// Patterns included in a snapshot.
pub const RECENT_PATTERNS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KernelStatus {
    pub balance: f64,
    pub rate: f64,
    pub adaptation_score: f64,
    pub memory_size: usize,
    pub total_inputs: u64,
    pub average_prediction_error: f64,
    pub average_volatility: f64,
    pub pattern_count: usize,
    pub recent_patterns: Vec<Pattern>,
    pub config: KernelConfig,
    pub config_fingerprint: String,
}

impl KernelStatus {
    pub fn capture<C: Clock>(kernel: &Kernel<C>) -> Self {
        Self {
            balance: kernel.balance(),
            rate: kernel.rate(),
            adaptation_score: kernel.adaptation_score(),
            memory_size: kernel.memory().len(),
            total_inputs: kernel.total_inputs(),
            average_prediction_error: kernel.average_error(),
            average_volatility: kernel.average_volatility(),
            pattern_count: kernel.patterns().log().len(),
            recent_patterns: kernel.patterns().recent(RECENT_PATTERNS),
            config: kernel.config().clone(),
            config_fingerprint: kernel.config_fingerprint().to_string(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
