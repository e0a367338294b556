//! Pulse intake - validation in front of the kernel.
//!
//! Incoming pulses are JSON objects like `{"event": "...", "sentiment": 0.4}`.
//! The kernel accepts any finite sentiment; intake additionally holds pulses to
//! the `[-1, 1]` range callers are expected to respect.

use serde::Deserialize;

use crate::error::{KernelError, KernelResult};

pub const DEFAULT_EVENT: &str = "Unnamed Pulse";
pub const SENTIMENT_MIN: f64 = -1.0;
pub const SENTIMENT_MAX: f64 = 1.0;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PulseInput {
    #[serde(default, alias = "label")]
    pub event: Option<String>,
    #[serde(default)]
    pub sentiment: Option<f64>,
}

impl PulseInput {
    pub fn parse(line: &str) -> KernelResult<Self> {
        serde_json::from_str(line)
            .map_err(|e| KernelError::input(format!("malformed pulse: {}", e)))
    }

    /// Resolve into a `(label, sentiment)` pair ready for ingestion.
    pub fn into_observation(self) -> KernelResult<(String, f64)> {
        let sentiment = self
            .sentiment
            .ok_or_else(|| KernelError::input("sentiment is required"))?;
        if !sentiment.is_finite() || !(SENTIMENT_MIN..=SENTIMENT_MAX).contains(&sentiment) {
            return Err(KernelError::input(format!(
                "sentiment {} outside [{}, {}]",
                sentiment, SENTIMENT_MIN, SENTIMENT_MAX
            )));
        }
        let label = self
            .event
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| DEFAULT_EVENT.to_string());
        Ok((label, sentiment))
    }
}
