//! The ingestion pipeline.
//!
//! Each observation runs synchronously through, in order:
//!
//! ```text
//! memory.append -> volatility -> rate -> momentum -> balance -> patterns -> decay
//! ```
//!
//! after which the input counter and last-update time advance. There are no
//! suspension points; a caller sharing a kernel across tasks must serialize
//! writers (see [`crate::service`]).

use serde::Serialize;

use crate::balance::BalanceIntegrator;
use crate::clock::{Clock, SystemClock};
use crate::config::KernelConfig;
use crate::decay::DecayScheduler;
use crate::error::{KernelError, KernelResult};
use crate::logging;
use crate::memory::{MemoryStore, Observation};
use crate::momentum::momentum;
use crate::patterns::{Pattern, PatternDetector, ADAPTATION_BOOST};
use crate::rate::LearningRateAdapter;
use crate::status::KernelStatus;
use crate::volatility::VolatilityEstimator;

/// Outcome of a single ingestion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestResult {
    pub balance: f64,
    pub rate: f64,
    pub volatility: f64,
    pub adaptation_score: f64,
    pub memory_size: usize,
    pub prediction_error: f64,
    pub average_error: f64,
    pub momentum: f64,
    /// Volatility smoothing damped the balance update.
    pub smoothed: bool,
    pub decayed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<Pattern>,
}

#[derive(Debug, Clone)]
pub struct Kernel<C: Clock = SystemClock> {
    config: KernelConfig,
    fingerprint: String,
    clock: C,
    memory: MemoryStore,
    volatility: VolatilityEstimator,
    rate: LearningRateAdapter,
    balance: BalanceIntegrator,
    patterns: PatternDetector,
    decay: DecayScheduler,
    adaptation_score: f64,
    total_inputs: u64,
    last_update_ms: u64,
}

impl Kernel<SystemClock> {
    pub fn new(config: KernelConfig) -> KernelResult<Self> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> Kernel<C> {
    pub fn with_clock(config: KernelConfig, clock: C) -> KernelResult<Self> {
        config.validate()?;
        let fingerprint = config.fingerprint();
        if logging::enabled(logging::PIPELINE_LEVEL, logging::Domain::Config) {
            let rendered = serde_json::to_value(&config).unwrap_or_default();
            logging::log_config(&fingerprint, &rendered);
        }
        let last_update_ms = clock.now_ms();
        Ok(Self {
            memory: MemoryStore::new(config.memory_limit),
            volatility: VolatilityEstimator::new(config.pattern_window),
            rate: LearningRateAdapter::new(config.base_learning_rate, config.adaptation_factor),
            balance: BalanceIntegrator::new(config.volatility_threshold),
            patterns: PatternDetector::new(config.pattern_window),
            decay: DecayScheduler::new(config.decay_interval, config.decay_factor),
            adaptation_score: 0.0,
            total_inputs: 0,
            last_update_ms,
            fingerprint,
            clock,
            config,
        })
    }

    /// Ingest an observation stamped with the kernel's clock.
    pub fn ingest(&mut self, label: &str, sentiment: f64) -> KernelResult<IngestResult> {
        let now_ms = self.clock.now_ms();
        self.ingest_at(label, sentiment, now_ms)
    }

    /// Ingest an observation at an explicit time.
    ///
    /// Rejects non-finite sentiment before touching any state.
    pub fn ingest_at(
        &mut self,
        label: &str,
        sentiment: f64,
        now_ms: u64,
    ) -> KernelResult<IngestResult> {
        if !sentiment.is_finite() {
            return Err(KernelError::input(format!(
                "sentiment must be finite, got {}",
                sentiment
            )));
        }

        let eviction = self.memory.append(Observation {
            label: label.to_string(),
            sentiment,
            captured_at_ms: now_ms,
            rate_at_capture: self.rate.rate(),
        });
        if let Some(ev) = eviction {
            logging::log_eviction(ev.before, ev.after, ev.landmarks_kept);
        }

        let volatility = self.volatility.estimate(&self.memory);
        let rate = self.rate.adapt(volatility, self.balance.errors());
        let momentum = momentum(&self.memory);
        let update = self.balance.integrate(sentiment, rate, momentum, volatility);

        let pattern = self.patterns.detect(&self.memory, now_ms);
        if pattern.is_some() {
            self.adaptation_score = (self.adaptation_score + ADAPTATION_BOOST).min(1.0);
        }

        let decision = self
            .decay
            .evaluate(&self.memory, self.total_inputs, now_ms, self.last_update_ms);
        if decision.fired {
            self.balance.scale(decision.balance_factor);
            self.adaptation_score *= decision.adaptation_factor;
            logging::log_decay(
                decision.interval,
                decision.balance_factor,
                decision.idle,
                self.balance.balance(),
            );
        }

        self.total_inputs += 1;
        self.last_update_ms = now_ms;

        let result = IngestResult {
            balance: self.balance.balance(),
            rate,
            volatility,
            adaptation_score: self.adaptation_score,
            memory_size: self.memory.len(),
            prediction_error: update.prediction_error,
            average_error: self.balance.average_error(),
            momentum,
            smoothed: update.smoothed,
            decayed: decision.fired,
            pattern,
        };
        logging::log_ingest(
            self.total_inputs,
            label,
            sentiment,
            result.balance,
            result.rate,
            result.volatility,
            result.prediction_error,
            result.memory_size,
        );
        Ok(result)
    }

    pub fn status(&self) -> KernelStatus {
        KernelStatus::capture(self)
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn config_fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn balance(&self) -> f64 {
        self.balance.balance()
    }

    pub fn rate(&self) -> f64 {
        self.rate.rate()
    }

    pub fn adaptation_score(&self) -> f64 {
        self.adaptation_score
    }

    pub fn total_inputs(&self) -> u64 {
        self.total_inputs
    }

    pub fn last_update_ms(&self) -> u64 {
        self.last_update_ms
    }

    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    pub fn patterns(&self) -> &PatternDetector {
        &self.patterns
    }

    pub fn average_error(&self) -> f64 {
        self.balance.average_error()
    }

    pub fn average_volatility(&self) -> f64 {
        self.volatility.average()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{ManualClock, MS_PER_SEC};

    fn kernel(cfg: KernelConfig) -> (Kernel<ManualClock>, ManualClock) {
        let clock = ManualClock::at_ms(1_700_000_000_000);
        (Kernel::with_clock(cfg, clock.clone()).unwrap(), clock)
    }

    #[test]
    fn test_single_observation() {
        let (mut k, _) = kernel(KernelConfig::default());
        let r = k.ingest("A", 0.6).unwrap();
        assert_eq!(r.memory_size, 1);
        assert_eq!(r.volatility, 0.0);
        assert_eq!(r.momentum, 0.0);
        assert!((r.rate - 0.1).abs() < 1e-12);
        assert!(r.decayed);
        assert!((r.balance - 0.0594).abs() < 1e-12);
        assert!((r.prediction_error - 0.6).abs() < 1e-12);
        assert!((r.average_error - 0.6).abs() < 1e-12);
        assert_eq!(k.total_inputs(), 1);
    }

    #[test]
    fn test_rejects_non_finite_without_mutation() {
        let (mut k, _) = kernel(KernelConfig::default());
        k.ingest("A", 0.5).unwrap();
        let before = k.status();
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(k.ingest("B", bad), Err(KernelError::InvalidInput(_))));
        }
        assert_eq!(k.status(), before);
    }

    #[test]
    fn test_out_of_range_sentiment_accepted() {
        let (mut k, _) = kernel(KernelConfig::default());
        assert!(k.ingest("loud", 3.0).is_ok());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let cfg = KernelConfig {
            memory_limit: 0,
            ..Default::default()
        };
        assert!(matches!(
            Kernel::with_clock(cfg, ManualClock::new()),
            Err(KernelError::InvalidConfig { field: "memory_limit", .. })
        ));
    }

    #[test]
    fn test_rate_at_capture_is_pre_adaptation() {
        let (mut k, clock) = kernel(KernelConfig::default());
        for i in 0..6 {
            clock.advance_secs(1);
            let s = if i % 2 == 0 { 0.9 } else { -0.9 };
            k.ingest("x", s).unwrap();
        }
        let rate_before = k.rate();
        k.ingest("probe", 0.0).unwrap();
        let last = k.memory().iter().last().unwrap();
        assert_eq!(last.rate_at_capture, rate_before);
        assert_ne!(k.rate(), rate_before);
    }

    #[test]
    fn test_idle_gap_uses_previous_update_time() {
        let cfg = KernelConfig {
            decay_interval: 1,
            decay_factor: 0.9,
            ..Default::default()
        };
        let (mut k, clock) = kernel(cfg);
        k.ingest("a", 0.5).unwrap();
        let b1 = k.balance();

        clock.advance_secs(7200);
        let r = k.ingest("b", 0.5).unwrap();
        assert!(r.decayed);
        // idle for two hours: decay_factor * 0.95
        let rate = r.rate;
        let expected = ((1.0 - rate) * b1 + rate * 0.5) * 0.9 * 0.95;
        assert!((r.balance - expected).abs() < 1e-12);
        assert_eq!(k.last_update_ms(), k.clock().now_ms());
    }

    #[test]
    fn test_trend_raises_adaptation_score() {
        let cfg = KernelConfig {
            pattern_window: 10,
            ..Default::default()
        };
        let (mut k, clock) = kernel(cfg);
        let mut detected = 0;
        for i in 0..10 {
            clock.advance_ms(MS_PER_SEC);
            let s = if i < 5 { -0.8 } else { 0.8 };
            if k.ingest("step", s).unwrap().pattern.is_some() {
                detected += 1;
            }
        }
        assert_eq!(detected, 1);
        assert_eq!(k.patterns().log().len(), 1);
        assert!(k.adaptation_score() > 0.0 && k.adaptation_score() <= ADAPTATION_BOOST);
    }
}
