//! Kernel configuration.
//!
//! Immutable once a kernel is built. Values come from defaults, from
//! `PULSE_*` environment variables, or from a (possibly partial) JSON
//! document; every path ends in [`KernelConfig::validate`].

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{KernelError, KernelResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Capacity of the memory store.
    pub memory_limit: usize,
    /// Rate the adapter pulls toward when volatility and error are neutral.
    pub base_learning_rate: f64,
    /// Blend weight of the target rate on each adaptation step.
    pub adaptation_factor: f64,
    /// Multiplier applied to the balance when decay fires.
    pub decay_factor: f64,
    /// Nominal number of ingestions between decays, before activity scaling.
    pub decay_interval: u64,
    /// Sentiments considered by the volatility estimator and pattern detector.
    pub pattern_window: usize,
    /// Volatility above which the balance is smoothed toward its prior value.
    pub volatility_threshold: f64,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            memory_limit: 1000,
            base_learning_rate: 0.1,
            adaptation_factor: 0.05,
            decay_factor: 0.99,
            decay_interval: 10,
            pattern_window: 20,
            volatility_threshold: 0.3,
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

impl KernelConfig {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            memory_limit: env_or("PULSE_MEMORY_LIMIT", d.memory_limit),
            base_learning_rate: env_or("PULSE_BASE_LEARNING_RATE", d.base_learning_rate),
            adaptation_factor: env_or("PULSE_ADAPTATION_FACTOR", d.adaptation_factor),
            decay_factor: env_or("PULSE_DECAY_FACTOR", d.decay_factor),
            decay_interval: env_or("PULSE_DECAY_INTERVAL", d.decay_interval),
            pattern_window: env_or("PULSE_PATTERN_WINDOW", d.pattern_window),
            volatility_threshold: env_or("PULSE_VOLATILITY_THRESHOLD", d.volatility_threshold),
        }
    }

    /// Parse a JSON document; missing keys take their defaults.
    pub fn from_json_str(doc: &str) -> KernelResult<Self> {
        let cfg: Self =
            serde_json::from_str(doc).map_err(|e| KernelError::config("document", e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let doc = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let cfg = Self::from_json_str(&doc)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(cfg)
    }

    /// Check every field against its domain, reporting the first violation.
    pub fn validate(&self) -> KernelResult<()> {
        if self.memory_limit == 0 {
            return Err(KernelError::config("memory_limit", "must be > 0"));
        }
        let r = self.base_learning_rate;
        if !(r.is_finite() && r > 0.0 && r < 1.0) {
            return Err(KernelError::config(
                "base_learning_rate",
                format!("{} not in (0, 1)", r),
            ));
        }
        let a = self.adaptation_factor;
        if !(a.is_finite() && (0.0..=1.0).contains(&a)) {
            return Err(KernelError::config(
                "adaptation_factor",
                format!("{} not in [0, 1]", a),
            ));
        }
        let d = self.decay_factor;
        if !(d.is_finite() && d > 0.0 && d <= 1.0) {
            return Err(KernelError::config("decay_factor", format!("{} not in (0, 1]", d)));
        }
        if self.decay_interval == 0 {
            return Err(KernelError::config("decay_interval", "must be > 0"));
        }
        if self.pattern_window == 0 {
            return Err(KernelError::config("pattern_window", "must be > 0"));
        }
        let v = self.volatility_threshold;
        if !(v.is_finite() && v >= 0.0) {
            return Err(KernelError::config(
                "volatility_threshold",
                format!("{} must be finite and >= 0", v),
            ));
        }
        Ok(())
    }

    /// SHA-256 of the canonical JSON encoding.
    pub fn fingerprint(&self) -> String {
        let canonical = serde_json::to_string(self).unwrap_or_default();
        hex::encode(Sha256::digest(canonical.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = KernelConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.memory_limit, 1000);
        assert_eq!(cfg.decay_interval, 10);
        assert_eq!(cfg.pattern_window, 20);
    }

    #[test]
    fn test_rejects_out_of_domain_fields() {
        let with = |f: fn(&mut KernelConfig)| {
            let mut cfg = KernelConfig::default();
            f(&mut cfg);
            cfg
        };
        let cases: Vec<(KernelConfig, &str)> = vec![
            (with(|c| c.memory_limit = 0), "memory_limit"),
            (with(|c| c.base_learning_rate = 0.0), "base_learning_rate"),
            (with(|c| c.base_learning_rate = 1.0), "base_learning_rate"),
            (with(|c| c.adaptation_factor = 1.5), "adaptation_factor"),
            (with(|c| c.decay_factor = 0.0), "decay_factor"),
            (with(|c| c.decay_factor = f64::NAN), "decay_factor"),
            (with(|c| c.decay_interval = 0), "decay_interval"),
            (with(|c| c.pattern_window = 0), "pattern_window"),
            (with(|c| c.volatility_threshold = -0.1), "volatility_threshold"),
        ];
        for (cfg, expected) in cases {
            match cfg.validate() {
                Err(KernelError::InvalidConfig { field, .. }) => assert_eq!(field, expected),
                other => panic!("expected {} rejection, got {:?}", expected, other),
            }
        }
    }

    #[test]
    fn test_boundary_values_accepted() {
        let cfg = KernelConfig {
            adaptation_factor: 0.0,
            decay_factor: 1.0,
            volatility_threshold: 0.0,
            memory_limit: 1,
            ..Default::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let cfg =
            KernelConfig::from_json_str(r#"{"memory_limit": 20, "decay_factor": 0.5}"#).unwrap();
        assert_eq!(cfg.memory_limit, 20);
        assert_eq!(cfg.decay_factor, 0.5);
        assert_eq!(cfg.base_learning_rate, 0.1);
    }

    #[test]
    fn test_json_validation_applies() {
        let err = KernelConfig::from_json_str(r#"{"pattern_window": 0}"#).unwrap_err();
        assert!(matches!(err, KernelError::InvalidConfig { field: "pattern_window", .. }));
        let err = KernelConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, KernelError::InvalidConfig { field: "document", .. }));
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"pattern_window": 30}}"#).unwrap();
        let cfg = KernelConfig::from_json_file(file.path()).unwrap();
        assert_eq!(cfg.pattern_window, 30);
        assert!(KernelConfig::from_json_file(Path::new("/nonexistent/pulse.json")).is_err());
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let a = KernelConfig::default();
        let b = KernelConfig {
            memory_limit: 500,
            ..Default::default()
        };
        assert_eq!(a.fingerprint(), KernelConfig::default().fingerprint());
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }
}
