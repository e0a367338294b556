//! Property sweeps over seeded random streams.
//!
//! Each sweep runs several configurations against reproducible inputs and
//! checks the invariants that must hold after every ingestion.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use pulsekernel::clock::MS_PER_SEC;
use pulsekernel::rate::{RATE_MAX, RATE_MIN};
use pulsekernel::{IngestResult, Kernel, KernelConfig, ManualClock};

const T0: u64 = 1_700_000_000_000;

fn configs() -> Vec<KernelConfig> {
    vec![
        KernelConfig::default(),
        KernelConfig {
            memory_limit: 1,
            ..Default::default()
        },
        KernelConfig {
            memory_limit: 25,
            pattern_window: 10,
            ..Default::default()
        },
        KernelConfig {
            memory_limit: 60,
            base_learning_rate: 0.9,
            adaptation_factor: 1.0,
            decay_factor: 1.0,
            decay_interval: 3,
            pattern_window: 12,
            volatility_threshold: 0.0,
        },
    ]
}

/// Sentiment stream with occasional extremes and out-of-range values.
fn stream(seed: u64, n: usize) -> Vec<(u64, f64)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut t = T0;
    (0..n)
        .map(|_| {
            t += if rng.gen_bool(0.02) {
                rng.gen_range(3_600 * MS_PER_SEC..4 * 3_600 * MS_PER_SEC)
            } else {
                rng.gen_range(0..20 * MS_PER_SEC)
            };
            let s = match rng.gen_range(0..10) {
                0 => rng.gen_range(-5.0..5.0),
                1 | 2 => {
                    if rng.gen_bool(0.5) {
                        1.0
                    } else {
                        -1.0
                    }
                }
                _ => rng.gen_range(-1.0..1.0),
            };
            (t, s)
        })
        .collect()
}

fn replay(cfg: &KernelConfig, inputs: &[(u64, f64)]) -> Vec<IngestResult> {
    let mut kernel = Kernel::with_clock(cfg.clone(), ManualClock::at_ms(T0)).unwrap();
    inputs
        .iter()
        .enumerate()
        .map(|(i, &(t, s))| kernel.ingest_at(&format!("p{}", i), s, t).unwrap())
        .collect()
}

#[test]
fn bounded_state_holds_for_any_stream() {
    for seed in 0..8 {
        let inputs = stream(seed, 600);
        for cfg in configs() {
            for (i, r) in replay(&cfg, &inputs).iter().enumerate() {
                assert!(
                    r.memory_size <= cfg.memory_limit,
                    "seed {} step {}: memory {} > {}",
                    seed,
                    i,
                    r.memory_size,
                    cfg.memory_limit
                );
                assert!(
                    (RATE_MIN..=RATE_MAX).contains(&r.rate),
                    "seed {} step {}: rate {}",
                    seed,
                    i,
                    r.rate
                );
                assert!(
                    (0.0..=1.0).contains(&r.adaptation_score),
                    "seed {} step {}: adaptation {}",
                    seed,
                    i,
                    r.adaptation_score
                );
                assert!(r.volatility >= 0.0);
                assert!(r.balance.is_finite());
            }
        }
    }
}

#[test]
fn volatility_zero_below_two_records() {
    for cfg in configs() {
        let r = replay(&cfg, &stream(99, 1));
        assert_eq!(r[0].volatility, 0.0);
    }
}

#[test]
fn replay_is_bit_for_bit_deterministic() {
    let inputs = stream(1234, 500);
    for cfg in configs() {
        let a = replay(&cfg, &inputs);
        let b = replay(&cfg, &inputs);
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.balance.to_bits(), y.balance.to_bits());
            assert_eq!(x.rate.to_bits(), y.rate.to_bits());
            assert_eq!(x.adaptation_score.to_bits(), y.adaptation_score.to_bits());
        }
    }
}

#[test]
fn status_reads_do_not_disturb_ingestion() {
    let inputs = stream(7, 300);
    let (warmup, rest) = inputs.split_at(150);
    let cfg = KernelConfig {
        memory_limit: 50,
        ..Default::default()
    };

    let mut quiet = Kernel::with_clock(cfg.clone(), ManualClock::at_ms(T0)).unwrap();
    let mut observed = Kernel::with_clock(cfg, ManualClock::at_ms(T0)).unwrap();
    for (i, &(t, s)) in warmup.iter().enumerate() {
        quiet.ingest_at(&format!("p{}", i), s, t).unwrap();
        observed.ingest_at(&format!("p{}", i), s, t).unwrap();
    }

    for (i, &(t, s)) in rest.iter().enumerate() {
        let first = observed.status();
        for _ in 0..5 {
            assert_eq!(observed.status(), first);
        }
        let a = quiet.ingest_at(&format!("q{}", i), s, t).unwrap();
        let b = observed.ingest_at(&format!("q{}", i), s, t).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn rejected_input_leaves_state_untouched() {
    let inputs = stream(3, 50);
    let mut kernel = Kernel::with_clock(KernelConfig::default(), ManualClock::at_ms(T0)).unwrap();
    for (i, &(t, s)) in inputs.iter().enumerate() {
        kernel.ingest_at(&format!("p{}", i), s, t).unwrap();
        let before = kernel.status();
        assert!(kernel.ingest_at("bad", f64::NAN, t).is_err());
        assert_eq!(kernel.status(), before);
    }
}
