//! Stress run for the kernel.
//!
//! Feeds a seeded random sentiment stream with random time gaps and checks
//! the bounded-state properties after every ingestion:
//! - memory size <= memory_limit
//! - rate in [0.01, 0.5]
//! - adaptation score in [0, 1]
//! - volatility >= 0
//!
//! Usage: SEED=7 EVENTS=200000 cargo run --release --bin stress

use std::env;
use std::time::Instant;

use anyhow::{bail, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use pulsekernel::rate::{RATE_MAX, RATE_MIN};
use pulsekernel::{Kernel, KernelConfig, ManualClock};

fn main() -> Result<()> {
    let seed: u64 = env::var("SEED").ok().and_then(|v| v.parse().ok()).unwrap_or(42);
    let events: u64 = env::var("EVENTS").ok().and_then(|v| v.parse().ok()).unwrap_or(100_000);
    let cfg = KernelConfig::from_env();
    let limit = cfg.memory_limit;

    let mut rng = StdRng::seed_from_u64(seed);
    let clock = ManualClock::at_ms(1_700_000_000_000);
    let mut kernel = Kernel::with_clock(cfg, clock.clone())?;

    let started = Instant::now();
    let mut patterns = 0u64;
    let mut decays = 0u64;
    for i in 0..events {
        // mostly bursts, occasionally long idle gaps
        let gap_ms = if rng.gen_bool(0.01) {
            rng.gen_range(3_600_000..7_200_000)
        } else {
            rng.gen_range(0..5_000)
        };
        clock.advance_ms(gap_ms);

        let sentiment: f64 = if rng.gen_bool(0.02) {
            if rng.gen_bool(0.5) {
                1.0
            } else {
                -1.0
            }
        } else {
            rng.gen_range(-0.3..0.3)
        };
        let r = kernel.ingest(&format!("evt-{}", i), sentiment)?;
        if r.pattern.is_some() {
            patterns += 1;
        }
        if r.decayed {
            decays += 1;
        }

        if r.memory_size > limit {
            bail!("step {}: memory {} exceeds limit {}", i, r.memory_size, limit);
        }
        if !(RATE_MIN..=RATE_MAX).contains(&r.rate) {
            bail!("step {}: rate {} out of bounds", i, r.rate);
        }
        if !(0.0..=1.0).contains(&r.adaptation_score) {
            bail!("step {}: adaptation score {} out of bounds", i, r.adaptation_score);
        }
        if r.volatility < 0.0 {
            bail!("step {}: negative volatility {}", i, r.volatility);
        }
    }
    let elapsed = started.elapsed();

    let status = kernel.status();
    println!("=== Stress: seed={} events={} ===", seed, events);
    println!("Elapsed:        {:.3}s", elapsed.as_secs_f64());
    println!(
        "Throughput:     {:.0} ingestions/s",
        events as f64 / elapsed.as_secs_f64().max(1e-9)
    );
    println!("Patterns:       {}", patterns);
    println!("Decays:         {}", decays);
    println!("Final balance:  {:.6}", status.balance);
    println!("Final rate:     {:.6}", status.rate);
    println!("Memory size:    {}/{}", status.memory_size, limit);
    println!("All invariants held.");
    Ok(())
}
