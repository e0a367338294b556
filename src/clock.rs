//! Time sources.
//!
//! The kernel never reads wall time directly; it asks a [`Clock`]. Tests use
//! [`ManualClock`] to simulate idle gaps without sleeping.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub const MS_PER_SEC: u64 = 1_000;

/// Millisecond epoch time source.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

/// Wall clock backed by `chrono::Utc`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        chrono::Utc::now().timestamp_millis().max(0) as u64
    }
}

/// Manually driven clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    current_ms: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at_ms(start_ms: u64) -> Self {
        Self {
            current_ms: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    pub fn set_ms(&self, ms: u64) {
        self.current_ms.store(ms, Ordering::SeqCst);
    }

    /// Returns the new time.
    pub fn advance_ms(&self, ms: u64) -> u64 {
        self.current_ms.fetch_add(ms, Ordering::SeqCst).saturating_add(ms)
    }

    pub fn advance_secs(&self, secs: u64) -> u64 {
        self.advance_ms(secs.saturating_mul(MS_PER_SEC))
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.current_ms.load(Ordering::SeqCst)
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}
