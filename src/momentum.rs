//! Short-horizon momentum.

use crate::memory::MemoryStore;

pub const MOMENTUM_WINDOW: usize = 5;
const RECENT_SPAN: usize = 3;

/// Mean of the last three sentiments minus the mean of the two before them.
///
/// 0.0 until the store holds five records.
pub fn momentum(memory: &MemoryStore) -> f64 {
    if memory.len() < MOMENTUM_WINDOW {
        return 0.0;
    }
    momentum_of(&memory.recent_sentiments(MOMENTUM_WINDOW))
}

fn momentum_of(window: &[f64]) -> f64 {
    if window.len() <= RECENT_SPAN {
        return 0.0;
    }
    let (older, recent) = window.split_at(window.len() - RECENT_SPAN);
    let recent_avg = recent.iter().sum::<f64>() / RECENT_SPAN as f64;
    let older_avg = older.iter().sum::<f64>() / older.len() as f64;
    recent_avg - older_avg
}
