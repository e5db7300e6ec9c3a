//! Observability counters: incremented without the Timer Table lock via
//! atomics. Torn reads are tolerated — these numbers feed the Statistics
//! Reporter only, never a correctness decision.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct Counters {
    pub sent: AtomicU64,
    pub acked: AtomicU64,
    pub resent: AtomicU64,
    pub timeouts: AtomicU64,
    pub rtt_increase: AtomicU64,
    pub rtt_decrease: AtomicU64,
}

#[derive(Debug, Clone, Copy)]
pub struct CounterSnapshot {
    pub sent: u64,
    pub acked: u64,
    pub resent: u64,
    pub timeouts: u64,
    pub rtt_increase: u64,
    pub rtt_decrease: u64,
}

impl Counters {
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            sent: self.sent.load(Ordering::Relaxed),
            acked: self.acked.load(Ordering::Relaxed),
            resent: self.resent.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            rtt_increase: self.rtt_increase.load(Ordering::Relaxed),
            rtt_decrease: self.rtt_decrease.load(Ordering::Relaxed),
        }
    }
}

impl CounterSnapshot {
    /// `timeouts / (sent + resent)`, or 0 if nothing has been sent yet.
    pub fn loss_ratio(&self) -> f64 {
        let denom = self.sent + self.resent;
        if denom == 0 {
            0.0
        } else {
            self.timeouts as f64 / denom as f64
        }
    }
}
