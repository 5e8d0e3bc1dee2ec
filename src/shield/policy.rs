use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde::Serialize;

use crate::shield::shield_state::{ShieldCandidates, ShieldState};
use crate::types::side::Side;

/// One grid entry: a shield half-life together with its live shield state
/// and simulated fill counters.
///
/// Shields are written by the ingestion path and read by simulator tasks, so
/// they sit behind a mutex. Fill counters only ever increase and use atomics.
#[derive(Debug)]
pub struct Policy {
    half_life_secs: f64,
    shield: Mutex<ShieldState>,
    bid_fills: AtomicU64,
    ask_fills: AtomicU64,
}

/// Point-in-time copy of a policy for reporting.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct PolicySnapshot {
    pub half_life_secs: f64,
    pub shield: ShieldState,
    pub bid_fills: u64,
    pub ask_fills: u64,
}

impl PolicySnapshot {
    /// Bid fills per ask fill; `None` while no ask fill has been counted.
    pub fn fill_ratio(&self) -> Option<f64> {
        (self.ask_fills > 0).then(|| self.bid_fills as f64 / self.ask_fills as f64)
    }
}

impl Policy {
    pub fn new(half_life_secs: f64) -> Self {
        Self {
            half_life_secs,
            shield: Mutex::new(ShieldState::default()),
            bid_fills: AtomicU64::new(0),
            ask_fills: AtomicU64::new(0),
        }
    }

    pub fn half_life_secs(&self) -> f64 {
        self.half_life_secs
    }

    pub fn on_candidates(&self, now_ns: u64, candidates: ShieldCandidates) {
        self.shield
            .lock()
            .on_snapshot(now_ns, candidates, self.half_life_secs);
    }

    pub fn shield(&self) -> ShieldState {
        *self.shield.lock()
    }

    /// Current shield magnitude for `side`, as last written by the ingestion path.
    pub fn shield_value(&self, side: Side) -> f64 {
        let shield = self.shield.lock();
        match side {
            Side::Bid => shield.bid.value,
            Side::Ask => shield.ask.value,
        }
    }

    pub fn record_fill(&self, side: Side) -> u64 {
        let counter = match side {
            Side::Bid => &self.bid_fills,
            Side::Ask => &self.ask_fills,
        };
        counter.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn fills(&self, side: Side) -> u64 {
        match side {
            Side::Bid => self.bid_fills.load(Ordering::Relaxed),
            Side::Ask => self.ask_fills.load(Ordering::Relaxed),
        }
    }

    pub fn snapshot(&self) -> PolicySnapshot {
        PolicySnapshot {
            half_life_secs: self.half_life_secs,
            shield: self.shield(),
            bid_fills: self.fills(Side::Bid),
            ask_fills: self.fills(Side::Ask),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn new_policy_starts_flat() {
        let policy = Policy::new(2.0);
        let snapshot = policy.snapshot();
        assert_eq!(snapshot.half_life_secs, 2.0);
        assert_eq!(snapshot.shield, ShieldState::default());
        assert_eq!(snapshot.bid_fills, 0);
        assert_eq!(snapshot.ask_fills, 0);
        assert_eq!(snapshot.fill_ratio(), None);
    }

    #[test]
    fn record_fill_increments_one_side() {
        let policy = Policy::new(1.0);
        assert_eq!(policy.record_fill(Side::Bid), 1);
        assert_eq!(policy.record_fill(Side::Bid), 2);
        assert_eq!(policy.record_fill(Side::Ask), 1);
        assert_eq!(policy.fills(Side::Bid), 2);
        assert_eq!(policy.fills(Side::Ask), 1);
        assert_eq!(policy.snapshot().fill_ratio(), Some(2.0));
    }

    #[test]
    fn fractional_ratio_is_kept() {
        let policy = Policy::new(1.0);
        policy.record_fill(Side::Bid);
        policy.record_fill(Side::Ask);
        policy.record_fill(Side::Ask);
        assert_eq!(policy.snapshot().fill_ratio(), Some(0.5));
    }

    #[test]
    fn candidates_flow_into_shield() {
        let policy = Policy::new(1.0);
        policy.on_candidates(10, ShieldCandidates { bid: 0.01, ask: 0.002 });
        assert_eq!(policy.shield_value(Side::Bid), 0.01);
        assert_eq!(policy.shield_value(Side::Ask), 0.002);
    }

    #[test]
    fn concurrent_fills_are_not_lost() {
        let policy = Arc::new(Policy::new(1.0));
        let workers: Vec<_> = (0..8)
            .map(|index| {
                let policy = Arc::clone(&policy);
                thread::spawn(move || {
                    let side = if index % 2 == 0 { Side::Bid } else { Side::Ask };
                    for _ in 0..1_000 {
                        policy.record_fill(side);
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
        assert_eq!(policy.fills(Side::Bid), 4_000);
        assert_eq!(policy.fills(Side::Ask), 4_000);
    }
}
