use serde::Serialize;

use crate::market::window_tracker::WindowView;

const NANOS_PER_SEC: f64 = 1e9;

/// Decaying log-price margin for one side of the book.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize)]
pub struct SideShield {
    pub value: f64,
    pub updated_at_ns: u64,
}

impl SideShield {
    pub fn new(value: f64, updated_at_ns: u64) -> Self {
        Self {
            value,
            updated_at_ns,
        }
    }

    /// Continuous exponential decay up to `now_ns`; the reference time moves
    /// forward even when the value is zero.
    pub fn decay_to(&mut self, now_ns: u64, half_life_secs: f64) {
        let elapsed_secs = now_ns.saturating_sub(self.updated_at_ns) as f64 / NANOS_PER_SEC;
        self.value *= (-elapsed_secs / half_life_secs).exp2();
        self.updated_at_ns = now_ns;
    }

    /// Replaces the value when `candidate` exceeds it. Returns whether it did.
    pub fn ratchet(&mut self, candidate: f64, now_ns: u64) -> bool {
        if candidate > self.value {
            self.value = candidate;
            self.updated_at_ns = now_ns;
            return true;
        }
        false
    }
}

/// Instantaneous shields implied by the current rolling window.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ShieldCandidates {
    /// Log drop of the best bid since the start of the window.
    pub bid: f64,
    /// Log rise of the best ask since the start of the window.
    pub ask: f64,
}

impl ShieldCandidates {
    pub fn from_window(view: &WindowView) -> Self {
        Self {
            bid: view.oldest.bid_price().log_ratio(view.latest.bid_price()),
            ask: view.latest.ask_price().log_ratio(view.oldest.ask_price()),
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize)]
pub struct ShieldState {
    pub bid: SideShield,
    pub ask: SideShield,
}

impl ShieldState {
    /// Decay both sides to `now_ns`, then ratchet each up to its candidate.
    pub fn on_snapshot(&mut self, now_ns: u64, candidates: ShieldCandidates, half_life_secs: f64) {
        self.bid.decay_to(now_ns, half_life_secs);
        self.ask.decay_to(now_ns, half_life_secs);

        self.bid.ratchet(candidates.bid, now_ns);
        self.ask.ratchet(candidates.ask, now_ns);
    }
}
