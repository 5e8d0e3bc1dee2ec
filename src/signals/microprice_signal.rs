use crate::signals::ema::Ema;
use crate::types::book_snapshot::BookSnapshot;

const BPS: f64 = 10_000.0;

/// Directional bias from top-of-book size imbalance.
///
/// Smoothed deviation of the microprice from mid, in basis points of mid.
/// Positive values mean the bid is heavier and favour resting on the bid.
#[derive(Debug, Clone)]
pub struct MicropriceSignal {
    ema: Ema,
}

impl MicropriceSignal {
    pub fn new(tau_seconds: f64) -> Self {
        Self {
            ema: Ema::new(tau_seconds),
        }
    }

    pub fn update(&mut self, snapshot: &BookSnapshot) -> f64 {
        let mid = snapshot.mid();
        let deviation_bps = (snapshot.microprice() - mid) / mid * BPS;

        self.ema.update(snapshot.local_ts_ns, deviation_bps)
    }

    pub fn value(&self) -> Option<f64> {
        self.ema.value()
    }
}
