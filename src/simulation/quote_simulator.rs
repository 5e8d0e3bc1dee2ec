use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, trace};

use crate::market::window_tracker::WindowView;
use crate::shield::policy::Policy;
use crate::simulation::simulated_quote::SimulatedQuote;
use crate::types::engine_settings::EngineSettings;
use crate::types::side::Side;

/// Periodically rests a hypothetical quote for every policy and, one cancel
/// delay later, judges it against the live window extremes.
///
/// Each judgement runs in its own task and always resolves after exactly the
/// cancel delay; nothing cancels it early.
pub struct QuoteSimulator {
    policies: Vec<Arc<Policy>>,
    market: watch::Receiver<Option<WindowView>>,
    signal: watch::Receiver<f64>,
    quote_interval: Duration,
    cancel_delay: Duration,
    edge_buffer: f64,
}

impl QuoteSimulator {
    pub fn new(
        policies: Vec<Arc<Policy>>,
        market: watch::Receiver<Option<WindowView>>,
        signal: watch::Receiver<f64>,
        settings: &EngineSettings,
    ) -> Self {
        Self {
            policies,
            market,
            signal,
            quote_interval: settings.quote_interval(),
            cancel_delay: settings.cancel_delay(),
            edge_buffer: settings.edge_buffer,
        }
    }

    pub async fn run(self) {
        let mut ticker = time::interval_at(Instant::now() + self.quote_interval, self.quote_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.on_tick();
        }
    }

    /// Spawns one delayed check per policy. Returns no handles when there is
    /// no market view yet.
    pub fn on_tick(&self) -> Vec<JoinHandle<bool>> {
        let Some(view) = *self.market.borrow() else {
            trace!("no market view yet; skipping quote tick");
            return Vec::new();
        };
        let side = Side::from_signal(*self.signal.borrow());

        self.policies
            .iter()
            .map(|policy| {
                let quote =
                    SimulatedQuote::price(side, &view, policy.shield_value(side), self.edge_buffer);

                tokio::spawn(judge(
                    Arc::clone(policy),
                    quote,
                    self.market.clone(),
                    self.cancel_delay,
                ))
            })
            .collect()
    }
}

async fn judge(
    policy: Arc<Policy>,
    quote: SimulatedQuote,
    market: watch::Receiver<Option<WindowView>>,
    cancel_delay: Duration,
) -> bool {
    time::sleep(cancel_delay).await;

    let Some(view) = *market.borrow() else {
        return false;
    };
    if !quote.would_fill(&view) {
        return false;
    }

    let fills = policy.record_fill(quote.side);
    debug!(
        half_life_secs = policy.half_life_secs(),
        side = %quote.side,
        price = quote.price,
        fills,
        "simulated quote filled"
    );
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::window_tracker::WindowTracker;
    use crate::shield::shield_state::ShieldCandidates;
    use crate::types::book_snapshot::BookSnapshot;

    const MS: u64 = 1_000_000;

    struct Harness {
        tracker: WindowTracker,
        market: watch::Sender<Option<WindowView>>,
        signal: watch::Sender<f64>,
        simulator: QuoteSimulator,
        policy: Arc<Policy>,
    }

    fn harness(policies: Vec<Arc<Policy>>) -> Harness {
        let (market, market_rx) = watch::channel(None);
        let (signal, signal_rx) = watch::channel(0.0);
        let policy = Arc::clone(&policies[0]);
        let simulator =
            QuoteSimulator::new(policies, market_rx, signal_rx, &EngineSettings::default());

        Harness {
            tracker: WindowTracker::new(Duration::from_secs(1)).unwrap(),
            market,
            signal,
            simulator,
            policy,
        }
    }

    impl Harness {
        fn publish(&mut self, ts_ms: u64, bid: f64, ask: f64) {
            let snapshot = BookSnapshot::from_raw(ts_ms * MS, bid, 1.0, ask, 1.0).unwrap();
            let view = self.tracker.on_snapshot(snapshot).unwrap();
            self.market.send_replace(Some(view));
        }
    }

    async fn outcomes(handles: Vec<JoinHandle<bool>>) -> Vec<bool> {
        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }
        results
    }

    #[tokio::test(start_paused = true)]
    async fn skips_tick_without_market_view() {
        let harness = harness(vec![Arc::new(Policy::new(1.0))]);
        assert!(harness.simulator.on_tick().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn bid_quote_fills_against_later_low() {
        let mut harness = harness(vec![Arc::new(Policy::new(1.0))]);
        harness.policy.on_candidates(0, ShieldCandidates { bid: 0.01, ask: 0.0 });
        harness.signal.send_replace(1.0);
        harness.publish(0, 100.0, 101.0);

        // quote rests at 100 * (1 - 0.01 - 0.0005) = 98.95
        let handles = harness.simulator.on_tick();
        assert_eq!(handles.len(), 1);

        time::sleep(Duration::from_millis(400)).await;
        harness.publish(400, 98.0, 99.0);

        assert_eq!(outcomes(handles).await, vec![true]);
        assert_eq!(harness.policy.fills(Side::Bid), 1);
        assert_eq!(harness.policy.fills(Side::Ask), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn judges_against_view_at_expiry_not_submission() {
        let mut harness = harness(vec![Arc::new(Policy::new(1.0))]);
        harness.signal.send_replace(1.0);
        harness.publish(0, 100.0, 101.0);

        // no shield: quote at 99.95 while the window low is 100, so it would
        // not fill at submission time
        let handles = harness.simulator.on_tick();
        time::sleep(Duration::from_millis(200)).await;
        harness.publish(200, 99.9, 100.9);

        assert_eq!(outcomes(handles).await, vec![true]);
    }

    #[tokio::test(start_paused = true)]
    async fn ask_quote_misses_quiet_market() {
        let mut harness = harness(vec![Arc::new(Policy::new(1.0))]);
        harness.signal.send_replace(-0.5);
        harness.publish(0, 100.0, 101.0);

        let handles = harness.simulator.on_tick();
        time::sleep(Duration::from_millis(500)).await;
        harness.publish(500, 100.0, 101.02);

        assert_eq!(outcomes(handles).await, vec![false]);
        assert_eq!(harness.policy.fills(Side::Ask), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn check_resolves_after_exactly_the_cancel_delay() {
        let mut harness = harness(vec![Arc::new(Policy::new(1.0))]);
        harness.signal.send_replace(1.0);
        harness.publish(0, 100.0, 101.0);

        let started = Instant::now();
        let handles = harness.simulator.on_tick();
        harness.publish(10, 90.0, 91.0);
        outcomes(handles).await;

        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(1), "resolved early after {elapsed:?}");
        assert!(elapsed < Duration::from_millis(1_005), "resolved late after {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn policies_are_judged_independently() {
        let tight = Arc::new(Policy::new(1.0));
        let wide = Arc::new(Policy::new(30.0));
        wide.on_candidates(0, ShieldCandidates { bid: 0.05, ask: 0.0 });

        let mut harness = harness(vec![Arc::clone(&tight), Arc::clone(&wide)]);
        harness.signal.send_replace(2.0);
        harness.publish(0, 100.0, 101.0);

        let handles = harness.simulator.on_tick();
        time::sleep(Duration::from_millis(300)).await;
        harness.publish(300, 99.0, 100.0);

        assert_eq!(outcomes(handles).await, vec![true, false]);
        assert_eq!(tight.fills(Side::Bid), 1);
        assert_eq!(wide.fills(Side::Bid), 0);
    }
}
