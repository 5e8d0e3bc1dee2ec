use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::errors::EngineError;
use crate::market::window_tracker::{WindowTracker, WindowView};
use crate::shield::policy::Policy;
use crate::shield::shield_state::ShieldCandidates;
use crate::signals::microprice_signal::MicropriceSignal;
use crate::types::book_snapshot::BookSnapshot;
use crate::types::engine_settings::EngineSettings;
use crate::types::policy_grid::PolicyGrid;

/// Sole writer of window and shield state.
///
/// Snapshots must be applied in arrival order. Readers get immutable window
/// views and the directional signal through watch channels, and shared
/// handles to the policies.
pub struct ShieldEngine {
    window: WindowTracker,
    policies: Vec<Arc<Policy>>,
    signal: MicropriceSignal,
    timestamp_tolerance_ns: u64,
    market_sender: watch::Sender<Option<WindowView>>,
    signal_sender: watch::Sender<f64>,
}

impl ShieldEngine {
    pub fn new(grid: &PolicyGrid, settings: &EngineSettings) -> Result<Self, EngineError> {
        let policies = grid
            .half_lives()
            .iter()
            .map(|half_life| Arc::new(Policy::new(*half_life)))
            .collect();

        let (market_sender, _) = watch::channel(None);
        let (signal_sender, _) = watch::channel(0.0);

        Ok(Self {
            window: WindowTracker::new(settings.window())?,
            policies,
            signal: MicropriceSignal::new(settings.signal_tau_secs),
            timestamp_tolerance_ns: u64::try_from(settings.timestamp_tolerance().as_nanos())
                .unwrap_or(u64::MAX),
            market_sender,
            signal_sender,
        })
    }

    /// Policies in grid order.
    pub fn policies(&self) -> Vec<Arc<Policy>> {
        self.policies.clone()
    }

    pub fn subscribe_market(&self) -> watch::Receiver<Option<WindowView>> {
        self.market_sender.subscribe()
    }

    pub fn subscribe_signal(&self) -> watch::Receiver<f64> {
        self.signal_sender.subscribe()
    }

    pub fn window(&self) -> &WindowTracker {
        &self.window
    }

    /// Applies one snapshot to the window, every policy's shield and the
    /// signal, then publishes the new view. Rejected snapshots leave all
    /// state untouched.
    pub fn on_snapshot(&mut self, snapshot: BookSnapshot) -> Result<WindowView, EngineError> {
        let snapshot = self.admit(snapshot)?;
        let view = self.window.on_snapshot(snapshot)?;

        let candidates = ShieldCandidates::from_window(&view);
        for policy in &self.policies {
            policy.on_candidates(snapshot.local_ts_ns, candidates);
        }

        let signal = self.signal.update(&snapshot);

        self.market_sender.send_replace(Some(view));
        self.signal_sender.send_replace(signal);

        Ok(view)
    }

    /// Regressions within tolerance are pinned to the latest timestamp so
    /// decay never sees negative elapsed time.
    fn admit(&self, snapshot: BookSnapshot) -> Result<BookSnapshot, EngineError> {
        let Some(latest) = self.window.latest() else {
            return Ok(snapshot);
        };
        if snapshot.local_ts_ns >= latest.local_ts_ns {
            return Ok(snapshot);
        }

        let regression_ns = latest.local_ts_ns - snapshot.local_ts_ns;
        if regression_ns <= self.timestamp_tolerance_ns {
            return Ok(snapshot.with_timestamp(latest.local_ts_ns));
        }

        Err(EngineError::TimestampRegression {
            previous_ns: latest.local_ts_ns,
            received_ns: snapshot.local_ts_ns,
        })
    }

    pub async fn run(mut self, mut snapshots: mpsc::Receiver<BookSnapshot>) {
        let mut accepted: u64 = 0;
        let mut rejected: u64 = 0;

        while let Some(snapshot) = snapshots.recv().await {
            match self.on_snapshot(snapshot) {
                Ok(view) => {
                    accepted += 1;
                    debug!(
                        ts_ns = view.latest.local_ts_ns,
                        low_bid = %view.low_bid,
                        high_ask = %view.high_ask,
                        retained = self.window.len(),
                        "applied book snapshot"
                    );
                }
                Err(error) => {
                    rejected += 1;
                    warn!(%error, rejected, "rejected book snapshot");
                }
            }
        }

        info!(accepted, rejected, "book stream closed");
    }
}
