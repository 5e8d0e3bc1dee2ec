use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::reporting::fill_report::FillReport;
use crate::shield::policy::Policy;
use crate::types::instrument::Instrument;

pub struct Reporter {
    instrument: Instrument,
    policies: Vec<Arc<Policy>>,
    interval: Duration,
}

impl Reporter {
    pub fn new(instrument: Instrument, policies: Vec<Arc<Policy>>, interval: Duration) -> Self {
        Self {
            instrument,
            policies,
            interval,
        }
    }

    pub fn report(&self) -> FillReport {
        FillReport::collect(self.instrument.symbol(), &self.policies, Utc::now())
    }

    pub async fn run(self) {
        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            let report = self.report();
            info!("{report}");

            match serde_json::to_string(&report) {
                Ok(json) => debug!(report = %json),
                Err(error) => warn!(%error, "failed to serialize fill report"),
            }
        }
    }
}
