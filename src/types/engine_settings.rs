use std::time::Duration;

use anyhow::{Result, bail};
use serde::Deserialize;

#[derive(Debug, Copy, Clone, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Rolling window length for the bid-low / ask-high extremes.
    pub window_ms: u64,

    /// Cadence at which a hypothetical quote is synthesised for every policy.
    pub quote_interval_ms: u64,

    /// How long a hypothetical quote rests before its fill is judged.
    pub cancel_delay_ms: u64,

    pub report_interval_ms: u64,

    /// Minimum competitive margin beyond the shield, as a price fraction.
    pub edge_buffer: f64,

    /// Timestamp regressions up to this amount are clamped instead of rejected.
    pub timestamp_tolerance_ms: u64,

    /// Time constant of the directional signal smoothing.
    pub signal_tau_secs: f64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            window_ms: 1_000,
            quote_interval_ms: 200,
            cancel_delay_ms: 1_000,
            report_interval_ms: 1_000,
            edge_buffer: 5e-4,
            timestamp_tolerance_ms: 0,
            signal_tau_secs: 1.0,
        }
    }
}

impl EngineSettings {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    pub fn quote_interval(&self) -> Duration {
        Duration::from_millis(self.quote_interval_ms)
    }

    pub fn cancel_delay(&self) -> Duration {
        Duration::from_millis(self.cancel_delay_ms)
    }

    pub fn report_interval(&self) -> Duration {
        Duration::from_millis(self.report_interval_ms)
    }

    pub fn timestamp_tolerance(&self) -> Duration {
        Duration::from_millis(self.timestamp_tolerance_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.window_ms == 0 {
            bail!("window_ms must be > 0");
        }
        if self.quote_interval_ms == 0 {
            bail!("quote_interval_ms must be > 0");
        }
        if self.report_interval_ms == 0 {
            bail!("report_interval_ms must be > 0");
        }
        if !self.edge_buffer.is_finite() || self.edge_buffer < 0.0 {
            bail!("edge_buffer must be finite and >= 0");
        }
        if !self.signal_tau_secs.is_finite() || self.signal_tau_secs <= 0.0 {
            bail!("signal_tau_secs must be > 0");
        }
        Ok(())
    }
}
