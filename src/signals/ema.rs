const NANOS_PER_SEC: f64 = 1e9;

/// Time-aware exponential moving average keyed on monotonic nanosecond stamps.
#[derive(Debug, Clone)]
pub struct Ema {
    tau_seconds: f64,
    value: Option<f64>,
    last_update_ns: Option<u64>,
}

impl Ema {
    pub fn new(tau_seconds: f64) -> Self {
        Self {
            tau_seconds,
            value: None,
            last_update_ns: None,
        }
    }

    pub fn update(&mut self, now_ns: u64, sample: f64) -> f64 {
        let updated = match (self.value, self.last_update_ns) {
            (Some(previous), Some(previous_ns)) => {
                let dt_seconds = now_ns.saturating_sub(previous_ns) as f64 / NANOS_PER_SEC;
                let alpha = 1.0 - (-dt_seconds / self.tau_seconds).exp();

                previous + alpha * (sample - previous)
            }
            _ => sample,
        };

        self.value = Some(updated);
        self.last_update_ns = Some(now_ns);
        updated
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }
}
