use crate::errors::EngineError;
use crate::types::price::Price;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BookLevel {
    pub price: Price,
    pub size: f64,
}

impl BookLevel {
    pub fn new(price: f64, size: f64) -> Result<Self, EngineError> {
        let price = Price::new(price)?;
        if !size.is_finite() || size < 0.0 {
            return Err(EngineError::MalformedSnapshot {
                reason: format!("level size {size} is invalid"),
            });
        }

        Ok(Self { price, size })
    }
}

/// Top of book as observed locally at `local_ts_ns` (monotonic clock).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BookSnapshot {
    pub local_ts_ns: u64,
    pub best_bid: BookLevel,
    pub best_ask: BookLevel,
}

impl BookSnapshot {
    pub fn new(local_ts_ns: u64, best_bid: BookLevel, best_ask: BookLevel) -> Self {
        Self {
            local_ts_ns,
            best_bid,
            best_ask,
        }
    }

    /// Builds a snapshot from raw feed values, rejecting unusable prices or sizes.
    pub fn from_raw(
        local_ts_ns: u64,
        bid_price: f64,
        bid_size: f64,
        ask_price: f64,
        ask_size: f64,
    ) -> Result<Self, EngineError> {
        Ok(Self::new(
            local_ts_ns,
            BookLevel::new(bid_price, bid_size)?,
            BookLevel::new(ask_price, ask_size)?,
        ))
    }

    pub fn bid_price(&self) -> Price {
        self.best_bid.price
    }

    pub fn ask_price(&self) -> Price {
        self.best_ask.price
    }

    pub fn mid(&self) -> f64 {
        (self.best_bid.price.as_f64() + self.best_ask.price.as_f64()) / 2.0
    }

    /// Size-weighted mid. Falls back to mid when both sides are empty.
    pub fn microprice(&self) -> f64 {
        let bid_size = self.best_bid.size;
        let ask_size = self.best_ask.size;
        let total = bid_size + ask_size;
        if total <= 0.0 {
            return self.mid();
        }

        (self.best_bid.price.as_f64() * ask_size + self.best_ask.price.as_f64() * bid_size) / total
    }

    pub fn with_timestamp(mut self, local_ts_ns: u64) -> Self {
        self.local_ts_ns = local_ts_ns;
        self
    }
}
