use std::fmt;

use anyhow::{Result, bail};

/// Exchange symbol the engine is evaluating, e.g. `BTCUSDT`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Instrument {
    symbol: String,
}

impl Instrument {
    pub fn new(symbol: &str) -> Result<Self> {
        let symbol = symbol.trim();
        if symbol.is_empty() || !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
            bail!("invalid instrument symbol: {symbol:?}");
        }

        Ok(Self {
            symbol: symbol.to_uppercase(),
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Lowercase form used in exchange stream names.
    pub fn stream_name(&self) -> String {
        self.symbol.to_lowercase()
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.symbol)
    }
}

impl fmt::Debug for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instrument({})", self)
    }
}
