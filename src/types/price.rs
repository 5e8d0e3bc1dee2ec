use std::fmt;

use crate::errors::EngineError;

/// A strictly positive, finite quoted price.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub struct Price(f64);

impl Price {
    pub fn new(value: f64) -> Result<Self, EngineError> {
        if !value.is_finite() {
            return Err(EngineError::MalformedSnapshot {
                reason: format!("price {value} is not finite"),
            });
        }
        if value <= 0.0 {
            return Err(EngineError::MalformedSnapshot {
                reason: format!("price {value} is not positive"),
            });
        }

        Ok(Price(value))
    }

    pub fn as_f64(self) -> f64 {
        self.0
    }

    /// Natural log of `self / other`. Both sides are positive by construction.
    pub fn log_ratio(self, other: Price) -> f64 {
        (self.0 / other.0).ln()
    }

    pub fn min(self, other: Price) -> Price {
        if other.0 < self.0 { other } else { self }
    }

    pub fn max(self, other: Price) -> Price {
        if other.0 > self.0 { other } else { self }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl TryFrom<f64> for Price {
    type Error = EngineError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Price::new(value)
    }
}
