use crate::market::window_tracker::WindowView;
use crate::types::side::Side;

/// A hypothetical resting quote, priced off the touch and a policy's shield.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SimulatedQuote {
    pub side: Side,
    pub price: f64,
}

impl SimulatedQuote {
    /// Bid: `best_bid * (1 - shield - edge)`. Ask: `best_ask * (1 + shield + edge)`.
    pub fn price(side: Side, view: &WindowView, shield: f64, edge_buffer: f64) -> Self {
        let price = match side {
            Side::Bid => view.latest.bid_price().as_f64() * (1.0 - shield - edge_buffer),
            Side::Ask => view.latest.ask_price().as_f64() * (1.0 + shield + edge_buffer),
        };

        Self { side, price }
    }

    /// Whether the window's extreme on our side traded through the quote.
    pub fn would_fill(&self, view: &WindowView) -> bool {
        match self.side {
            Side::Bid => self.price > view.low_bid.as_f64(),
            Side::Ask => self.price < view.high_ask.as_f64(),
        }
    }
}
