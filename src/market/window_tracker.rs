use std::collections::VecDeque;
use std::time::Duration;

use crate::errors::EngineError;
use crate::types::book_snapshot::BookSnapshot;
use crate::types::price::Price;

/// Derived state of a non-empty rolling window.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WindowView {
    pub oldest: BookSnapshot,
    pub latest: BookSnapshot,
    pub low_bid: Price,
    pub high_ask: Price,
}

/// Bounded-duration history of top-of-book snapshots.
///
/// Every retained snapshot is strictly younger than `window` relative to the
/// newest one, so the newest snapshot itself is always retained.
#[derive(Debug, Clone)]
pub struct WindowTracker {
    window_ns: u64,
    history: VecDeque<BookSnapshot>,
    low_bid: Option<Price>,
    high_ask: Option<Price>,
}

impl WindowTracker {
    pub fn new(window: Duration) -> Result<Self, EngineError> {
        let window_ns = u64::try_from(window.as_nanos()).unwrap_or(u64::MAX);
        if window_ns == 0 {
            return Err(EngineError::InvalidConfiguration {
                reason: "rolling window must be longer than zero".to_string(),
            });
        }

        Ok(Self {
            window_ns,
            history: VecDeque::new(),
            low_bid: None,
            high_ask: None,
        })
    }

    /// Appends `snapshot`, evicts the expired prefix and recomputes extremes.
    ///
    /// Callers must feed snapshots in non-decreasing timestamp order.
    pub fn on_snapshot(&mut self, snapshot: BookSnapshot) -> Result<WindowView, EngineError> {
        self.history.push_back(snapshot);

        let newest_ns = snapshot.local_ts_ns;
        while let Some(front) = self.history.front() {
            if newest_ns.saturating_sub(front.local_ts_ns) >= self.window_ns {
                self.history.pop_front();
            } else {
                break;
            }
        }

        self.recompute_extremes();
        self.view()
    }

    fn recompute_extremes(&mut self) {
        let mut snapshots = self.history.iter();
        let Some(first) = snapshots.next() else {
            self.low_bid = None;
            self.high_ask = None;
            return;
        };

        let (low_bid, high_ask) = snapshots.fold(
            (first.bid_price(), first.ask_price()),
            |(low, high), snapshot| (low.min(snapshot.bid_price()), high.max(snapshot.ask_price())),
        );

        self.low_bid = Some(low_bid);
        self.high_ask = Some(high_ask);
    }

    pub fn view(&self) -> Result<WindowView, EngineError> {
        match (
            self.history.front(),
            self.history.back(),
            self.low_bid,
            self.high_ask,
        ) {
            (Some(oldest), Some(latest), Some(low_bid), Some(high_ask)) => Ok(WindowView {
                oldest: *oldest,
                latest: *latest,
                low_bid,
                high_ask,
            }),
            _ => Err(EngineError::EmptyWindow),
        }
    }

    pub fn latest(&self) -> Option<&BookSnapshot> {
        self.history.back()
    }

    pub fn oldest_retained(&self) -> Option<&BookSnapshot> {
        self.history.front()
    }

    pub fn low_bid(&self) -> Option<Price> {
        self.low_bid
    }

    pub fn high_ask(&self) -> Option<Price> {
        self.high_ask
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BookSnapshot> {
        self.history.iter()
    }
}
