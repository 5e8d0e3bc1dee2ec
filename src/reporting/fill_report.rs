use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::shield::policy::Policy;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FillReportRow {
    pub half_life_secs: f64,
    pub bid_fills: u64,
    pub ask_fills: u64,
    /// `None` while the ask side has no fills.
    pub fill_ratio: Option<f64>,
    pub bid_shield: f64,
    pub ask_shield: f64,
}

/// Fill counters of every policy, in grid order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FillReport {
    pub generated_at: DateTime<Utc>,
    pub symbol: String,
    pub rows: Vec<FillReportRow>,
}

impl FillReport {
    pub fn collect(symbol: &str, policies: &[Arc<Policy>], generated_at: DateTime<Utc>) -> Self {
        let rows = policies
            .iter()
            .map(|policy| {
                let snapshot = policy.snapshot();
                FillReportRow {
                    half_life_secs: snapshot.half_life_secs,
                    bid_fills: snapshot.bid_fills,
                    ask_fills: snapshot.ask_fills,
                    fill_ratio: snapshot.fill_ratio(),
                    bid_shield: snapshot.shield.bid.value,
                    ask_shield: snapshot.shield.ask.value,
                }
            })
            .collect();

        Self {
            generated_at,
            symbol: symbol.to_string(),
            rows,
        }
    }
}

impl fmt::Display for FillReportRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[\"{}s\"{{{}|{}}}",
            self.half_life_secs, self.bid_fills, self.ask_fills
        )?;
        match self.fill_ratio {
            Some(ratio) => write!(f, "{ratio:.2}]"),
            None => write!(f, "undefined]"),
        }
    }
}

impl fmt::Display for FillReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)?;
        for row in &self.rows {
            write!(f, " {row}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::side::Side;

    fn policies() -> Vec<Arc<Policy>> {
        vec![
            Arc::new(Policy::new(10.0)),
            Arc::new(Policy::new(0.5)),
            Arc::new(Policy::new(2.0)),
        ]
    }

    #[test]
    fn rows_follow_grid_order() {
        let policies = policies();
        policies[1].record_fill(Side::Bid);
        policies[1].record_fill(Side::Ask);
        policies[1].record_fill(Side::Ask);

        let report = FillReport::collect("BTCUSDT", &policies, Utc::now());
        let half_lives: Vec<f64> = report.rows.iter().map(|row| row.half_life_secs).collect();
        assert_eq!(half_lives, vec![10.0, 0.5, 2.0]);
        assert_eq!(report.rows[1].bid_fills, 1);
        assert_eq!(report.rows[1].ask_fills, 2);
        assert_eq!(report.rows[1].fill_ratio, Some(0.5));
    }

    #[test]
    fn zero_ask_fills_render_as_undefined() {
        let policies = policies();
        policies[0].record_fill(Side::Bid);
        policies[2].record_fill(Side::Bid);
        policies[2].record_fill(Side::Bid);
        policies[2].record_fill(Side::Bid);
        policies[2].record_fill(Side::Ask);
        policies[2].record_fill(Side::Ask);

        let line = FillReport::collect("BTCUSDT", &policies, Utc::now()).to_string();
        assert_eq!(
            line,
            "BTCUSDT [\"10s\"{1|0}undefined] [\"0.5s\"{0|0}undefined] [\"2s\"{3|2}1.50]"
        );
    }

    #[test]
    fn serializes_missing_ratio_as_null() {
        let report = FillReport::collect("ETHUSDT", &policies(), Utc::now());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["symbol"], "ETHUSDT");
        assert!(json["rows"][0]["fill_ratio"].is_null());
        assert_eq!(json["rows"].as_array().map(Vec::len), Some(3));
    }
}
