use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One closing price as returned by the market-data collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, close: f64) -> Self {
        Self { timestamp, close }
    }
}

/// Extract the close column of a series, preserving order.
pub fn closes(points: &[PricePoint]) -> Vec<f64> {
    points.iter().map(|p| p.close).collect()
}

/// Daily RSI plus the optional weekly confirmation value for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OscillatorReading {
    pub symbol: String,
    pub date: NaiveDate,
    pub daily_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekly_value: Option<f64>,
}

impl OscillatorReading {
    pub fn new(symbol: impl Into<String>, date: NaiveDate, daily_value: f64) -> Self {
        Self {
            symbol: symbol.into(),
            date,
            daily_value,
            weekly_value: None,
        }
    }

    pub fn with_weekly(mut self, weekly_value: f64) -> Self {
        self.weekly_value = Some(weekly_value);
        self
    }

    pub fn with_weekly_opt(mut self, weekly_value: Option<f64>) -> Self {
        self.weekly_value = weekly_value;
        self
    }
}

/// Everything the digest needs about a symbol processed in the current run.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolSnapshot {
    pub reading: OscillatorReading,
    pub price: f64,
}
