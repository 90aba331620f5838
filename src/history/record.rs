//! One row of the history log.

use chrono::NaiveDate;
use csv::StringRecord;
use serde::{Deserialize, Serialize};

use crate::history::HistoryError;
use crate::models::indicators::OscillatorReading;
use crate::models::signal::{SignalEvent, SignalType};

pub const HEADER: [&str; 9] = [
    "date",
    "symbol",
    "price",
    "daily_rsi",
    "weekly_rsi",
    "signal_type",
    "strategy",
    "reason",
    "prev_daily_rsi",
];

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const WEEKLY_ABSENT: &str = "None";
pub const PREV_ABSENT: &str = "N/A";
pub const NO_SIGNAL_STRATEGY: &str = "N/A";
pub const NO_SIGNAL_REASON: &str = "No signal";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub date: NaiveDate,
    pub symbol: String,
    pub price: f64,
    pub daily_value: f64,
    pub weekly_value: Option<f64>,
    pub signal_type: SignalType,
    pub strategy_label: String,
    pub reason: String,
    pub prev_daily_value: Option<f64>,
}

impl HistoryRecord {
    /// Record for a processed symbol where no signal fired.
    ///
    /// Values are rounded to the log's precision here so that a record read
    /// back from disk compares equal to the one appended.
    pub fn observation(reading: &OscillatorReading, price: f64, prev_daily: Option<f64>) -> Self {
        Self {
            date: reading.date,
            symbol: reading.symbol.clone(),
            price: round_to(price, 2),
            daily_value: round_to(reading.daily_value, 1),
            weekly_value: reading.weekly_value.map(|w| round_to(w, 1)),
            signal_type: SignalType::None,
            strategy_label: NO_SIGNAL_STRATEGY.to_string(),
            reason: NO_SIGNAL_REASON.to_string(),
            prev_daily_value: prev_daily.map(|p| round_to(p, 1)),
        }
    }

    pub fn with_signal(mut self, event: &SignalEvent) -> Self {
        self.signal_type = event.signal_type;
        self.strategy_label = event.strategy_label.clone();
        self.reason = event.reason.clone();
        self
    }

    /// The oscillator values this record carries, as a prior reading.
    pub fn as_reading(&self) -> OscillatorReading {
        OscillatorReading::new(self.symbol.clone(), self.date, self.daily_value)
            .with_weekly_opt(self.weekly_value)
    }

    pub fn to_row(&self) -> [String; 9] {
        [
            self.date.format(DATE_FORMAT).to_string(),
            self.symbol.clone(),
            format!("{:.2}", self.price),
            format!("{:.1}", self.daily_value),
            self.weekly_value
                .map(|w| format!("{:.1}", w))
                .unwrap_or_else(|| WEEKLY_ABSENT.to_string()),
            self.signal_type.to_string(),
            self.strategy_label.clone(),
            self.reason.clone(),
            self.prev_daily_value
                .map(|p| format!("{:.1}", p))
                .unwrap_or_else(|| PREV_ABSENT.to_string()),
        ]
    }

    pub fn from_row(row: &StringRecord) -> Result<Self, HistoryError> {
        if row.len() != HEADER.len() {
            return Err(parse_error(
                row,
                format!("expected {} fields, got {}", HEADER.len(), row.len()),
            ));
        }

        let date = NaiveDate::parse_from_str(field(row, 0), DATE_FORMAT)
            .map_err(|e| parse_error(row, format!("invalid date '{}': {}", field(row, 0), e)))?;
        let symbol = field(row, 1);
        if symbol.is_empty() {
            return Err(parse_error(row, "empty symbol".to_string()));
        }

        Ok(Self {
            date,
            symbol: symbol.to_string(),
            price: parse_number(row, "price", field(row, 2))?,
            daily_value: parse_number(row, "daily_rsi", field(row, 3))?,
            weekly_value: parse_optional(row, "weekly_rsi", field(row, 4))?,
            signal_type: field(row, 5)
                .parse()
                .map_err(|e: String| parse_error(row, e))?,
            strategy_label: field(row, 6).to_string(),
            reason: field(row, 7).to_string(),
            prev_daily_value: parse_optional(row, "prev_daily_rsi", field(row, 8))?,
        })
    }
}

fn field(row: &StringRecord, idx: usize) -> &str {
    row.get(idx).unwrap_or("").trim()
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn is_absent(value: &str) -> bool {
    matches!(value, "" | WEEKLY_ABSENT | PREV_ABSENT)
}

fn parse_number(row: &StringRecord, column: &str, value: &str) -> Result<f64, HistoryError> {
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(parse_error(row, format!("invalid {} '{}'", column, value))),
    }
}

fn parse_optional(row: &StringRecord, column: &str, value: &str) -> Result<Option<f64>, HistoryError> {
    if is_absent(value) {
        return Ok(None);
    }
    parse_number(row, column, value).map(Some)
}

fn parse_error(row: &StringRecord, message: String) -> HistoryError {
    HistoryError::Parse {
        line: row.position().map(|p| p.line()).unwrap_or(0),
        message,
    }
}
