use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Signal classification as written to the history log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalType {
    Buy,
    Sell,
    None,
}

impl SignalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalType::Buy => "BUY",
            SignalType::Sell => "SELL",
            SignalType::None => "NONE",
        }
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "BUY" => Ok(SignalType::Buy),
            "SELL" => Ok(SignalType::Sell),
            "NONE" => Ok(SignalType::None),
            other => Err(format!("unknown signal type '{}'", other)),
        }
    }
}

/// A crossing that survived every configured filter.
///
/// Lives for one processing step only: it is rendered into the alert message
/// and its fields are copied into the history record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    pub symbol: String,
    pub signal_type: SignalType,
    pub current_daily: f64,
    pub current_weekly: Option<f64>,
    pub prev_daily: f64,
    pub price: f64,
    pub strategy_label: String,
    pub reason: String,
    pub used_secondary_filter: bool,
}
