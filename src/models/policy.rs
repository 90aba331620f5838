//! Per-symbol detection policy.

use serde::{Deserialize, Serialize};

pub const DEFAULT_DAILY_BUY: f64 = 33.0;
pub const DEFAULT_DAILY_SELL: f64 = 67.0;
pub const DEFAULT_WEEKLY_BUY: f64 = 50.0;
pub const DEFAULT_WEEKLY_SELL: f64 = 50.0;
pub const DEFAULT_STRATEGY_LABEL: &str = "Standard";

/// Thresholds and filter settings for one symbol, fully resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolPolicy {
    pub daily_buy_threshold: f64,
    pub daily_sell_threshold: f64,
    pub weekly_buy_threshold: f64,
    pub weekly_sell_threshold: f64,
    pub use_secondary_filter: bool,
    pub strategy_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_note: Option<String>,
}

impl Default for SymbolPolicy {
    fn default() -> Self {
        Self {
            daily_buy_threshold: DEFAULT_DAILY_BUY,
            daily_sell_threshold: DEFAULT_DAILY_SELL,
            weekly_buy_threshold: DEFAULT_WEEKLY_BUY,
            weekly_sell_threshold: DEFAULT_WEEKLY_SELL,
            use_secondary_filter: false,
            strategy_label: DEFAULT_STRATEGY_LABEL.to_string(),
            performance_note: None,
        }
    }
}

impl SymbolPolicy {
    pub fn with_daily_thresholds(mut self, buy: f64, sell: f64) -> Self {
        self.daily_buy_threshold = buy;
        self.daily_sell_threshold = sell;
        self
    }

    pub fn with_weekly_thresholds(mut self, buy: f64, sell: f64) -> Self {
        self.weekly_buy_threshold = buy;
        self.weekly_sell_threshold = sell;
        self
    }

    pub fn with_secondary_filter(mut self, enabled: bool) -> Self {
        self.use_secondary_filter = enabled;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.strategy_label = label.into();
        self
    }
}
