//! Run context for dependency injection

use chrono::Weekday;
use std::collections::HashMap;
use std::sync::Arc;

use crate::history::HistoryStore;
use crate::indicators::momentum::rsi::DEFAULT_PERIOD;
use crate::metrics::Metrics;
use crate::models::policy::SymbolPolicy;
use crate::notifications::Notifier;
use crate::services::market_data::MarketDataProvider;

/// Tunables that are not per-symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub rsi_period: usize,
    pub daily_lookback: String,
    pub weekly_lookback: String,
    /// Weekday the digest goes out on; `None` disables it.
    pub digest_weekday: Option<Weekday>,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            rsi_period: DEFAULT_PERIOD,
            daily_lookback: "2mo".to_string(),
            weekly_lookback: "6mo".to_string(),
            digest_weekday: Some(Weekday::Fri),
        }
    }
}

/// Everything one run needs, built once and owned by the run.
///
/// Collaborators are trait objects so tests can substitute fakes for the
/// market-data and notification services.
pub struct RunContext {
    pub symbols: Vec<String>,
    pub policies: HashMap<String, SymbolPolicy>,
    pub history: Box<dyn HistoryStore>,
    pub data_provider: Arc<dyn MarketDataProvider>,
    pub notifier: Arc<dyn Notifier>,
    pub metrics: Arc<Metrics>,
    pub settings: RunSettings,
}

impl RunContext {
    pub fn new(
        symbols: Vec<String>,
        policies: HashMap<String, SymbolPolicy>,
        history: Box<dyn HistoryStore>,
        data_provider: Arc<dyn MarketDataProvider>,
        notifier: Arc<dyn Notifier>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            symbols,
            policies,
            history,
            data_provider,
            notifier,
            metrics,
            settings: RunSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: RunSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Policy for `symbol`, falling back to the defaults for unknown symbols.
    pub fn policy(&self, symbol: &str) -> SymbolPolicy {
        self.policies.get(symbol).cloned().unwrap_or_default()
    }
}
