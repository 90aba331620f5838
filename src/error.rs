//! Engine-level error taxonomy.
//!
//! Every layer owns its own error enum; `EngineError` is what the orchestrator
//! sees at its boundary. Only `Config` and `Bootstrap` are fatal
//! to a run.

use thiserror::Error;

use crate::config::ConfigError;
use crate::history::HistoryError;
use crate::indicators::IndicatorError;
use crate::notifications::NotificationError;
use crate::services::market_data::MarketDataError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("data unavailable for {symbol}: {source}")]
    DataUnavailable {
        symbol: String,
        #[source]
        source: MarketDataError,
    },

    #[error("insufficient data for {symbol}: {source}")]
    InsufficientData {
        symbol: String,
        #[source]
        source: IndicatorError,
    },

    #[error("history read failure: {0}")]
    HistoryRead(#[source] HistoryError),

    #[error("history write failure: {0}")]
    HistoryWrite(#[source] HistoryError),

    #[error("delivery failure: {0}")]
    Delivery(#[from] NotificationError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("bootstrap failed: {0}")]
    Bootstrap(String),
}

impl EngineError {
    /// Fatal errors abort the run before any symbol is processed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::Config(_) | EngineError::Bootstrap(_))
    }
}
