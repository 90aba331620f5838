//! Wiring a validated configuration into a runnable context.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::{self, Config, ConfigError};
use crate::core::context::{RunContext, RunSettings};
use crate::error::EngineError;
use crate::history::CsvHistoryStore;
use crate::metrics::Metrics;
use crate::notifications::line::{self, LineNotifier};
use crate::notifications::{LogNotifier, Notifier};
use crate::services::yahoo::YahooChartClient;

/// Command-line adjustments applied on top of the configuration.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub history_override: Option<PathBuf>,
    pub dry_run: bool,
}

/// Validate `config` and build the context for one run.
pub fn bootstrap(config: &Config, options: &RunOptions) -> Result<RunContext, EngineError> {
    config.validate(!options.dry_run)?;

    let settings = RunSettings {
        rsi_period: config.rsi_period,
        daily_lookback: config.market_data.daily_lookback.clone(),
        weekly_lookback: config.market_data.weekly_lookback.clone(),
        digest_weekday: if config.weekly_report.enabled {
            Some(config.report_weekday()?)
        } else {
            None
        },
    };

    let history_path = options
        .history_override
        .clone()
        .unwrap_or_else(|| config.history_file.clone());
    let history = CsvHistoryStore::open(history_path);

    let data_provider = YahooChartClient::new(config.market_data.base_url.clone())
        .map_err(|e| EngineError::Bootstrap(format!("market data client: {}", e)))?;
    let notifier = build_notifier(config, options.dry_run)?;
    let metrics = Metrics::new().map_err(|e| EngineError::Bootstrap(format!("metrics registry: {}", e)))?;

    info!(
        symbols = config.symbols.len(),
        period = settings.rsi_period,
        notifier = notifier.name(),
        digest = ?settings.digest_weekday,
        "Run context ready"
    );

    Ok(RunContext::new(
        config.symbols.clone(),
        config.policies(),
        Box::new(history),
        Arc::new(data_provider),
        notifier,
        Arc::new(metrics),
    )
    .with_settings(settings))
}

pub fn build_notifier(config: &Config, dry_run: bool) -> Result<Arc<dyn Notifier>, EngineError> {
    if dry_run {
        return Ok(Arc::new(LogNotifier));
    }
    let token = config.access_token().ok_or(ConfigError::MissingToken)?;
    let base_url = config
        .notification
        .line
        .base_url
        .clone()
        .unwrap_or_else(|| line::DEFAULT_BASE_URL.to_string());
    let notifier = LineNotifier::with_base_url(base_url, token)
        .map_err(|e| EngineError::Bootstrap(format!("notifier: {}", e)))?;
    Ok(Arc::new(notifier))
}

pub fn fatal_message(err: &EngineError) -> String {
    format!(
        "⚠️ RSI alert system error\n\n{}\n\nPlease contact the administrator.",
        err
    )
}

/// Tell the operator that a run could not start. Best effort: every failure
/// here is logged and swallowed.
pub async fn notify_operator(config_path: &Path, err: &EngineError) {
    let Some(contact) = config::operator_contact(config_path) else {
        warn!("No access token available, operator not notified");
        return;
    };
    let base_url = contact
        .base_url
        .unwrap_or_else(|| line::DEFAULT_BASE_URL.to_string());
    let notifier = match LineNotifier::with_base_url(base_url, contact.access_token) {
        Ok(notifier) => notifier,
        Err(e) => {
            warn!(error = %e, "Operator notifier unavailable");
            return;
        }
    };
    if let Err(e) = notifier.deliver(&fatal_message(err)).await {
        error!(error = %e, "Failed to notify operator");
    }
}
