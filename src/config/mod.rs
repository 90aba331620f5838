//! Run configuration.
//!
//! Loaded from a JSON document, then overlaid with environment variables
//! (a `.env` file is honoured by the binaries through `dotenvy`). Per-symbol
//! policies are resolved here once so the engine never consults raw settings.

use chrono::Weekday;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::indicators::momentum::rsi::DEFAULT_PERIOD;
use crate::models::policy::{
    SymbolPolicy, DEFAULT_DAILY_BUY, DEFAULT_DAILY_SELL, DEFAULT_STRATEGY_LABEL,
    DEFAULT_WEEKLY_BUY, DEFAULT_WEEKLY_SELL,
};
use crate::services::yahoo;

pub const DEFAULT_CONFIG_PATH: &str = "config.json";
pub const DEFAULT_HISTORY_FILE: &str = "signals_history.csv";
pub const MAX_RSI_PERIOD: usize = 1000;

pub const ENV_ENVIRONMENT: &str = "RSIWATCH_ENV";
pub const ENV_ACCESS_TOKEN: &str = "LINE_CHANNEL_ACCESS_TOKEN";
pub const ENV_HISTORY_FILE: &str = "RSIWATCH_HISTORY_FILE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("LINE access token is missing (set notification.line.access_token or LINE_CHANNEL_ACCESS_TOKEN)")]
    MissingToken,
}

/// Deployment environment name, `sandbox` unless `RSIWATCH_ENV` says otherwise.
pub fn get_environment() -> String {
    env::var(ENV_ENVIRONMENT).unwrap_or_else(|_| "sandbox".to_string())
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub symbols: Vec<String>,
    #[serde(default = "default_period")]
    pub rsi_period: usize,
    #[serde(default)]
    pub defaults: ThresholdDefaults,
    #[serde(default)]
    pub symbol_specific_settings: HashMap<String, SymbolOverrides>,
    #[serde(default)]
    pub notification: NotificationSettings,
    #[serde(default = "default_history_file")]
    pub history_file: PathBuf,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    #[serde(default)]
    pub metrics_textfile: Option<PathBuf>,
    #[serde(default)]
    pub market_data: MarketDataSettings,
    #[serde(default)]
    pub weekly_report: WeeklyReportSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThresholdDefaults {
    pub daily_buy_threshold: f64,
    pub daily_sell_threshold: f64,
    pub weekly_buy_threshold: f64,
    pub weekly_sell_threshold: f64,
}

impl Default for ThresholdDefaults {
    fn default() -> Self {
        Self {
            daily_buy_threshold: DEFAULT_DAILY_BUY,
            daily_sell_threshold: DEFAULT_DAILY_SELL,
            weekly_buy_threshold: DEFAULT_WEEKLY_BUY,
            weekly_sell_threshold: DEFAULT_WEEKLY_SELL,
        }
    }
}

/// Per-symbol settings; every field falls back to [`ThresholdDefaults`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SymbolOverrides {
    pub daily_buy_threshold: Option<f64>,
    pub daily_sell_threshold: Option<f64>,
    pub weekly_buy_threshold: Option<f64>,
    pub weekly_sell_threshold: Option<f64>,
    #[serde(alias = "use_weekly_filter")]
    pub use_secondary_filter: Option<bool>,
    #[serde(alias = "strategy_name")]
    pub strategy_label: Option<String>,
    pub performance_note: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub line: LineSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LineSettings {
    pub access_token: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarketDataSettings {
    pub base_url: String,
    pub daily_lookback: String,
    pub weekly_lookback: String,
}

impl Default for MarketDataSettings {
    fn default() -> Self {
        Self {
            base_url: yahoo::DEFAULT_BASE_URL.to_string(),
            daily_lookback: "2mo".to_string(),
            weekly_lookback: "6mo".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WeeklyReportSettings {
    pub enabled: bool,
    pub weekday: String,
}

impl Default for WeeklyReportSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            weekday: "Fri".to_string(),
        }
    }
}

fn default_period() -> usize {
    DEFAULT_PERIOD
}

fn default_history_file() -> PathBuf {
    PathBuf::from(DEFAULT_HISTORY_FILE)
}

impl Config {
    /// Read, parse and apply environment overrides. Does not validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_json_str(&raw)?;
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Some(token) = env::var(ENV_ACCESS_TOKEN).ok().filter(|t| !t.trim().is_empty()) {
            self.notification.line.access_token = Some(token);
        }
        if let Some(history) = env::var(ENV_HISTORY_FILE).ok().filter(|p| !p.trim().is_empty()) {
            self.history_file = PathBuf::from(history);
        }
    }

    /// The configured access token, if it is non-blank.
    pub fn access_token(&self) -> Option<&str> {
        self.notification
            .line
            .access_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    pub fn report_weekday(&self) -> Result<Weekday, ConfigError> {
        self.weekly_report.weekday.trim().parse::<Weekday>().map_err(|_| {
            ConfigError::Invalid(format!(
                "weekly_report.weekday '{}' is not a weekday",
                self.weekly_report.weekday
            ))
        })
    }

    /// Resolve the policy of every configured symbol.
    pub fn policies(&self) -> HashMap<String, SymbolPolicy> {
        self.symbols
            .iter()
            .map(|symbol| (symbol.clone(), self.policy_for(symbol)))
            .collect()
    }

    pub fn policy_for(&self, symbol: &str) -> SymbolPolicy {
        let d = &self.defaults;
        let Some(o) = self.symbol_specific_settings.get(symbol) else {
            return SymbolPolicy::default()
                .with_daily_thresholds(d.daily_buy_threshold, d.daily_sell_threshold)
                .with_weekly_thresholds(d.weekly_buy_threshold, d.weekly_sell_threshold);
        };

        SymbolPolicy {
            daily_buy_threshold: o.daily_buy_threshold.unwrap_or(d.daily_buy_threshold),
            daily_sell_threshold: o.daily_sell_threshold.unwrap_or(d.daily_sell_threshold),
            weekly_buy_threshold: o.weekly_buy_threshold.unwrap_or(d.weekly_buy_threshold),
            weekly_sell_threshold: o.weekly_sell_threshold.unwrap_or(d.weekly_sell_threshold),
            use_secondary_filter: o.use_secondary_filter.unwrap_or(false),
            strategy_label: o
                .strategy_label
                .clone()
                .unwrap_or_else(|| DEFAULT_STRATEGY_LABEL.to_string()),
            performance_note: o.performance_note.clone(),
        }
    }

    /// Check everything a run depends on. The token is only required when
    /// alerts are actually delivered.
    pub fn validate(&self, require_token: bool) -> Result<(), ConfigError> {
        if self.symbols.is_empty() {
            return Err(ConfigError::Invalid("symbols must not be empty".to_string()));
        }
        if let Some(blank) = self.symbols.iter().find(|s| s.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!("blank symbol entry '{}'", blank)));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self.symbols.iter().map(|s| s.trim()).find(|s| !seen.insert(*s)) {
            return Err(ConfigError::Invalid(format!("symbol '{}' is listed twice", dup)));
        }
        if self.rsi_period == 0 || self.rsi_period > MAX_RSI_PERIOD {
            return Err(ConfigError::Invalid(format!(
                "rsi_period must be between 1 and {}, got {}",
                MAX_RSI_PERIOD, self.rsi_period
            )));
        }

        for (symbol, policy) in self.policies() {
            validate_policy(&symbol, &policy)?;
        }

        if self.weekly_report.enabled {
            self.report_weekday()?;
        }
        if require_token && self.access_token().is_none() {
            return Err(ConfigError::MissingToken);
        }
        Ok(())
    }
}

fn validate_policy(symbol: &str, policy: &SymbolPolicy) -> Result<(), ConfigError> {
    let thresholds = [
        ("daily_buy_threshold", policy.daily_buy_threshold),
        ("daily_sell_threshold", policy.daily_sell_threshold),
        ("weekly_buy_threshold", policy.weekly_buy_threshold),
        ("weekly_sell_threshold", policy.weekly_sell_threshold),
    ];
    for (name, value) in thresholds {
        if !(0.0..=100.0).contains(&value) {
            return Err(ConfigError::Invalid(format!(
                "{}: {} = {} is outside [0, 100]",
                symbol, name, value
            )));
        }
    }
    if policy.daily_buy_threshold >= policy.daily_sell_threshold {
        return Err(ConfigError::Invalid(format!(
            "{}: daily_buy_threshold ({}) must be below daily_sell_threshold ({})",
            symbol, policy.daily_buy_threshold, policy.daily_sell_threshold
        )));
    }
    Ok(())
}

/// Where to report a fatal bootstrap error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorContact {
    pub access_token: String,
    pub base_url: Option<String>,
}

/// Best-effort lookup used when the configuration itself may not load. The
/// environment token wins over the file's; the base URL only comes from the file.
pub fn operator_contact(path: impl AsRef<Path>) -> Option<OperatorContact> {
    let raw: Option<serde_json::Value> = fs::read_to_string(path)
        .ok()
        .and_then(|raw| serde_json::from_str(&raw).ok());
    let from_file = |pointer: &str| {
        raw.as_ref()?
            .pointer(pointer)?
            .as_str()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let access_token = env::var(ENV_ACCESS_TOKEN)
        .ok()
        .filter(|t| !t.trim().is_empty())
        .or_else(|| from_file("/notification/line/access_token"))?;
    Some(OperatorContact {
        access_token,
        base_url: from_file("/notification/line/base_url"),
    })
}
