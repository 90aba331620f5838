//! Unit tests for configuration loading and policy resolution

use chrono::Weekday;
use rsiwatch::config::{Config, ConfigError};
use std::path::PathBuf;

const SAMPLE: &str = r#"{
    "symbols": ["TECL", "SOXL"],
    "rsi_period": 14,
    "defaults": {
        "daily_buy_threshold": 30,
        "daily_sell_threshold": 70,
        "weekly_buy_threshold": 50,
        "weekly_sell_threshold": 50
    },
    "symbol_specific_settings": {
        "TECL": {
            "daily_buy_threshold": 33,
            "daily_sell_threshold": 67,
            "weekly_buy_threshold": 45,
            "use_weekly_filter": true,
            "strategy_name": "Enhanced RSI",
            "performance_note": "Win rate 100%"
        }
    },
    "notification": { "line": { "access_token": "secret" } },
    "history_file": "data/history.csv",
    "weekly_report": { "enabled": true, "weekday": "Fri" }
}"#;

fn sample() -> Config {
    Config::from_json_str(SAMPLE).unwrap()
}

#[test]
fn test_parses_full_document() {
    let config = sample();
    assert_eq!(config.symbols, vec!["TECL", "SOXL"]);
    assert_eq!(config.rsi_period, 14);
    assert_eq!(config.history_file, PathBuf::from("data/history.csv"));
    assert_eq!(config.access_token(), Some("secret"));
    assert_eq!(config.report_weekday().unwrap(), Weekday::Fri);
    assert!(config.validate(true).is_ok());
}

#[test]
fn test_minimal_document_uses_defaults() {
    let config = Config::from_json_str(r#"{ "symbols": ["SPY"] }"#).unwrap();
    assert_eq!(config.rsi_period, 14);
    assert_eq!(config.history_file, PathBuf::from("signals_history.csv"));
    assert_eq!(config.market_data.daily_lookback, "2mo");
    assert_eq!(config.market_data.weekly_lookback, "6mo");
    assert!(config.weekly_report.enabled);
    assert!(config.log_file.is_none());

    let policy = config.policy_for("SPY");
    assert_eq!(policy.daily_buy_threshold, 33.0);
    assert_eq!(policy.daily_sell_threshold, 67.0);
    assert_eq!(policy.strategy_label, "Standard");
    assert!(!policy.use_secondary_filter);
}

#[test]
fn test_symbol_overrides_fall_back_field_by_field() {
    let policies = sample().policies();
    let tecl = &policies["TECL"];
    assert_eq!(tecl.daily_buy_threshold, 33.0);
    assert_eq!(tecl.weekly_buy_threshold, 45.0);
    // Not overridden, taken from defaults.
    assert_eq!(tecl.weekly_sell_threshold, 50.0);
    assert!(tecl.use_secondary_filter);
    assert_eq!(tecl.strategy_label, "Enhanced RSI");
    assert_eq!(tecl.performance_note.as_deref(), Some("Win rate 100%"));

    let soxl = &policies["SOXL"];
    assert_eq!(soxl.daily_buy_threshold, 30.0);
    assert_eq!(soxl.daily_sell_threshold, 70.0);
    assert!(!soxl.use_secondary_filter);
}

#[test]
fn test_canonical_field_names_accepted() {
    let config = Config::from_json_str(
        r#"{ "symbols": ["QQQ"],
             "symbol_specific_settings": { "QQQ": { "use_secondary_filter": true, "strategy_label": "Filtered" } } }"#,
    )
    .unwrap();
    let policy = config.policy_for("QQQ");
    assert!(policy.use_secondary_filter);
    assert_eq!(policy.strategy_label, "Filtered");
}

#[test]
fn test_rejects_empty_symbols() {
    let config = Config::from_json_str(r#"{ "symbols": [] }"#).unwrap();
    assert!(matches!(config.validate(false), Err(ConfigError::Invalid(_))));
}

#[test]
fn test_rejects_zero_period() {
    let config = Config::from_json_str(r#"{ "symbols": ["SPY"], "rsi_period": 0 }"#).unwrap();
    assert!(matches!(config.validate(false), Err(ConfigError::Invalid(_))));
}

#[test]
fn test_rejects_oversized_period() {
    let config = Config::from_json_str(r#"{ "symbols": ["SPY"], "rsi_period": 1001 }"#).unwrap();
    let err = config.validate(false).unwrap_err();
    assert!(err.to_string().contains("rsi_period"));

    let config = Config::from_json_str(r#"{ "symbols": ["SPY"], "rsi_period": 1000 }"#).unwrap();
    assert!(config.validate(false).is_ok());
}

#[test]
fn test_rejects_duplicate_symbols() {
    let config = Config::from_json_str(r#"{ "symbols": ["TECL", "SOXL", " TECL"] }"#).unwrap();
    let err = config.validate(false).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
    assert!(err.to_string().contains("TECL"));
}

#[test]
fn test_rejects_inverted_thresholds() {
    let config = Config::from_json_str(
        r#"{ "symbols": ["SPY"], "symbol_specific_settings": { "SPY": { "daily_buy_threshold": 70 } } }"#,
    )
    .unwrap();
    let err = config.validate(false).unwrap_err();
    assert!(err.to_string().contains("SPY"));
}

#[test]
fn test_rejects_threshold_out_of_range() {
    let config = Config::from_json_str(
        r#"{ "symbols": ["SPY"], "defaults": { "weekly_sell_threshold": 120 } }"#,
    )
    .unwrap();
    assert!(matches!(config.validate(false), Err(ConfigError::Invalid(_))));
}

#[test]
fn test_rejects_unknown_weekday_only_when_enabled() {
    let mut config = Config::from_json_str(
        r#"{ "symbols": ["SPY"], "weekly_report": { "enabled": true, "weekday": "Someday" } }"#,
    )
    .unwrap();
    assert!(config.validate(false).is_err());

    config.weekly_report.enabled = false;
    assert!(config.validate(false).is_ok());
}

#[test]
fn test_token_required_unless_dry_run() {
    let config = Config::from_json_str(
        r#"{ "symbols": ["SPY"], "notification": { "line": { "access_token": "  " } } }"#,
    )
    .unwrap();
    assert!(matches!(config.validate(true), Err(ConfigError::MissingToken)));
    assert!(config.validate(false).is_ok());
}

#[test]
fn test_malformed_json_is_config_error() {
    assert!(matches!(
        Config::from_json_str("{ not json"),
        Err(ConfigError::Json(_))
    ));
}

#[test]
fn test_missing_file_is_io_error() {
    let missing = std::env::temp_dir().join("rsiwatch-definitely-missing-config.json");
    assert!(matches!(Config::load(&missing), Err(ConfigError::Io { .. })));
}
