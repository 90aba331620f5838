//! Full pipeline: configuration, bootstrap and a run against mocked HTTP services.

use rsiwatch::config::{Config, ENV_ACCESS_TOKEN};
use rsiwatch::core::runtime::fatal_message;
use rsiwatch::core::{bootstrap, notify_operator, RunOptions};
use rsiwatch::signals::SignalEngine;
use rsiwatch::EngineError;
use std::fs;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::test_utils::{date, falling_closes, mock_chart, mock_line_broadcast, neutral_closes, temp_path};

fn config_for(server: &MockServer, history: &std::path::Path) -> Config {
    let raw = serde_json::json!({
        "symbols": ["TECL"],
        "rsi_period": 14,
        "notification": { "line": { "access_token": "test-token", "base_url": server.uri() } },
        "history_file": history,
        "market_data": { "base_url": server.uri() },
        "weekly_report": { "enabled": false }
    });
    Config::from_json_str(&raw.to_string()).unwrap()
}

#[tokio::test]
async fn second_run_delivers_alert_over_http() {
    let server = MockServer::start().await;
    let history = temp_path("runtime-history.csv");
    let config = config_for(&server, &history);

    mock_chart(&server, "TECL", "1d", &neutral_closes()).await;
    let mut ctx = bootstrap(&config, &RunOptions::default()).expect("bootstrap");
    let first = SignalEngine::run(&mut ctx, date(2026, 10, 12)).await;
    assert_eq!(first.processed, 1);
    assert_eq!(first.emitted, 0);

    server.reset().await;
    mock_chart(&server, "TECL", "1d", &falling_closes()).await;
    mock_line_broadcast(&server, 200).await;

    let mut ctx = bootstrap(&config, &RunOptions::default()).expect("bootstrap");
    let second = SignalEngine::run(&mut ctx, date(2026, 10, 13)).await;
    assert_eq!(second.emitted, 1);
    assert_eq!(second.delivered, 1);

    let requests = server.received_requests().await.expect("recorded requests");
    assert!(requests
        .iter()
        .any(|r| r.url.path() == "/v2/bot/message/broadcast"
            && String::from_utf8_lossy(&r.body).contains("BUY")));
}

#[tokio::test]
async fn history_override_and_dry_run() {
    let server = MockServer::start().await;
    let configured = temp_path("configured.csv");
    let overridden = temp_path("override.csv");
    let mut config = config_for(&server, &configured);
    config.notification.line.access_token = None;

    mock_chart(&server, "TECL", "1d", &neutral_closes()).await;

    let options = RunOptions {
        history_override: Some(overridden.clone()),
        dry_run: true,
    };
    let mut ctx = bootstrap(&config, &options).expect("dry run needs no token");
    assert_eq!(ctx.notifier.name(), "log");
    SignalEngine::run(&mut ctx, date(2026, 10, 12)).await;

    assert!(overridden.exists());
    assert!(!configured.exists());
}

#[tokio::test]
async fn missing_token_is_fatal() {
    let server = MockServer::start().await;
    let mut config = config_for(&server, &temp_path("unused.csv"));
    config.notification.line.access_token = None;

    let err = match bootstrap(&config, &RunOptions::default()) {
        Ok(_) => panic!("bootstrap should fail without a token"),
        Err(e) => e,
    };
    assert!(err.is_fatal());
    assert!(matches!(err, EngineError::Config(_)));
}

#[tokio::test]
async fn fatal_config_error_reaches_operator() {
    let server = MockServer::start().await;
    let config_path = temp_path("fatal-config.json");
    fs::create_dir_all(config_path.parent().unwrap()).unwrap();
    let raw = serde_json::json!({
        "symbols": [],
        "notification": { "line": { "access_token": "file-token", "base_url": server.uri() } }
    });
    fs::write(&config_path, raw.to_string()).unwrap();

    let config = Config::from_json_str(&fs::read_to_string(&config_path).unwrap()).unwrap();
    let err = match bootstrap(&config, &RunOptions::default()) {
        Ok(_) => panic!("empty symbol list must not bootstrap"),
        Err(e) => e,
    };
    assert!(err.is_fatal());

    Mock::given(method("POST"))
        .and(path("/v2/bot/message/broadcast"))
        .and(header("Authorization", "Bearer file-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    std::env::remove_var(ENV_ACCESS_TOKEN);
    notify_operator(&config_path, &err).await;

    let requests = server.received_requests().await.expect("recorded requests");
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["messages"][0]["text"], fatal_message(&err));
    assert!(fatal_message(&err).contains("symbols must not be empty"));

    server.reset().await;
    Mock::given(method("POST"))
        .and(path("/v2/bot/message/broadcast"))
        .and(header("Authorization", "Bearer env-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    std::env::set_var(ENV_ACCESS_TOKEN, "env-token");
    notify_operator(&config_path, &err).await;
    std::env::remove_var(ENV_ACCESS_TOKEN);

    server.verify().await;
}
