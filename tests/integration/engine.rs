//! Engine runs against scripted collaborators.

use chrono::Weekday;
use rsiwatch::history::{CsvHistoryStore, HistoryRecord, HistoryStore};
use rsiwatch::models::{OscillatorReading, SignalType, SymbolPolicy};
use rsiwatch::services::market_data::Interval;
use rsiwatch::signals::SignalEngine;
use std::collections::HashMap;
use std::sync::Arc;

use crate::test_utils::{
    context, date, falling_closes, neutral_closes, rising_closes, FakeNotifier, FakeProvider,
    ReadOnlyHistory,
};

// 2026-10-12 is a Monday, 2026-10-16 a Friday.
const MONDAY: (i32, u32, u32) = (2026, 10, 12);

fn monday() -> chrono::NaiveDate {
    date(MONDAY.0, MONDAY.1, MONDAY.2)
}

#[tokio::test]
async fn cold_start_then_crossing_emits_buy() {
    let history_path = crate::test_utils::temp_path("engine-two-runs.csv");
    let provider = Arc::new(FakeProvider::new());
    let notifier = Arc::new(FakeNotifier::new());

    provider.set("SOXL", Interval::Daily, &neutral_closes());
    let mut ctx = context(
        &["SOXL"],
        HashMap::new(),
        Box::new(CsvHistoryStore::open(&history_path)),
        provider.clone(),
        notifier.clone(),
    );
    let first = SignalEngine::run(&mut ctx, monday()).await;
    assert_eq!(first.processed, 1);
    assert_eq!(first.emitted, 0);
    assert!(notifier.sent().is_empty());

    // Next day: the daily series collapses through the buy threshold.
    provider.set("SOXL", Interval::Daily, &falling_closes());
    let mut ctx = context(
        &["SOXL"],
        HashMap::new(),
        Box::new(CsvHistoryStore::open(&history_path)),
        provider.clone(),
        notifier.clone(),
    );
    let second = SignalEngine::run(&mut ctx, monday().succ_opt().unwrap()).await;
    assert_eq!(second.emitted, 1);
    assert_eq!(second.delivered, 1);

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("BUY"));
    assert!(sent[0].contains("SOXL"));

    let contents = std::fs::read_to_string(&history_path).unwrap();
    let rows: Vec<&str> = contents.lines().skip(1).collect();
    assert_eq!(rows.len(), 2);
    assert!(rows[0].starts_with("2026-10-12,SOXL,100.00,50.0,None,NONE,N/A,No signal,N/A"));
    assert!(rows[1].starts_with("2026-10-13,SOXL,86.00,0.0,None,BUY,Standard,primary-only"));
    assert!(rows[1].ends_with(",50.0"));

    let store = CsvHistoryStore::open(&history_path);
    let latest = store.latest("SOXL").unwrap();
    assert_eq!(latest.signal_type, SignalType::Buy);
    assert_eq!(latest.prev_daily_value, Some(50.0));
}

#[tokio::test]
async fn staying_below_threshold_does_not_repeat_alert() {
    let provider = Arc::new(FakeProvider::new());
    let notifier = Arc::new(FakeNotifier::new());
    provider.set("SOXL", Interval::Daily, &falling_closes());

    let prior = HistoryRecord::observation(&OscillatorReading::new("SOXL", monday(), 20.0), 90.0, None);
    let history = rsiwatch::history::MemoryHistoryStore::with_records(vec![prior]);

    let mut ctx = context(&["SOXL"], HashMap::new(), Box::new(history), provider, notifier.clone());
    let summary = SignalEngine::run(&mut ctx, monday().succ_opt().unwrap()).await;

    assert_eq!(summary.processed, 1);
    assert_eq!(summary.emitted, 0);
    assert!(notifier.sent().is_empty());
    assert_eq!(ctx.history.latest("SOXL").unwrap().daily_value, 0.0);
}

#[tokio::test]
async fn weekly_filter_suppresses_crossing() {
    let provider = Arc::new(FakeProvider::new());
    let notifier = Arc::new(FakeNotifier::new());
    provider.set("TECL", Interval::Daily, &falling_closes());
    // Weekly RSI 100 is far above the weekly buy threshold.
    provider.set("TECL", Interval::Weekly, &rising_closes());

    let mut policies = HashMap::new();
    policies.insert(
        "TECL".to_string(),
        SymbolPolicy::default().with_secondary_filter(true).with_label("Enhanced RSI"),
    );
    let prior = HistoryRecord::observation(&OscillatorReading::new("TECL", monday(), 45.0), 100.0, None);
    let history = rsiwatch::history::MemoryHistoryStore::with_records(vec![prior]);

    let mut ctx = context(&["TECL"], policies, Box::new(history), provider, notifier.clone());
    let summary = SignalEngine::run(&mut ctx, monday().succ_opt().unwrap()).await;

    assert_eq!(summary.emitted, 0);
    assert_eq!(summary.suppressed, 1);
    assert!(notifier.sent().is_empty());

    let latest = ctx.history.latest("TECL").unwrap();
    assert_eq!(latest.signal_type, SignalType::None);
    assert_eq!(latest.weekly_value, Some(100.0));
}

#[tokio::test]
async fn fetch_failure_skips_symbol_without_row() {
    let provider = Arc::new(FakeProvider::new());
    let notifier = Arc::new(FakeNotifier::new());
    provider.set("SOXL", Interval::Daily, &neutral_closes());
    // TECL has no data at all.

    let mut ctx = context(
        &["TECL", "SOXL"],
        HashMap::new(),
        Box::new(rsiwatch::history::MemoryHistoryStore::new()),
        provider,
        notifier,
    );
    let summary = SignalEngine::run(&mut ctx, monday()).await;

    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.processed, 1);
    assert!(ctx.history.latest("TECL").is_none());
    assert!(ctx.history.latest("SOXL").is_some());
    assert_eq!(ctx.metrics.symbols_skipped_total.get(), 1);
}

#[tokio::test]
async fn short_series_is_skipped() {
    let provider = Arc::new(FakeProvider::new());
    provider.set("SOXL", Interval::Daily, &[100.0, 101.0, 102.0]);

    let mut ctx = context(
        &["SOXL"],
        HashMap::new(),
        Box::new(rsiwatch::history::MemoryHistoryStore::new()),
        provider,
        Arc::new(FakeNotifier::new()),
    );
    let summary = SignalEngine::run(&mut ctx, monday()).await;

    assert_eq!(summary.skipped, 1);
    assert!(ctx.history.latest("SOXL").is_none());
}

#[tokio::test]
async fn missing_weekly_still_records_reading() {
    let provider = Arc::new(FakeProvider::new());
    provider.set("SOXL", Interval::Daily, &neutral_closes());
    provider.set("SOXL", Interval::Weekly, &[1.0, 2.0]);

    let mut ctx = context(
        &["SOXL"],
        HashMap::new(),
        Box::new(rsiwatch::history::MemoryHistoryStore::new()),
        provider.clone(),
        Arc::new(FakeNotifier::new()),
    );
    SignalEngine::run(&mut ctx, monday()).await;

    let latest = ctx.history.latest("SOXL").unwrap();
    assert_eq!(latest.weekly_value, None);
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn delivery_failure_is_counted_and_row_still_written() {
    let provider = Arc::new(FakeProvider::new());
    let notifier = Arc::new(FakeNotifier::failing());
    provider.set("SOXL", Interval::Daily, &falling_closes());

    let prior = HistoryRecord::observation(&OscillatorReading::new("SOXL", monday(), 50.0), 100.0, None);
    let history = rsiwatch::history::MemoryHistoryStore::with_records(vec![prior]);

    let mut ctx = context(&["SOXL"], HashMap::new(), Box::new(history), provider, notifier);
    let summary = SignalEngine::run(&mut ctx, monday().succ_opt().unwrap()).await;

    assert_eq!(summary.emitted, 1);
    assert_eq!(summary.delivered, 0);
    assert_eq!(summary.delivery_failures, 1);
    assert_eq!(ctx.metrics.notifications_failed_total.get(), 1);
    assert_eq!(ctx.history.latest("SOXL").unwrap().signal_type, SignalType::Buy);
}

#[tokio::test]
async fn history_write_failure_does_not_abort_run() {
    let provider = Arc::new(FakeProvider::new());
    provider.set("TECL", Interval::Daily, &neutral_closes());
    provider.set("SOXL", Interval::Daily, &neutral_closes());

    let mut ctx = context(
        &["TECL", "SOXL"],
        HashMap::new(),
        Box::new(ReadOnlyHistory::default()),
        provider,
        Arc::new(FakeNotifier::new()),
    );
    let summary = SignalEngine::run(&mut ctx, monday()).await;

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.history_write_failures, 2);
    assert_eq!(ctx.metrics.history_write_failures_total.get(), 2);
}

#[tokio::test]
async fn digest_sent_only_on_configured_weekday() {
    let provider = Arc::new(FakeProvider::new());
    let notifier = Arc::new(FakeNotifier::new());
    provider.set("SOXL", Interval::Daily, &neutral_closes());

    let mut ctx = context(
        &["SOXL"],
        HashMap::new(),
        Box::new(rsiwatch::history::MemoryHistoryStore::new()),
        provider,
        notifier.clone(),
    );
    assert_eq!(ctx.settings.digest_weekday, Some(Weekday::Fri));

    let thursday = SignalEngine::run(&mut ctx, date(2026, 10, 15)).await;
    assert!(!thursday.digest_sent);
    assert!(notifier.sent().is_empty());

    let friday = SignalEngine::run(&mut ctx, date(2026, 10, 16)).await;
    assert!(friday.digest_sent);
    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("Date: 2026-10-16"));
    assert!(sent[0].contains("• SOXL: daily 50.0 (neutral)"));
}

#[tokio::test]
async fn digest_disabled_is_never_sent() {
    let provider = Arc::new(FakeProvider::new());
    let notifier = Arc::new(FakeNotifier::new());
    provider.set("SOXL", Interval::Daily, &neutral_closes());

    let mut ctx = context(
        &["SOXL"],
        HashMap::new(),
        Box::new(rsiwatch::history::MemoryHistoryStore::new()),
        provider,
        notifier.clone(),
    );
    ctx.settings.digest_weekday = None;

    let summary = SignalEngine::run(&mut ctx, date(2026, 10, 16)).await;
    assert!(!summary.digest_sent);
    assert!(notifier.sent().is_empty());
}
