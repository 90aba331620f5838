//! Prometheus counters for a single run.
//!
//! The process is short-lived, so nothing scrapes it. After a run the
//! exposition text can be written to a file picked up by node-exporter's
//! textfile collector.

use prometheus::{Encoder, IntCounter, Registry, TextEncoder};
use std::fs;
use std::io;
use std::path::Path;

pub struct Metrics {
    registry: Registry,
    pub symbols_processed_total: IntCounter,
    pub symbols_skipped_total: IntCounter,
    pub signals_emitted_total: IntCounter,
    pub signals_suppressed_total: IntCounter,
    pub notifications_sent_total: IntCounter,
    pub notifications_failed_total: IntCounter,
    pub history_write_failures_total: IntCounter,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let symbols_processed_total = counter(
            &registry,
            "rsiwatch_symbols_processed_total",
            "Symbols whose daily RSI was computed",
        )?;
        let symbols_skipped_total = counter(
            &registry,
            "rsiwatch_symbols_skipped_total",
            "Symbols skipped because data was unavailable or too short",
        )?;
        let signals_emitted_total = counter(
            &registry,
            "rsiwatch_signals_emitted_total",
            "Crossing signals that passed every filter",
        )?;
        let signals_suppressed_total = counter(
            &registry,
            "rsiwatch_signals_suppressed_total",
            "Crossings rejected by the weekly filter",
        )?;
        let notifications_sent_total = counter(
            &registry,
            "rsiwatch_notifications_sent_total",
            "Messages accepted by the notification channel",
        )?;
        let notifications_failed_total = counter(
            &registry,
            "rsiwatch_notifications_failed_total",
            "Messages the notification channel rejected or never received",
        )?;
        let history_write_failures_total = counter(
            &registry,
            "rsiwatch_history_write_failures_total",
            "History rows that could not be appended",
        )?;

        Ok(Self {
            registry,
            symbols_processed_total,
            symbols_skipped_total,
            signals_emitted_total,
            signals_suppressed_total,
            notifications_sent_total,
            notifications_failed_total,
            history_write_failures_total,
        })
    }

    /// Text exposition format.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    /// Write the exposition to `path` via a sibling temp file and rename, so
    /// the collector never reads a half-written file.
    pub fn write_textfile(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let path = path.as_ref();
        let body = self
            .export()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
        let tmp = path.with_extension("prom.tmp");
        fs::write(&tmp, body)?;
        fs::rename(&tmp, path)
    }
}

fn counter(registry: &Registry, name: &str, help: &str) -> Result<IntCounter, prometheus::Error> {
    let counter = IntCounter::new(name, help)?;
    registry.register(Box::new(counter.clone()))?;
    Ok(counter)
}
