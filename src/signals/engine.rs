//! Per-run orchestration: fetch, compute, detect, notify, record.

use chrono::{Datelike, NaiveDate};
use tracing::{debug, error, info, warn};

use crate::core::context::RunContext;
use crate::error::EngineError;
use crate::history::HistoryRecord;
use crate::indicators::momentum::rsi::calculate_rsi;
use crate::models::indicators::{closes, OscillatorReading, SymbolSnapshot};
use crate::notifications::templates;
use crate::services::market_data::{Interval, MarketDataError};
use crate::signals::detector::{classify, CrossingOutcome};

/// Counts for one completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub skipped: usize,
    pub emitted: usize,
    pub suppressed: usize,
    pub delivered: usize,
    pub delivery_failures: usize,
    pub history_write_failures: usize,
    pub digest_sent: bool,
}

pub struct SignalEngine;

impl SignalEngine {
    /// Process every configured symbol in order, then send the digest if
    /// `today` falls on the configured weekday.
    ///
    /// Per-symbol failures are logged and counted; they never abort the run.
    pub async fn run(ctx: &mut RunContext, today: NaiveDate) -> RunSummary {
        info!(date = %today, symbols = ctx.symbols.len(), "Run started");

        let mut summary = RunSummary::default();
        let mut snapshots = Vec::with_capacity(ctx.symbols.len());

        for symbol in ctx.symbols.clone() {
            match Self::read_symbol(ctx, &symbol, today).await {
                Ok(snapshot) => {
                    summary.processed += 1;
                    ctx.metrics.symbols_processed_total.inc();
                    Self::process_snapshot(ctx, &snapshot, &mut summary).await;
                    snapshots.push(snapshot);
                }
                Err(e) => {
                    summary.skipped += 1;
                    ctx.metrics.symbols_skipped_total.inc();
                    error!(symbol = %symbol, error = %e, "Symbol skipped");
                }
            }
        }

        if ctx.settings.digest_weekday == Some(today.weekday()) {
            Self::send_digest(ctx, today, &snapshots, &mut summary).await;
        }

        info!(
            processed = summary.processed,
            skipped = summary.skipped,
            signals_delivered = summary.delivered,
            "Run complete: {} signal(s) delivered",
            summary.delivered
        );
        summary
    }

    /// Fetch both timeframes and compute the current reading.
    async fn read_symbol(
        ctx: &RunContext,
        symbol: &str,
        today: NaiveDate,
    ) -> Result<SymbolSnapshot, EngineError> {
        let period = ctx.settings.rsi_period;

        let daily = ctx
            .data_provider
            .fetch_series(symbol, &ctx.settings.daily_lookback, Interval::Daily)
            .await
            .map_err(|source| EngineError::DataUnavailable {
                symbol: symbol.to_string(),
                source,
            })?;
        let Some(last) = daily.last() else {
            return Err(EngineError::DataUnavailable {
                symbol: symbol.to_string(),
                source: MarketDataError::Empty(symbol.to_string()),
            });
        };
        let price = last.close;

        let daily_value =
            calculate_rsi(&closes(&daily), period).map_err(|source| EngineError::InsufficientData {
                symbol: symbol.to_string(),
                source,
            })?;

        let weekly_value = match ctx
            .data_provider
            .fetch_series(symbol, &ctx.settings.weekly_lookback, Interval::Weekly)
            .await
        {
            Ok(weekly) => match calculate_rsi(&closes(&weekly), period) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "Weekly RSI unavailable");
                    None
                }
            },
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "Weekly series unavailable");
                None
            }
        };

        info!(
            symbol = %symbol,
            price = %format!("{:.2}", price),
            daily_rsi = %format!("{:.1}", daily_value),
            weekly_rsi = %weekly_value.map(|w| format!("{:.1}", w)).unwrap_or_else(|| "N/A".to_string()),
            "Reading computed"
        );

        Ok(SymbolSnapshot {
            reading: OscillatorReading::new(symbol, today, daily_value).with_weekly_opt(weekly_value),
            price,
        })
    }

    async fn process_snapshot(ctx: &mut RunContext, snapshot: &SymbolSnapshot, summary: &mut RunSummary) {
        let reading = &snapshot.reading;
        let symbol = reading.symbol.as_str();
        let policy = ctx.policy(symbol);

        let prior = match ctx.history.try_latest(symbol) {
            Ok(record) => record.map(|r| r.as_reading()),
            Err(e) => {
                let err = EngineError::HistoryRead(e);
                warn!(symbol = %symbol, error = %err, "Treating symbol as cold start");
                None
            }
        };

        let outcome = classify(reading, prior.as_ref(), snapshot.price, &policy);
        let mut record =
            HistoryRecord::observation(reading, snapshot.price, prior.as_ref().map(|p| p.daily_value));

        match &outcome {
            CrossingOutcome::ColdStart => debug!(symbol = %symbol, "No prior reading"),
            CrossingOutcome::NoEdge => debug!(symbol = %symbol, "No crossing"),
            CrossingOutcome::Suppressed { signal_type, reason } => {
                summary.suppressed += 1;
                ctx.metrics.signals_suppressed_total.inc();
                info!(symbol = %symbol, signal_type = %signal_type, reason = %reason, "Crossing suppressed");
            }
            CrossingOutcome::Signal(event) => {
                summary.emitted += 1;
                ctx.metrics.signals_emitted_total.inc();
                info!(
                    symbol = %symbol,
                    signal_type = %event.signal_type,
                    reason = %event.reason,
                    "Signal emitted"
                );

                let message = templates::alert_message(event, &policy);
                match ctx.notifier.deliver(&message).await {
                    Ok(()) => {
                        summary.delivered += 1;
                        ctx.metrics.notifications_sent_total.inc();
                    }
                    Err(e) => {
                        summary.delivery_failures += 1;
                        ctx.metrics.notifications_failed_total.inc();
                        let err = EngineError::from(e);
                        error!(symbol = %symbol, error = %err, "Alert not delivered");
                    }
                }
                record = record.with_signal(event);
            }
        }

        if let Err(e) = ctx.history.append(record) {
            summary.history_write_failures += 1;
            ctx.metrics.history_write_failures_total.inc();
            let err = EngineError::HistoryWrite(e);
            error!(symbol = %symbol, error = %err, "History row not written");
        }
    }

    async fn send_digest(
        ctx: &RunContext,
        today: NaiveDate,
        snapshots: &[SymbolSnapshot],
        summary: &mut RunSummary,
    ) {
        if snapshots.is_empty() {
            warn!(date = %today, "No readings this run, digest skipped");
            return;
        }

        let message = templates::digest_message(today, snapshots, &ctx.policies);
        match ctx.notifier.deliver(&message).await {
            Ok(()) => {
                summary.digest_sent = true;
                ctx.metrics.notifications_sent_total.inc();
                info!(date = %today, symbols = snapshots.len(), "Digest sent");
            }
            Err(e) => {
                summary.delivery_failures += 1;
                ctx.metrics.notifications_failed_total.inc();
                error!(date = %today, error = %e, "Digest not delivered");
            }
        }
    }
}
