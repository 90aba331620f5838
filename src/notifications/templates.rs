//! Plain-text bodies for alert and digest messages.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt::Write;

use crate::models::{SignalEvent, SignalType, SymbolPolicy, SymbolSnapshot};

const DISCLAIMER: &str = "Trade at your own risk. This is not investment advice.";
const STRENGTH_FILTERED: &str = "★★★★★";
const STRENGTH_UNFILTERED: &str = "★★★☆☆";

/// Zone of a daily value relative to the symbol's thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Oversold,
    Overbought,
    Neutral,
}

impl Zone {
    pub fn classify(daily_value: f64, policy: &SymbolPolicy) -> Self {
        if daily_value <= policy.daily_buy_threshold {
            Zone::Oversold
        } else if daily_value >= policy.daily_sell_threshold {
            Zone::Overbought
        } else {
            Zone::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::Oversold => "oversold",
            Zone::Overbought => "overbought",
            Zone::Neutral => "neutral",
        }
    }
}

pub fn alert_message(event: &SignalEvent, policy: &SymbolPolicy) -> String {
    let (emoji, action, daily_threshold, cmp, weekly_threshold) = match event.signal_type {
        SignalType::Sell => (
            "📈",
            "SELL",
            policy.daily_sell_threshold,
            ">=",
            policy.weekly_sell_threshold,
        ),
        _ => (
            "📉",
            "BUY",
            policy.daily_buy_threshold,
            "<=",
            policy.weekly_buy_threshold,
        ),
    };

    let heading = if event.used_secondary_filter {
        format!("{} ({})", event.symbol, event.strategy_label)
    } else {
        event.symbol.clone()
    };
    let strength = if event.used_secondary_filter {
        STRENGTH_FILTERED
    } else {
        STRENGTH_UNFILTERED
    };

    let mut msg = String::new();
    let _ = writeln!(msg, "{} [RSI ALERT] {} signal", emoji, action);
    let _ = writeln!(msg);
    let _ = writeln!(msg, "{}", heading);
    let _ = writeln!(msg, "Price: ${:.2}", event.price);
    let _ = writeln!(
        msg,
        "Daily RSI: {:.1} ({} {}: ✅)",
        event.current_daily, cmp, daily_threshold
    );
    if let Some(weekly) = event.current_weekly {
        if event.used_secondary_filter {
            let _ = writeln!(msg, "Weekly RSI: {:.1} ({} {}: ✅)", weekly, cmp, weekly_threshold);
        } else {
            let _ = writeln!(msg, "Weekly RSI: {:.1}", weekly);
        }
    }
    let _ = writeln!(msg, "Signal strength: {}", strength);
    if let Some(note) = &policy.performance_note {
        let _ = writeln!(msg, "{}", note);
    }
    let _ = writeln!(msg, "Strategy: {}", event.strategy_label);
    let _ = writeln!(msg);
    let _ = writeln!(msg, "Reason: {}", event.reason);
    let _ = writeln!(msg, "Previous daily RSI: {:.1}", event.prev_daily);
    let _ = writeln!(msg);
    msg.push_str(DISCLAIMER);
    msg
}

/// Periodic summary of the readings gathered during one run.
///
/// Symbols without a policy entry are classified against the default thresholds.
pub fn digest_message(
    date: NaiveDate,
    snapshots: &[SymbolSnapshot],
    policies: &HashMap<String, SymbolPolicy>,
) -> String {
    let fallback = SymbolPolicy::default();

    let mut msg = String::new();
    let _ = writeln!(msg, "📊 Weekly RSI report");
    let _ = writeln!(msg);
    let _ = writeln!(msg, "Date: {}", date.format("%Y-%m-%d"));
    let _ = writeln!(msg);
    msg.push_str("Current RSI:");

    for snapshot in snapshots {
        let reading = &snapshot.reading;
        let policy = policies.get(&reading.symbol).unwrap_or(&fallback);
        let zone = Zone::classify(reading.daily_value, policy);
        let marker = if policy.use_secondary_filter { " (Enhanced)" } else { "" };
        let weekly = reading
            .weekly_value
            .map(|w| format!(", weekly {:.1}", w))
            .unwrap_or_default();

        let _ = write!(
            msg,
            "\n• {}{}: daily {:.1} ({}){} ${:.2}",
            reading.symbol,
            marker,
            reading.daily_value,
            zone.as_str(),
            weekly,
            snapshot.price
        );
    }

    let notes: Vec<(&str, &str)> = snapshots
        .iter()
        .filter_map(|s| {
            let note = policies.get(&s.reading.symbol)?.performance_note.as_deref()?;
            Some((s.reading.symbol.as_str(), note))
        })
        .collect();
    if !notes.is_empty() {
        msg.push_str("\n\nExpected performance:");
        for (symbol, note) in notes {
            let _ = write!(msg, "\n• {}: {}", symbol, note);
        }
    }
    msg
}
