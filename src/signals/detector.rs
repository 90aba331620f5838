//! Edge-triggered RSI crossing detection.
//!
//! A signal fires only when the daily RSI crosses a threshold between the
//! prior recorded reading and the current one. A symbol that stays oversold
//! therefore alerts once per traversal, not once per invocation.

use crate::models::indicators::OscillatorReading;
use crate::models::policy::SymbolPolicy;
use crate::models::signal::{SignalEvent, SignalType};

pub const REASON_PRIMARY_ONLY: &str = "primary-only";
pub const REASON_SECONDARY_UNAVAILABLE: &str = "primary-only (secondary unavailable)";

/// Which daily threshold was crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Downward through the buy threshold.
    Buy,
    /// Upward through the sell threshold.
    Sell,
}

impl Edge {
    pub fn signal_type(&self) -> SignalType {
        match self {
            Edge::Buy => SignalType::Buy,
            Edge::Sell => SignalType::Sell,
        }
    }
}

/// Classification of one (prior, current, policy) triple.
#[derive(Debug, Clone, PartialEq)]
pub enum CrossingOutcome {
    /// No prior reading, so no edge can exist.
    ColdStart,
    /// Prior reading exists but no threshold was crossed.
    NoEdge,
    /// An edge occurred but the weekly confirmation rejected it.
    Suppressed { signal_type: SignalType, reason: String },
    Signal(SignalEvent),
}

impl CrossingOutcome {
    pub fn signal(&self) -> Option<&SignalEvent> {
        match self {
            CrossingOutcome::Signal(event) => Some(event),
            _ => None,
        }
    }

    pub fn into_signal(self) -> Option<SignalEvent> {
        match self {
            CrossingOutcome::Signal(event) => Some(event),
            _ => None,
        }
    }

    pub fn is_signal(&self) -> bool {
        matches!(self, CrossingOutcome::Signal(_))
    }
}

/// Detect a daily threshold crossing. Buy is checked before sell.
pub fn detect_edge(prior_daily: f64, current_daily: f64, policy: &SymbolPolicy) -> Option<Edge> {
    let buy = policy.daily_buy_threshold;
    let sell = policy.daily_sell_threshold;

    if prior_daily > buy && current_daily <= buy {
        Some(Edge::Buy)
    } else if prior_daily < sell && current_daily >= sell {
        Some(Edge::Sell)
    } else {
        None
    }
}

/// Result of applying the weekly confirmation to an edge.
enum Confirmation {
    NotRequired(&'static str),
    Passed(String),
    Rejected(String),
}

fn confirm(edge: Edge, weekly: Option<f64>, policy: &SymbolPolicy) -> Confirmation {
    if !policy.use_secondary_filter {
        return Confirmation::NotRequired(REASON_PRIMARY_ONLY);
    }
    let Some(weekly) = weekly else {
        return Confirmation::NotRequired(REASON_SECONDARY_UNAVAILABLE);
    };

    match edge {
        Edge::Buy => {
            let limit = policy.weekly_buy_threshold;
            if weekly <= limit {
                Confirmation::Passed(format!("primary+secondary (weekly {:.1} <= {})", weekly, limit))
            } else {
                Confirmation::Rejected(format!("secondary filter rejected (weekly {:.1} > {})", weekly, limit))
            }
        }
        Edge::Sell => {
            let limit = policy.weekly_sell_threshold;
            if weekly >= limit {
                Confirmation::Passed(format!("primary+secondary (weekly {:.1} >= {})", weekly, limit))
            } else {
                Confirmation::Rejected(format!("secondary filter rejected (weekly {:.1} < {})", weekly, limit))
            }
        }
    }
}

/// Classify the current reading against the prior one.
///
/// Pure: the same inputs always produce the same outcome.
pub fn classify(
    current: &OscillatorReading,
    prior: Option<&OscillatorReading>,
    price: f64,
    policy: &SymbolPolicy,
) -> CrossingOutcome {
    let Some(prior) = prior else {
        return CrossingOutcome::ColdStart;
    };

    let Some(edge) = detect_edge(prior.daily_value, current.daily_value, policy) else {
        return CrossingOutcome::NoEdge;
    };

    let (reason, confirmed) = match confirm(edge, current.weekly_value, policy) {
        Confirmation::NotRequired(reason) => (reason.to_string(), false),
        Confirmation::Passed(reason) => (reason, true),
        Confirmation::Rejected(reason) => {
            return CrossingOutcome::Suppressed {
                signal_type: edge.signal_type(),
                reason,
            };
        }
    };

    CrossingOutcome::Signal(SignalEvent {
        symbol: current.symbol.clone(),
        signal_type: edge.signal_type(),
        current_daily: current.daily_value,
        current_weekly: current.weekly_value,
        prev_daily: prior.daily_value,
        price,
        strategy_label: policy.strategy_label.clone(),
        reason,
        used_secondary_filter: confirmed,
    })
}

/// Convenience wrapper returning only the emitted event.
pub fn detect(
    current: &OscillatorReading,
    prior: Option<&OscillatorReading>,
    price: f64,
    policy: &SymbolPolicy,
) -> Option<SignalEvent> {
    classify(current, prior, price, policy).into_signal()
}
