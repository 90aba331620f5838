//! RSI (Relative Strength Index) indicator

use crate::indicators::error::IndicatorError;

pub const DEFAULT_PERIOD: usize = 14;

/// Calculate the full RSI series.
///
/// RSI = 100 - (100 / (1 + RS))
/// RS = Average Gain / Average Loss
///
/// Gains and losses are simple means over the trailing `period` deltas. The
/// output has the same length as `prices`; the first `period` entries are
/// `None` because no full window of deltas exists for them.
pub fn calculate_rsi_series(prices: &[f64], period: usize) -> Result<Vec<Option<f64>>, IndicatorError> {
    validate(prices, period)?;

    let deltas: Vec<f64> = prices.windows(2).map(|w| w[1] - w[0]).collect();
    let mut out = vec![None; prices.len()];

    for end in period..=deltas.len() {
        // deltas[end - 1] is the change into prices[end]
        out[end] = Some(rsi_from_window(&deltas[end - period..end], period));
    }

    Ok(out)
}

/// Calculate only the most recent RSI value.
///
/// Identical to the last element of [`calculate_rsi_series`] without
/// computing the earlier windows.
pub fn calculate_rsi(prices: &[f64], period: usize) -> Result<f64, IndicatorError> {
    validate(prices, period)?;

    let tail = &prices[prices.len() - period - 1..];
    let deltas: Vec<f64> = tail.windows(2).map(|w| w[1] - w[0]).collect();
    Ok(rsi_from_window(&deltas, period))
}

/// Calculate RSI with default period (14)
pub fn calculate_rsi_default(prices: &[f64]) -> Result<f64, IndicatorError> {
    calculate_rsi(prices, DEFAULT_PERIOD)
}

fn validate(prices: &[f64], period: usize) -> Result<(), IndicatorError> {
    if period == 0 {
        return Err(IndicatorError::InvalidPeriod);
    }
    if prices.len() < period + 1 {
        return Err(IndicatorError::InsufficientData {
            required: period + 1,
            available: prices.len(),
        });
    }
    if let Some(idx) = prices.iter().position(|p| !p.is_finite()) {
        return Err(IndicatorError::NonFinitePrice(idx));
    }
    Ok(())
}

fn rsi_from_window(deltas: &[f64], period: usize) -> f64 {
    let mut gain_sum = 0.0;
    let mut loss_sum = 0.0;
    for &change in deltas {
        if change > 0.0 {
            gain_sum += change;
        } else {
            loss_sum += -change;
        }
    }

    let avg_gain = gain_sum / period as f64;
    let avg_loss = loss_sum / period as f64;

    // No losses in the window saturates the oscillator.
    if avg_loss == 0.0 {
        return 100.0;
    }

    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}
