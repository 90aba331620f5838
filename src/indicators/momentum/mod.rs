pub mod rsi;

pub use rsi::{calculate_rsi, calculate_rsi_default, calculate_rsi_series};
