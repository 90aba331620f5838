//! rsiwatch: edge-triggered RSI crossing alerts.
//!
//! The crate polls closing prices per symbol, computes daily and weekly RSI,
//! compares them with the last value recorded in an append-only history log
//! and raises an alert when a threshold is crossed.

pub mod config;
pub mod core;
pub mod error;
pub mod history;
pub mod indicators;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod notifications;
pub mod services;
pub mod signals;

pub use error::EngineError;
