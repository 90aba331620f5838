//! Market data provider interface.

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

use crate::models::indicators::PricePoint;

/// Bar granularity of a requested series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interval {
    Daily,
    Weekly,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Daily => "1d",
            Interval::Weekly => "1wk",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid endpoint: {0}")]
    Url(#[from] url::ParseError),

    #[error("base URL cannot carry a path: {0}")]
    InvalidBaseUrl(String),

    #[error("could not decode provider response: {0}")]
    Decode(String),

    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("provider error {code}: {description}")]
    Provider { code: String, description: String },

    #[error("no data returned for {0}")]
    Empty(String),
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Closing prices for `symbol`, oldest first.
    ///
    /// `lookback` is a provider range expression such as `2mo` or `6mo`.
    async fn fetch_series(
        &self,
        symbol: &str,
        lookback: &str,
        interval: Interval,
    ) -> Result<Vec<PricePoint>, MarketDataError>;
}
