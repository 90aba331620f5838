//! Yahoo Finance chart API client.

use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::models::indicators::PricePoint;
use crate::services::market_data::{Interval, MarketDataError, MarketDataProvider};

pub const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Clone)]
pub struct YahooChartClient {
    base_url: String,
    client: reqwest::Client,
}

impl YahooChartClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, MarketDataError> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    fn chart_url(&self, symbol: &str, lookback: &str, interval: Interval) -> Result<Url, MarketDataError> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| MarketDataError::InvalidBaseUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);
        url.query_pairs_mut()
            .append_pair("range", lookback)
            .append_pair("interval", interval.as_str());
        Ok(url)
    }
}

#[async_trait]
impl MarketDataProvider for YahooChartClient {
    async fn fetch_series(
        &self,
        symbol: &str,
        lookback: &str,
        interval: Interval,
    ) -> Result<Vec<PricePoint>, MarketDataError> {
        let url = self.chart_url(symbol, lookback, interval)?;
        debug!(symbol = %symbol, interval = %interval, url = %url, "Fetching chart");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        let envelope: ChartEnvelope = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(MarketDataError::Status {
                    status: status.as_u16(),
                    body,
                });
            }
            Err(e) => return Err(MarketDataError::Decode(e.to_string())),
        };

        if let Some(err) = envelope.chart.error {
            return Err(MarketDataError::Provider {
                code: err.code,
                description: err.description,
            });
        }
        if !status.is_success() {
            return Err(MarketDataError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let result = envelope
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| MarketDataError::Empty(symbol.to_string()))?;

        let closes = result
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|q| q.close)
            .unwrap_or_default();

        // Yahoo pads halted or in-progress bars with null closes.
        let points: Vec<PricePoint> = result
            .timestamp
            .iter()
            .zip(closes)
            .filter_map(|(&ts, close)| {
                let close = close.filter(|c| c.is_finite())?;
                let timestamp = DateTime::from_timestamp(ts, 0)?;
                Some(PricePoint::new(timestamp, close))
            })
            .collect();

        if points.is_empty() {
            return Err(MarketDataError::Empty(symbol.to_string()));
        }

        debug!(symbol = %symbol, interval = %interval, count = points.len(), "Fetched chart");
        Ok(points)
    }
}
