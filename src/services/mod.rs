//! External collaborators the engine pulls data from.

pub mod market_data;
pub mod yahoo;

pub use market_data::{Interval, MarketDataError, MarketDataProvider};
pub use yahoo::YahooChartClient;
