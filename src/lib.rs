// Core modules
pub mod analysis;
pub mod config;
pub mod data;
pub mod domain;
pub mod models;
pub mod report;
pub mod utils;

// Re-export commonly used types
pub use analysis::{WeekdayEngine, WindowOutcome};
pub use data::{SeriesRequest, fetch_price_series, write_price_series_async};
pub use domain::{Sample, WeekdayBucket, WindowSpec};
pub use models::{DeviationRow, PriceSeries};

// CLI argument parsing
use clap::Parser;

use crate::config::{ANALYSIS, BINANCE, COINGECKO};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Average price per weekday over recent windows", long_about = None)]
pub struct Cli {
    /// Use the network providers as primary source instead of the local cache
    #[arg(long, default_value_t = false)]
    pub prefer_api: bool,

    /// Comma-separated window sizes, in samples (e.g. 24,168,720)
    #[arg(long, value_delimiter = ',')]
    pub windows: Option<Vec<usize>>,

    /// Maximum number of samples to fetch, newest first
    #[arg(long, default_value_t = ANALYSIS.series.default_limit)]
    pub limit: usize,

    /// CoinGecko coin id (lowercase letters, digits and '-')
    #[arg(long, default_value = COINGECKO.default_coin_id, value_parser = parse_coin_id)]
    pub coin: String,

    /// Binance spot symbol used when CoinGecko is unavailable.
    /// Defaults to BTCUSDT for the default coin only.
    #[arg(long)]
    pub symbol: Option<String>,

    /// Print JSON instead of the table
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

/// Coin ids end up in the cache file name, so only `[a-z0-9-]` is accepted.
pub fn parse_coin_id(value: &str) -> Result<String, String> {
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if valid {
        Ok(value.to_string())
    } else {
        Err(format!(
            "'{}' is not a coin id (expected lowercase letters, digits and '-')",
            value
        ))
    }
}

impl Cli {
    /// The symbol given on the command line, else the default symbol when the
    /// default coin is asked for. Any other coin has no known Binance market.
    pub fn binance_symbol(&self) -> Option<String> {
        match &self.symbol {
            Some(symbol) => Some(symbol.to_uppercase()),
            None if self.coin == COINGECKO.default_coin_id => {
                Some(BINANCE.default_symbol.to_string())
            }
            None => None,
        }
    }

    /// Requested windows in the order given, or the configured defaults.
    pub fn window_specs(&self) -> Vec<WindowSpec> {
        match &self.windows {
            Some(sizes) if !sizes.is_empty() => WindowSpec::from_sizes(sizes),
            _ => WindowSpec::defaults(),
        }
    }

    pub fn series_request(&self) -> SeriesRequest {
        SeriesRequest {
            coin_id: self.coin.clone(),
            symbol: self.binance_symbol(),
            interval_ms: ANALYSIS.series.interval_ms,
            limit: self.limit,
        }
    }
}
