pub mod bnapi_version;
pub mod cache_file;
pub mod coingecko_version;
pub mod serde_version;

use std::error::Error;
use std::fmt;

use anyhow::Result;
use async_trait::async_trait;

#[cfg(debug_assertions)]
use crate::config::DEBUG_FLAGS;
use crate::config::{ANALYSIS, BINANCE, COINGECKO};
use crate::models::PriceSeries;

/// What to fetch. Each provider reads the fields it understands.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRequest {
    /// CoinGecko coin id, also the asset name the series and its cache are keyed by
    pub coin_id: String,
    /// Binance spot symbol trading `coin_id`. `None` when it is not known,
    /// in which case Binance is not asked at all.
    pub symbol: Option<String>,
    pub interval_ms: i64,
    /// Maximum number of samples to keep, newest first
    pub limit: usize,
}

impl Default for SeriesRequest {
    fn default() -> Self {
        Self {
            coin_id: COINGECKO.default_coin_id.to_string(),
            symbol: Some(BINANCE.default_symbol.to_string()),
            interval_ms: ANALYSIS.series.interval_ms,
            limit: ANALYSIS.series.default_limit,
        }
    }
}

#[async_trait]
pub trait CreatePriceSeries: Send + Sync {
    // Either create a price series OR return an anyhow::error
    async fn create_price_series(&self, request: &SeriesRequest) -> Result<PriceSeries>;

    /// A unique identifier for this implementation (so that afterwards we know which one we used).
    fn signature(&self) -> &'static str;
}

#[derive(Debug)]
pub enum PriceFetchError {
    HttpStatus {
        provider: &'static str,
        status: u16,
        body: String,
    },
    EmptySeries {
        provider: &'static str,
    },
    AllProvidersFailed {
        attempted: usize,
    },
}

impl fmt::Display for PriceFetchError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PriceFetchError::HttpStatus {
                provider,
                status,
                body,
            } => write!(f, "{} answered HTTP {}: {}", provider, status, body),
            PriceFetchError::EmptySeries { provider } => {
                write!(f, "{} returned no usable samples", provider)
            }
            PriceFetchError::AllProvidersFailed { attempted } => {
                write!(f, "All {} price providers failed", attempted)
            }
        }
    }
}

impl Error for PriceFetchError {}

/// Try each provider in turn and return the first non-empty series with the
/// signature of the provider that produced it.
pub async fn get_price_series_async(
    implementations: &[Box<dyn CreatePriceSeries>],
    request: &SeriesRequest,
) -> Result<(PriceSeries, &'static str)> {
    for imp in implementations {
        let outcome = match imp.create_price_series(request).await {
            Ok(series) if series.is_empty() => Err(anyhow::Error::new(PriceFetchError::EmptySeries {
                provider: imp.signature(),
            })),
            other => other,
        };

        match outcome {
            Ok(series) => return Ok((series, imp.signature())),
            Err(e) => {
                log::warn!("{} failed: {}", imp.signature(), e);
                #[cfg(debug_assertions)]
                if DEBUG_FLAGS.print_provider_fallback {
                    log::info!("{} error chain: {:#}", imp.signature(), e);
                }
            }
        }
    }
    Err(PriceFetchError::AllProvidersFailed {
        attempted: implementations.len(),
    }
    .into())
}
