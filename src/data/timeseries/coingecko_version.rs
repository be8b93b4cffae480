use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::Value;
use tokio::time::Instant;

use crate::config::COINGECKO;
use crate::data::timeseries::{CreatePriceSeries, PriceFetchError, SeriesRequest};
use crate::domain::sample::RawSample;
use crate::models::PriceSeries;

pub const SIGNATURE: &str = "CoinGecko API";

/// `market_chart` payload. Only `prices` is read; each entry is `[timestamp_ms, price]`.
#[derive(Deserialize, Debug)]
pub struct MarketChart {
    pub prices: Vec<Vec<Value>>,
}

fn raw_sample(entry: &[Value]) -> RawSample {
    let timestamp_ms = entry
        .first()
        .and_then(|ts| ts.as_i64().or_else(|| ts.as_f64().map(|f| f as i64)));
    let price = entry.get(1).and_then(Value::as_f64);
    RawSample {
        timestamp_ms,
        price,
    }
}

/// Turn a chronological `market_chart` body into a newest-first series of at most `limit` samples.
pub fn parse_market_chart(body: &str, asset: &str, interval_ms: i64, limit: usize) -> Result<PriceSeries> {
    let chart: MarketChart =
        serde_json::from_str(body).context("Failed to parse CoinGecko market_chart body")?;
    let raw = chart.prices.iter().map(|entry| raw_sample(entry));
    let (mut series, _rejected) = PriceSeries::from_raw_chronological(asset, interval_ms, raw);
    series.truncate(limit);
    Ok(series)
}

pub struct CoinGeckoVersion {
    http_client: HttpClient,
    base_url: String,
}

impl CoinGeckoVersion {
    pub fn new() -> Result<Self> {
        Self::with_base_url(COINGECKO.base_url.to_string())
    }

    pub fn with_base_url(base_url: String) -> Result<Self> {
        let http_client = HttpClient::builder()
            .timeout(Duration::from_millis(COINGECKO.timeout_ms))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build CoinGecko HTTP client")?;
        Ok(Self {
            http_client,
            base_url,
        })
    }

    fn market_chart_url(&self, coin_id: &str) -> String {
        format!("{}/coins/{}/market_chart", self.base_url, coin_id)
    }
}

#[async_trait]
impl CreatePriceSeries for CoinGeckoVersion {
    fn signature(&self) -> &'static str {
        SIGNATURE
    }

    async fn create_price_series(&self, request: &SeriesRequest) -> Result<PriceSeries> {
        let start_time = Instant::now();
        let response = self
            .http_client
            .get(self.market_chart_url(&request.coin_id))
            .query(&[
                ("vs_currency", COINGECKO.vs_currency),
                ("days", COINGECKO.days),
                ("interval", COINGECKO.interval),
            ])
            .send()
            .await
            .context(format!("CoinGecko request failed for {}", request.coin_id))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read CoinGecko response body")?;
        if !status.is_success() {
            return Err(PriceFetchError::HttpStatus {
                provider: SIGNATURE,
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let series = parse_market_chart(&body, &request.coin_id, request.interval_ms, request.limit)?;
        log::info!(
            "CoinGecko: {} samples for {} in {:?}",
            series.len(),
            request.coin_id,
            start_time.elapsed()
        );
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::TimeUtils;

    const BODY: &str = r#"{
        "prices": [
            [1704067200000, 42280.23],
            [1704070800000, 42400.5],
            [1704074400000.0, 42350.0],
            [1704078000000, null],
            [1704081600000, 42500.75]
        ],
        "market_caps": [],
        "total_volumes": []
    }"#;

    #[test]
    fn chronological_body_becomes_newest_first() {
        let series = parse_market_chart(BODY, "bitcoin", TimeUtils::MS_IN_H, 1_800).unwrap();

        // The null price entry is rejected, the float timestamp is accepted
        assert_eq!(series.len(), 4);
        assert_eq!(series.asset, "bitcoin");
        assert_eq!(series.newest().unwrap().timestamp_ms, 1_704_081_600_000);
        assert_eq!(series.newest().unwrap().price, 42_500.75);
        assert_eq!(series.oldest().unwrap().price, 42_280.23);
        assert_eq!(series.samples()[1].timestamp_ms, 1_704_074_400_000);
    }

    #[test]
    fn limit_keeps_the_most_recent_samples() {
        let series = parse_market_chart(BODY, "bitcoin", TimeUtils::MS_IN_H, 2).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.newest().unwrap().price, 42_500.75);
        assert_eq!(series.oldest().unwrap().price, 42_350.0);
    }

    #[test]
    fn body_without_prices_is_an_error() {
        assert!(parse_market_chart(r#"{"error":"coin not found"}"#, "nope", TimeUtils::MS_IN_H, 10).is_err());
    }

    #[test]
    fn url_is_built_from_coin_id() {
        let provider = CoinGeckoVersion::with_base_url("http://localhost:9".to_string()).unwrap();
        assert_eq!(
            provider.market_chart_url("ethereum"),
            "http://localhost:9/coins/ethereum/market_chart"
        );
    }
}
