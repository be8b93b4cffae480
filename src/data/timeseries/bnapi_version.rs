pub mod bn_kline;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use tokio::time::Instant;

use crate::data::timeseries::{CreatePriceSeries, SeriesRequest};
use crate::domain::sample::RawSample;
use crate::models::PriceSeries;
#[cfg(debug_assertions)]
use crate::utils::time_utils;

pub const SIGNATURE: &str = "Binance API";

pub struct BNAPIVersion;

#[async_trait]
impl CreatePriceSeries for BNAPIVersion {
    fn signature(&self) -> &'static str {
        SIGNATURE
    }

    async fn create_price_series(&self, request: &SeriesRequest) -> Result<PriceSeries> {
        // Without a symbol there is no way to know which market matches the coin
        let symbol = request
            .symbol
            .as_deref()
            .ok_or_else(|| anyhow!("no Binance symbol known for {}", request.coin_id))?;
        let start_time = Instant::now();

        let klines = bn_kline::load_klines(symbol, request.interval_ms, request.limit).await?;
        // Sample timestamp is the kline open time, price is its close
        let raw = klines.iter().map(RawSample::from);
        let (series, _rejected) =
            PriceSeries::from_raw_chronological(&request.coin_id, request.interval_ms, raw);

        #[cfg(debug_assertions)]
        if let (Some(newest), Some(oldest)) = (series.newest(), series.oldest()) {
            log::info!(
                "{} (from {} to {}) with {} klines",
                symbol,
                time_utils::epoch_ms_to_utc(oldest.timestamp_ms),
                time_utils::epoch_ms_to_utc(newest.timestamp_ms),
                series.len(),
            );
        }

        log::info!("Binance klines loaded in: {:?}", start_time.elapsed());
        Ok(series)
    }
}
