// Async code to run in main before the analysis starts

use anyhow::Result;

use crate::Cli;
use crate::config::PERSISTENCE;
#[cfg(debug_assertions)]
use crate::config::DEBUG_FLAGS;
use crate::data::timeseries::bnapi_version::BNAPIVersion;
use crate::data::timeseries::coingecko_version::CoinGeckoVersion;
use crate::data::timeseries::serde_version::{SerdeVersion, check_local_data_validity};
use crate::data::timeseries::{CreatePriceSeries, SeriesRequest, get_price_series_async};
use crate::models::PriceSeries;

/// Provider order. A valid cache is tried first unless the API is preferred,
/// in which case it is the last resort. An invalid cache is never tried.
/// Binance is only asked when the request names a symbol for the coin.
pub fn build_providers(
    request: &SeriesRequest,
    prefer_api: bool,
    cache_validity: Result<()>,
) -> Result<Vec<Box<dyn CreatePriceSeries>>> {
    let mut providers: Vec<Box<dyn CreatePriceSeries>> = vec![Box::new(CoinGeckoVersion::new()?)];
    if request.symbol.is_some() {
        providers.push(Box::new(BNAPIVersion));
    } else {
        log::info!("No Binance symbol for {}, CoinGecko only", request.coin_id);
    }
    match (prefer_api, cache_validity) {
        (false, Ok(_)) => providers.insert(0, Box::new(SerdeVersion)), // local first
        (true, Ok(_)) => providers.push(Box::new(SerdeVersion)),       // API first
        (_, Err(e)) => {
            log::warn!("⚠️  Local cache validation failed: {:#}", e);
            log::warn!("⚠️  Falling back to network providers...");
        }
    }
    Ok(providers)
}

pub async fn fetch_price_series(args: &Cli) -> Result<(PriceSeries, &'static str)> {
    let request = args.series_request();
    let cache_validity = check_local_data_validity(
        &request,
        PERSISTENCE.price_cache.acceptable_age_sec,
        PERSISTENCE.price_cache.version,
    );
    let providers = build_providers(&request, args.prefer_api, cache_validity)?;

    let (mut price_series, price_series_signature) =
        get_price_series_async(&providers, &request).await?;
    // A cache written with a larger limit can hold more than asked for
    price_series.truncate(request.limit);

    #[cfg(debug_assertions)]
    if DEBUG_FLAGS.print_serde {
        log::info!(
            "Successfully retrieved {} samples using: {}.",
            price_series.len(),
            price_series_signature
        );
    }
    Ok((price_series, price_series_signature))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    fn signatures(providers: &[Box<dyn CreatePriceSeries>]) -> Vec<&'static str> {
        providers.iter().map(|p| p.signature()).collect()
    }

    #[test]
    fn valid_cache_goes_first_by_default() {
        let providers = build_providers(&SeriesRequest::default(), false, Ok(())).unwrap();
        assert_eq!(
            signatures(&providers),
            vec!["Local Cache", "CoinGecko API", "Binance API"]
        );
    }

    #[test]
    fn prefer_api_moves_cache_last() {
        let providers = build_providers(&SeriesRequest::default(), true, Ok(())).unwrap();
        assert_eq!(
            signatures(&providers),
            vec!["CoinGecko API", "Binance API", "Local Cache"]
        );
    }

    #[test]
    fn invalid_cache_is_skipped() {
        for prefer_api in [false, true] {
            let providers = build_providers(&SeriesRequest::default(), prefer_api, Err(anyhow!("too old"))).unwrap();
            assert_eq!(signatures(&providers), vec!["CoinGecko API", "Binance API"]);
        }
    }

    #[test]
    fn coin_without_symbol_never_reaches_binance() {
        let request = SeriesRequest {
            coin_id: "ethereum".to_string(),
            symbol: None,
            ..SeriesRequest::default()
        };
        let providers = build_providers(&request, false, Ok(())).unwrap();
        assert_eq!(signatures(&providers), vec!["Local Cache", "CoinGecko API"]);
        let providers = build_providers(&request, true, Err(anyhow!("missing"))).unwrap();
        assert_eq!(signatures(&providers), vec!["CoinGecko API"]);
    }
}
