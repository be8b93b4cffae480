// Std library crates
use std::collections::HashSet;
use std::convert::TryFrom;
use std::error::Error;
use std::fmt;

// External crates
use anyhow::{Result, bail};
use binance_sdk::common::models::Interval as binance_interval;
use binance_sdk::config::ConfigurationRestApi;
use binance_sdk::models::RestApiRateLimit;
use binance_sdk::spot::{
    SpotRestApi,
    rest_api::{KlinesIntervalEnum, KlinesItemInner, KlinesParams, RestApi},
};
use binance_sdk::{errors, errors::ConnectorError as connection_error};
use chrono::Utc;
use tokio::time::{Duration, sleep};

// Local crates
use crate::config::binance::{BINANCE, BinanceApiConfig};
#[cfg(debug_assertions)]
use crate::config::DEBUG_FLAGS;
use crate::domain::sample::RawSample;
use crate::utils::TimeUtils;

pub fn try_interval_from_ms(ms: i64) -> Result<KlinesIntervalEnum, String> {
    match ms {
        TimeUtils::MS_IN_S => Ok(KlinesIntervalEnum::Interval1s),
        TimeUtils::MS_IN_MIN => Ok(KlinesIntervalEnum::Interval1m),
        TimeUtils::MS_IN_5_MIN => Ok(KlinesIntervalEnum::Interval5m),
        TimeUtils::MS_IN_15_MIN => Ok(KlinesIntervalEnum::Interval15m),
        TimeUtils::MS_IN_30_MIN => Ok(KlinesIntervalEnum::Interval30m),
        TimeUtils::MS_IN_H => Ok(KlinesIntervalEnum::Interval1h),
        TimeUtils::MS_IN_4_H => Ok(KlinesIntervalEnum::Interval4h),
        TimeUtils::MS_IN_D => Ok(KlinesIntervalEnum::Interval1d),
        TimeUtils::MS_IN_W => Ok(KlinesIntervalEnum::Interval1w),
        _ => Err(format!("Unsupported interval: {}ms", ms)),
    }
}

/// The two kline fields a price sample needs.
#[derive(Debug, Clone, PartialEq)]
pub struct BNKline {
    pub open_timestamp_ms: i64,
    pub close_price: Option<f64>,
}

impl From<&BNKline> for RawSample {
    fn from(kline: &BNKline) -> Self {
        RawSample {
            timestamp_ms: Some(kline.open_timestamp_ms),
            price: kline.close_price,
        }
    }
}

#[derive(Debug)]
pub enum BNKlineError {
    InvalidLength,
    InvalidType(String),
    ConnectionFailed(String),
}

impl fmt::Display for BNKlineError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            BNKlineError::InvalidLength => write!(f, "Invalid length"),
            BNKlineError::InvalidType(string) => write!(f, "Invalid type: {}", string),
            BNKlineError::ConnectionFailed(msg) => {
                write!(f, "Binance API connection failed: {}.", msg)
            }
        }
    }
}

impl Error for BNKlineError {}

// Binance sends prices as decimal strings; anything else counts as missing
fn kline_item_to_float(item: Option<KlinesItemInner>) -> Option<f64> {
    item.and_then(|inner| match inner {
        KlinesItemInner::String(s) => s.parse::<f64>().ok(),
        _ => None,
    })
}

// Kline layout: [open_time, open, high, low, close, volume, close_time, ...]
impl TryFrom<Vec<KlinesItemInner>> for BNKline {
    type Error = BNKlineError;

    fn try_from(vec_inner_klines: Vec<KlinesItemInner>) -> Result<Self, Self::Error> {
        let mut items = vec_inner_klines.into_iter();
        let open_timestamp_ms = match items.next().ok_or(BNKlineError::InvalidLength)? {
            KlinesItemInner::Integer(a) => a,
            _ => return Err(BNKlineError::InvalidType("open_time".to_string())),
        };
        // Skip open, high, low
        let mut items = items.skip(3);
        let close_price = kline_item_to_float(items.next());

        Ok(BNKline {
            open_timestamp_ms,
            close_price,
        })
    }
}

fn convert_klines(data: Vec<Vec<KlinesItemInner>>) -> Result<Vec<BNKline>, BNKlineError> {
    data.into_iter().map(Vec::try_into).collect()
}

async fn configure_binance_client() -> Result<RestApi, anyhow::Error> {
    let config = BinanceApiConfig::default();
    let rest_conf = ConfigurationRestApi::builder()
        .timeout(config.timeout_ms)
        .retries(config.retries)
        .backoff(config.backoff_ms)
        .build()?;
    Ok(SpotRestApi::production(rest_conf))
}

fn secs_until_next_minute(now_secs: i64) -> u64 {
    let secs_into_min = now_secs.rem_euclid(60) as u64;
    if secs_into_min == 0 { 60 } else { 60 - secs_into_min }
}

async fn handle_rate_limits(
    rate_limits: &Option<Vec<RestApiRateLimit>>,
    symbol: &str,
    kline_call_weight: u32,
    bn_weight_limit_minute: u32,
) -> Result<(), anyhow::Error> {
    if let Some(value) = rate_limits {
        for rate_limit in value {
            if rate_limit.interval_num == 1 && rate_limit.interval == binance_interval::Minute {
                let current_weight = rate_limit.count;
                let required_headroom = bn_weight_limit_minute.saturating_sub(kline_call_weight);
                if current_weight > required_headroom {
                    let sleep_duration =
                        Duration::from_secs(secs_until_next_minute(Utc::now().timestamp()));
                    log::warn!(
                        "{} Binance minute weight {} over headroom {}, sleeping {:?}",
                        symbol,
                        current_weight,
                        required_headroom,
                        sleep_duration
                    );
                    sleep(sleep_duration).await;
                }
            }
        }
    }
    Ok(())
}

/// Prepend one page of klines (oldest first) to `all_klines`.
/// Returns the `end_time` for the next page and whether paging is finished.
fn process_new_klines(
    new_klines: Vec<BNKline>,
    page_limit: usize,
    all_klines: &mut Vec<BNKline>,
    wanted: usize,
) -> (Option<i64>, bool) {
    let mut bn_klines = new_klines;
    let Some(first) = bn_klines.first() else {
        return (None, true);
    };
    let short_page = bn_klines.len() < page_limit;
    let end_time = Some(first.open_timestamp_ms);

    // end_time is inclusive, so the page repeats the kline we already hold
    let overlaps = match (bn_klines.last(), all_klines.first()) {
        (Some(last_new), Some(first_held)) => last_new.open_timestamp_ms == first_held.open_timestamp_ms,
        _ => false,
    };
    if overlaps {
        bn_klines.pop();
    }
    let no_progress = bn_klines.is_empty();

    all_klines.splice(0..0, bn_klines);
    (end_time, short_page || no_progress || all_klines.len() >= wanted)
}

async fn fetch_binance_klines_with_limits(
    rest_client: &RestApi,
    params: KlinesParams,
    symbol: &str,
) -> Result<(Option<Vec<RestApiRateLimit>>, Vec<Vec<KlinesItemInner>>), anyhow::Error> {
    let response_result = rest_client.klines(params).await;

    match response_result {
        Ok(r) => {
            let rate_limits = r.rate_limits.clone();
            let data = r.data().await?;
            Ok((rate_limits, data))
        }
        Err(e) => {
            if let Some(conn_err) = e.downcast_ref::<errors::ConnectorError>() {
                match conn_err {
                    connection_error::ConnectorClientError(msg) => {
                        log::error!("{} Client error: Check your request parameters. {}", symbol, msg);
                    }
                    connection_error::TooManyRequestsError(msg) => {
                        log::error!("{} Rate limit exceeded. Please wait and try again. {}", symbol, msg);
                    }
                    connection_error::RateLimitBanError(msg) => {
                        log::error!("{} IP address banned due to excessive rate limits. {}", symbol, msg);
                    }
                    errors::ConnectorError::ServerError { msg, status_code } => {
                        log::error!("{} Server error: {} (status code: {:?})", symbol, msg, status_code);
                    }
                    errors::ConnectorError::NetworkError(msg) => {
                        log::error!("{} Network error: Check your internet connection. {}", symbol, msg);
                    }
                    errors::ConnectorError::NotFoundError(msg) => {
                        log::error!("{} Resource not found. {}", symbol, msg);
                    }
                    connection_error::BadRequestError(msg) => {
                        log::error!("{} Bad request: Verify your input parameters. {}", symbol, msg);
                    }
                    other => {
                        log::error!("Unexpected ConnectionError variant: {:?}", other);
                    }
                }
                Err(
                    anyhow::Error::new(BNKlineError::ConnectionFailed(conn_err.to_string()))
                        .context(format!("Binance API call failed for {}", symbol)),
                )
            } else {
                log::error!("An unexpected error occurred for {}: {:#}", symbol, e);
                Err(anyhow::Error::new(BNKlineError::ConnectionFailed(e.to_string()))
                    .context(format!("Unexpected error during API call for {}", symbol)))
            }
        }
    }
}

/// Page backwards from now until `limit` klines are held or history runs out.
/// Klines come back oldest first.
pub async fn load_klines(
    symbol: &str,
    interval_ms: i64,
    limit: usize,
) -> Result<Vec<BNKline>, anyhow::Error> {
    let rest_client = configure_binance_client().await?;

    let page_limit = BINANCE.limits.klines_limit;
    let mut end_time: Option<i64> = None;
    const START_TIME: Option<i64> = None;
    let mut all_klines: Vec<BNKline> = Vec::new();
    #[cfg(debug_assertions)]
    let mut loop_count: u32 = 0;

    loop {
        let params = KlinesParams::builder(
            symbol.to_string(),
            try_interval_from_ms(interval_ms).map_err(anyhow::Error::msg)?,
        )
            .limit(page_limit)
            .end_time(end_time)
            .start_time(START_TIME)
            .build()?;

        let (rate_limits, new_klines) =
            fetch_binance_klines_with_limits(&rest_client, params, symbol).await?;

        handle_rate_limits(
            &rate_limits,
            symbol,
            BINANCE.limits.kline_call_weight,
            BINANCE.limits.weight_limit_minute,
        )
        .await?;

        let page = convert_klines(new_klines).map_err(|e| {
            anyhow::Error::new(e).context(format!("{} convert_klines failed", symbol))
        })?;
        let (new_end_time, finished) =
            process_new_klines(page, page_limit as usize, &mut all_klines, limit);
        end_time = new_end_time;

        #[cfg(debug_assertions)]
        {
            loop_count += 1;
            if DEBUG_FLAGS.print_kline_pages && loop_count.is_multiple_of(BINANCE.debug_print_interval) {
                log::info!("{}: {} klines after {} pages", symbol, all_klines.len(), loop_count);
            }
        }

        if finished {
            break;
        }
    }

    if has_duplicate_kline_open_time(&all_klines) {
        bail!("{}: duplicate kline open times after paging", symbol);
    }

    // Keep only the most recent `limit`
    let excess = all_klines.len().saturating_sub(limit);
    all_klines.drain(..excess);
    Ok(all_klines)
}

fn has_duplicate_kline_open_time(klines: &[BNKline]) -> bool {
    let mut seen_ids = HashSet::new();
    klines.iter().any(|kline| !seen_ids.insert(kline.open_timestamp_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kline(ts: i64) -> BNKline {
        BNKline {
            open_timestamp_ms: ts,
            close_price: Some(ts as f64),
        }
    }

    fn page(range: std::ops::Range<i64>) -> Vec<BNKline> {
        range.map(kline).collect()
    }

    #[test]
    fn kline_row_yields_open_time_and_close() {
        let row = vec![
            KlinesItemInner::Integer(1_704_067_200_000),
            KlinesItemInner::String("42000.00".to_string()),
            KlinesItemInner::String("42500.00".to_string()),
            KlinesItemInner::String("41900.00".to_string()),
            KlinesItemInner::String("42280.23".to_string()),
            KlinesItemInner::String("12.5".to_string()),
        ];
        let parsed = BNKline::try_from(row).unwrap();
        assert_eq!(parsed.open_timestamp_ms, 1_704_067_200_000);
        assert_eq!(parsed.close_price, Some(42_280.23));
    }

    #[test]
    fn kline_row_without_open_time_is_rejected() {
        assert!(BNKline::try_from(Vec::new()).is_err());
        let row = vec![KlinesItemInner::String("oops".to_string())];
        assert!(BNKline::try_from(row).is_err());
    }

    #[test]
    fn pages_are_prepended_without_the_overlapping_kline() {
        let mut all = Vec::new();
        let (end, done) = process_new_klines(page(10..15), 5, &mut all, 100);
        assert_eq!(end, Some(10));
        assert!(!done);

        // Next page ends on the kline we already hold
        let (end, done) = process_new_klines(page(6..11), 5, &mut all, 100);
        assert_eq!(end, Some(6));
        assert!(!done);
        let times: Vec<i64> = all.iter().map(|k| k.open_timestamp_ms).collect();
        assert_eq!(times, (6..15).collect::<Vec<_>>());
        assert!(!has_duplicate_kline_open_time(&all));
    }

    #[test]
    fn paging_stops_on_short_page_or_enough_klines() {
        let mut all = Vec::new();
        let (_, done) = process_new_klines(page(0..3), 5, &mut all, 100);
        assert!(done, "short page means history is exhausted");

        let mut all = Vec::new();
        let (_, done) = process_new_klines(page(0..5), 5, &mut all, 4);
        assert!(done, "limit reached");
    }

    #[test]
    fn single_overlapping_kline_ends_paging() {
        let mut all = page(5..10);
        let (_, done) = process_new_klines(page(5..6), 1, &mut all, 100);
        assert!(done);
        assert_eq!(all.len(), 5);
    }

    #[test]
    fn minute_boundary_wait() {
        assert_eq!(secs_until_next_minute(120), 60);
        assert_eq!(secs_until_next_minute(125), 55);
        assert_eq!(secs_until_next_minute(179), 1);
    }

    #[test]
    fn hourly_interval_is_supported() {
        assert!(matches!(
            try_interval_from_ms(TimeUtils::MS_IN_H),
            Ok(KlinesIntervalEnum::Interval1h)
        ));
        assert!(try_interval_from_ms(7).is_err());
    }
}
