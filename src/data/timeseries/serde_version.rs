#[cfg(debug_assertions)]
use crate::config::DEBUG_FLAGS;
use crate::config::PERSISTENCE;
use crate::utils::time_utils::how_many_seconds_ago;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use std::path::Path;

use crate::data::timeseries::{CreatePriceSeries, SeriesRequest, cache_file::CacheFile};
use crate::models::PriceSeries;

pub const SIGNATURE: &str = "Local Cache";

/// Checks the cache file at the default path for `request`.
pub fn check_local_data_validity(
    request: &SeriesRequest,
    recency_required_secs: i64,
    version_required: f64,
) -> Result<()> {
    let full_path = CacheFile::default_cache_path(&request.coin_id, request.interval_ms);
    check_cache_file_validity(&full_path, request, recency_required_secs, version_required)
}

pub fn check_cache_file_validity(
    full_path: &Path,
    request: &SeriesRequest,
    recency_required_secs: i64,
    version_required: f64,
) -> Result<()> {
    #[cfg(debug_assertions)]
    if DEBUG_FLAGS.print_serde {
        log::info!("Checking validity of local cache at {:?}...", full_path);
    }
    let cache = CacheFile::load_from_path(full_path)?;

    // Check version
    if cache.version != version_required {
        bail!(
            "Cache version mismatch: file v{} vs required v{}",
            cache.version,
            version_required
        );
    }

    // Check interval matches
    if cache.interval_ms != request.interval_ms {
        bail!(
            "Cache interval mismatch: file has {}ms intervals, expected {}ms",
            cache.interval_ms,
            request.interval_ms
        );
    }

    if !cache.data.asset.eq_ignore_ascii_case(&request.coin_id) {
        bail!(
            "Cache asset mismatch: file holds {}, expected {}",
            cache.data.asset,
            request.coin_id
        );
    }

    if cache.data.is_empty() {
        bail!("Cache holds no samples");
    }

    // A cache written with a smaller limit would silently shrink every larger window
    if !cache.covers_limit(request.limit) {
        bail!(
            "Cache too short: {} samples fetched with limit {}, {} requested",
            cache.data.len(),
            cache.limit,
            request.limit
        );
    }

    // Check recency
    let seconds_ago = how_many_seconds_ago(cache.timestamp_ms);
    if seconds_ago > recency_required_secs {
        bail!(
            "Cache too old: created {} seconds ago (limit: {} seconds)",
            seconds_ago,
            recency_required_secs
        );
    }

    #[cfg(debug_assertions)]
    if DEBUG_FLAGS.print_serde {
        log::info!(
            "✅ Cache valid: v{}, {}s old (limit {}s), {} samples",
            cache.version,
            seconds_ago,
            recency_required_secs,
            cache.data.len()
        );
    }

    Ok(())
}

/// Write a price series, fetched with sample limit `limit`, to the binary cache file.
/// Data that came from the cache in the first place is not written back.
pub fn write_price_series_locally(
    price_series_signature: &'static str,
    price_series: &PriceSeries,
    limit: usize,
) -> Result<()> {
    if price_series_signature == SIGNATURE {
        #[cfg(debug_assertions)]
        if DEBUG_FLAGS.print_serde {
            log::info!("Skipping cache write (data came from the cache)");
        }
        return Ok(());
    }

    let full_path = CacheFile::default_cache_path(&price_series.asset, price_series.interval_ms);

    #[cfg(debug_assertions)]
    let start_time = DEBUG_FLAGS.print_serde.then(|| {
        log::info!("Writing cache to disk: {:?}...", full_path);
        std::time::Instant::now()
    });

    let cache = CacheFile::new(price_series.clone(), PERSISTENCE.price_cache.version, limit);
    cache.save_to_path(&full_path)?;

    #[cfg(debug_assertions)]
    if let Some(start) = start_time {
        log::info!(
            "✅ Cache written: {} samples from {} in {:.2}s",
            price_series.len(),
            price_series_signature,
            start.elapsed().as_secs_f64()
        );
    }

    Ok(())
}

/// Async wrapper for write_price_series_locally
/// Spawns a blocking task so the runtime keeps serving other work
pub async fn write_price_series_async(
    price_series_signature: &'static str,
    price_series: PriceSeries,
    limit: usize,
) -> Result<()> {
    tokio::task::spawn_blocking(move || {
        write_price_series_locally(price_series_signature, &price_series, limit)
    })
    .await
    .context("Cache write task panicked")?
}

pub struct SerdeVersion;

#[async_trait]
impl CreatePriceSeries for SerdeVersion {
    fn signature(&self) -> &'static str {
        SIGNATURE
    }

    async fn create_price_series(&self, request: &SeriesRequest) -> Result<PriceSeries> {
        let full_path = CacheFile::default_cache_path(&request.coin_id, request.interval_ms);

        #[cfg(debug_assertions)]
        let start_time = DEBUG_FLAGS.print_serde.then(|| {
            log::info!("Reading cache from: {:?}...", full_path);
            std::time::Instant::now()
        });

        let cache = tokio::task::spawn_blocking(move || CacheFile::load_from_path(&full_path))
            .await
            .context("Deserialization task panicked")?
            .context("Failed to load cache file")?;

        #[cfg(debug_assertions)]
        if let Some(start) = start_time {
            log::info!(
                "✅ Cache loaded: {} samples in {:.2}s",
                cache.data.len(),
                start.elapsed().as_secs_f64()
            );
        }

        Ok(cache.data)
    }
}
