use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::{PERSISTENCE, price_cache_filename};
use crate::models::PriceSeries;

/// Serialized price cache: one series plus the metadata needed to judge it.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CacheFile {
    pub version: f64,
    pub timestamp_ms: i64,
    pub interval_ms: i64,
    /// Sample limit the series was fetched with. A series shorter than this
    /// holds all the history there was.
    pub limit: usize,
    pub data: PriceSeries,
}

impl CacheFile {
    pub fn new(data: PriceSeries, version: f64, limit: usize) -> Self {
        Self {
            version,
            timestamp_ms: Utc::now().timestamp_millis(),
            interval_ms: data.interval_ms,
            limit,
            data,
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).context(format!("Failed to open cache file: {:?}", path))?;
        let mut reader = BufReader::new(file);
        let cache = bincode::deserialize_from(&mut reader)
            .context(format!("Failed to deserialize cache: {:?}", path))?;
        Ok(cache)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .context(format!("Failed to create directory: {}", parent.display()))?;
        }
        let file =
            File::create(path).context(format!("Failed to create file: {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        bincode::serialize_into(&mut writer, self)
            .context(format!("Failed to serialize cache to: {}", path.display()))
    }

    /// Whether this cache can answer a request for `limit` samples.
    pub fn covers_limit(&self, limit: usize) -> bool {
        self.data.len() >= limit || self.limit >= limit
    }

    pub fn default_cache_path(asset: &str, interval_ms: i64) -> PathBuf {
        PathBuf::from(PERSISTENCE.price_cache.directory)
            .join(price_cache_filename(asset, interval_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Sample;
    use crate::utils::TimeUtils;

    #[test]
    fn save_then_load_keeps_series_and_metadata() {
        let series = PriceSeries::from_most_recent_first(
            "bitcoin",
            TimeUtils::MS_IN_H,
            vec![Sample::new(7_200_000, 101.5), Sample::new(3_600_000, 99.25)],
        );
        let cache = CacheFile::new(series.clone(), 1.0, 1_800);

        let path = std::env::temp_dir()
            .join(format!("weekday_dca_cache_{}", std::process::id()))
            .join("prices.bin");
        cache.save_to_path(&path).unwrap();
        let loaded = CacheFile::load_from_path(&path).unwrap();
        let _ = std::fs::remove_dir_all(path.parent().unwrap());

        assert_eq!(loaded.data, series);
        assert_eq!(loaded.interval_ms, TimeUtils::MS_IN_H);
        assert_eq!(loaded.version, 1.0);
        assert_eq!(loaded.limit, 1_800);
        assert_eq!(loaded.timestamp_ms, cache.timestamp_ms);
    }

    #[test]
    fn missing_file_is_an_error() {
        let path = std::env::temp_dir().join("weekday_dca_no_such_cache.bin");
        assert!(CacheFile::load_from_path(&path).is_err());
    }

    #[test]
    fn default_path_lives_in_cache_directory() {
        let path = CacheFile::default_cache_path("bitcoin", TimeUtils::MS_IN_H);
        assert_eq!(path, PathBuf::from("price_data").join("prices_bitcoin_1h_v2.bin"));
    }
}
