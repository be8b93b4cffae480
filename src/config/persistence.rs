//! File persistence and serialization configuration

use crate::utils::TimeUtils;

/// Settings for the local price cache
pub struct PriceCacheConfig {
    /// Directory path for storing fetched price series
    pub directory: &'static str,
    /// Base filename for cache files (without extension)
    pub filename_prefix: &'static str,
    /// Current version of the cache serialization format
    pub version: f64,
    /// Maximum age of a cache file before the providers are asked again (seconds)
    pub acceptable_age_sec: i64,
}

pub struct PersistenceConfig {
    pub price_cache: PriceCacheConfig,
}

pub const PERSISTENCE: PersistenceConfig = PersistenceConfig {
    price_cache: PriceCacheConfig {
        directory: "price_data",
        filename_prefix: "prices",
        version: 2.0,
        // 1 hour, one fresh sample per hourly series
        acceptable_age_sec: 3_600,
    },
};

/// Generate asset and interval specific cache filename
/// Example: "prices_bitcoin_1h_v2.bin"
pub fn price_cache_filename(asset: &str, interval_ms: i64) -> String {
    let interval_str = TimeUtils::interval_to_string(interval_ms);
    format!(
        "{}_{}_{}_v{}.bin",
        PERSISTENCE.price_cache.filename_prefix,
        asset.to_lowercase(),
        interval_str,
        PERSISTENCE.price_cache.version
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_filename_includes_asset_and_interval() {
        assert_eq!(
            price_cache_filename("Bitcoin", TimeUtils::MS_IN_H),
            "prices_bitcoin_1h_v2.bin"
        );
    }
}
