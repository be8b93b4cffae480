//! Binance-specific configuration constants and types.

/// Configuration for Binance REST API client
/// (This is the runtime struct used by the klines fetcher)
pub struct BinanceApiConfig {
    pub timeout_ms: u64,
    pub retries: u32,
    pub backoff_ms: u64,
}

impl Default for BinanceApiConfig {
    fn default() -> Self {
        Self {
            timeout_ms: BINANCE.client.timeout_ms,
            retries: BINANCE.client.retries,
            backoff_ms: BINANCE.client.backoff_ms,
        }
    }
}

/// Configuration for REST API Limits and Weights
pub struct RestLimits {
    /// Number of klines requested per page (Binance maximum is 1000)
    pub klines_limit: i32,
    /// Weight limit per minute as specified in Binance FAQ
    pub weight_limit_minute: u32,
    /// Weight cost for a single kline API call
    pub kline_call_weight: u32,
}

/// Default values for the Rest Client
pub struct ClientDefaults {
    pub timeout_ms: u64,
    pub retries: u32,
    pub backoff_ms: u64,
}

/// The Master Configuration Struct
pub struct BinanceConfig {
    pub limits: RestLimits,
    pub client: ClientDefaults,
    /// Spot symbol used when none is given on the command line
    pub default_symbol: &'static str,
    /// Interval (in pages) between rate-limit debug prints
    pub debug_print_interval: u32,
}

pub const BINANCE: BinanceConfig = BinanceConfig {
    limits: RestLimits {
        klines_limit: 1000,
        weight_limit_minute: 6000,
        kline_call_weight: 2,
    },
    client: ClientDefaults {
        timeout_ms: 5000,
        retries: 5,
        backoff_ms: 5000,
    },
    default_symbol: "BTCUSDT",
    debug_print_interval: 10,
};
