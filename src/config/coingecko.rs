//! CoinGecko market chart endpoint configuration.

pub struct CoinGeckoConfig {
    pub base_url: &'static str,
    /// Coin id used when none is given on the command line
    pub default_coin_id: &'static str,
    pub vs_currency: &'static str,
    /// `max` asks for the full history, the series limit trims it afterwards
    pub days: &'static str,
    pub interval: &'static str,
    pub timeout_ms: u64,
}

pub const COINGECKO: CoinGeckoConfig = CoinGeckoConfig {
    base_url: "https://api.coingecko.com/api/v3",
    default_coin_id: "bitcoin",
    vs_currency: "usd",
    days: "max",
    interval: "hourly",
    timeout_ms: 20_000,
};
