use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use weekday_dca::config::{ANALYSIS, COINGECKO, PERSISTENCE};
use weekday_dca::data::timeseries::cache_file::CacheFile;
use weekday_dca::data::timeseries::coingecko_version::parse_market_chart;
use weekday_dca::parse_coin_id;

/// Load a saved CoinGecko market_chart response into the local price cache
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the JSON body of a market_chart request
    input: PathBuf,

    /// Coin id the data belongs to
    #[arg(long, default_value = COINGECKO.default_coin_id, value_parser = parse_coin_id)]
    coin: String,

    /// Maximum number of samples to keep, newest first
    #[arg(long, default_value_t = ANALYSIS.series.default_limit)]
    limit: usize,
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
    import_prices(&Args::parse())
}

fn import_prices(args: &Args) -> Result<()> {
    let body = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {:?}", args.input))?;
    let series = parse_market_chart(&body, &args.coin, ANALYSIS.series.interval_ms, args.limit)?;
    if series.is_empty() {
        anyhow::bail!("{:?} holds no usable samples", args.input);
    }

    let output_path = CacheFile::default_cache_path(&series.asset, series.interval_ms);
    let cache = CacheFile::new(series, PERSISTENCE.price_cache.version, args.limit);
    cache.save_to_path(&output_path)?;

    println!(
        "✅ Cache written to {:?} with {} samples.",
        output_path,
        cache.data.len()
    );
    Ok(())
}
