use std::io::IsTerminal;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::runtime::Runtime;

use weekday_dca::data::timeseries::serde_version;
use weekday_dca::utils::time_utils::epoch_ms_to_local;
use weekday_dca::report::{TableStyle, render_json, render_table};
use weekday_dca::{Cli, WeekdayEngine, fetch_price_series, write_price_series_async};

fn main() -> Result<()> {
    // A. Init Logging
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    // B. Parse Args
    let args = Cli::parse();
    #[cfg(debug_assertions)]
    log::info!("Parsed arguments: {:?}", args);

    // C. Data Loading (Blocking)
    let rt = Runtime::new().context("Failed to create Tokio runtime")?;
    let (price_series, price_series_signature) = rt
        .block_on(fetch_price_series(&args))
        .context("Failed to retrieve price data")?;

    if let (Some(newest), Some(oldest)) = (price_series.newest(), price_series.oldest()) {
        log::info!(
            "{} {} samples from {}: {} to {}",
            price_series.len(),
            price_series.asset,
            price_series_signature,
            epoch_ms_to_local(oldest.timestamp_ms),
            epoch_ms_to_local(newest.timestamp_ms)
        );
    }

    // D. Background Cache Write
    let cache_write = (price_series_signature != serde_version::SIGNATURE).then(|| {
        let cache_data = price_series.clone();
        let limit = args.limit;
        rt.spawn(async move {
            if let Err(e) = write_price_series_async(price_series_signature, cache_data, limit).await
            {
                log::error!("⚠️  Failed to write cache: {}", e);
            }
        })
    });

    // E. Analyse and print
    let engine = WeekdayEngine::new(args.window_specs());
    let outcomes = engine.run(&price_series);
    if args.json {
        println!("{}", render_json(&price_series, &outcomes)?);
    } else {
        let style = TableStyle {
            color: std::io::stdout().is_terminal(),
        };
        println!("{}", render_table(&outcomes, &style));
    }

    if let Some(handle) = cache_write {
        if let Err(e) = rt.block_on(handle) {
            log::error!("⚠️  Cache write task failed: {}", e);
        }
    }
    Ok(())
}
