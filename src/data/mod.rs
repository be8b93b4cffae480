// Price data loading and caching
pub mod pre_main_async;
pub mod timeseries;

// Re-export commonly used types
pub use pre_main_async::fetch_price_series;
pub use timeseries::serde_version::write_price_series_async;
pub use timeseries::{CreatePriceSeries, PriceFetchError, SeriesRequest, get_price_series_async};
