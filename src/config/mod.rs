//! Configuration module for the weekday DCA application.

pub mod analysis;
pub mod binance;
pub mod coingecko;

mod debug; // Private: files use crate::config::DEBUG_FLAGS, not crate::config::debug::DEBUG_FLAGS
pub use debug::DEBUG_FLAGS;

pub mod persistence;

// Re-export commonly used items
pub use analysis::{ANALYSIS, AnalysisConfig};
pub use binance::BINANCE;
pub use coingecko::COINGECKO;
pub use persistence::{PERSISTENCE, price_cache_filename};
