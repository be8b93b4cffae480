// Domain models for weekday analysis
// These modules contain pure data independent of fetching and presentation

pub mod aggregate;
pub mod deviation;
pub mod price_series;

// Re-export key types for convenience
pub use aggregate::{AggregateRow, AggregationError};
pub use deviation::{Deviation, DeviationRow, Sign};
pub use price_series::PriceSeries;
