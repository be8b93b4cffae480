// Weekday analysis pipeline: select -> aggregate -> deviate
pub mod aggregation;
pub mod deviation;
pub mod engine;

// Re-export commonly used types
pub use aggregation::{aggregate, aggregate_in, partition_by_weekday_in};
pub use deviation::{deviate, format_usd, percent_deviation};
pub use engine::{WeekdayEngine, WindowOutcome, analyse_window};
