// Domain types and value objects
pub mod sample;
pub mod weekday;
pub mod window_spec;

// Re-export commonly used types
pub use sample::{MalformedSample, RawSample, Sample};
pub use weekday::{ALL_WEEKDAYS, WEEKDAY_COUNT, WeekdayBucket, classify, classify_in};
pub use window_spec::WindowSpec;
