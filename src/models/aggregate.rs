use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::weekday::{WEEKDAY_COUNT, WeekdayBucket};
use crate::utils::TimeUtils;

/// Averages of one look-back window. `None` in `weekday_averages` means the
/// window held no sample for that weekday, which is not the same as an average of 0.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub window_size: usize,
    // May be below `window_size` when the series is shorter than the window
    pub samples_used: usize,
    pub newest_timestamp_ms: i64,
    pub oldest_timestamp_ms: i64,
    pub overall_average: f64,
    // Sunday first
    pub weekday_averages: [Option<f64>; WEEKDAY_COUNT],
}

impl AggregateRow {
    pub fn weekday_average(&self, day: WeekdayBucket) -> Option<f64> {
        self.weekday_averages[day.index()]
    }

    pub fn span_days(&self) -> f64 {
        TimeUtils::ms_to_days(self.newest_timestamp_ms - self.oldest_timestamp_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationError {
    /// The window holds no sample at all, so it has no baseline.
    DataInsufficient { window_size: usize },
}

impl AggregationError {
    pub fn window_size(&self) -> usize {
        match self {
            AggregationError::DataInsufficient { window_size } => *window_size,
        }
    }
}

impl fmt::Display for AggregationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AggregationError::DataInsufficient { window_size } => {
                write!(f, "no samples available for a {}-sample window", window_size)
            }
        }
    }
}

impl Error for AggregationError {}
