use serde::{Deserialize, Serialize};

use crate::domain::weekday::{ALL_WEEKDAYS, WEEKDAY_COUNT, WeekdayBucket};
use crate::utils::TimeUtils;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sign {
    Positive,
    Negative,
    Zero,
}

impl Sign {
    pub fn of(percent: f64) -> Self {
        if percent > 0.0 {
            Sign::Positive
        } else if percent < 0.0 {
            Sign::Negative
        } else {
            Sign::Zero
        }
    }
}

/// Percent difference of one weekday's average from the window baseline.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Deviation {
    pub percent: f64,
    pub sign: Sign,
    // Hint for the presentation layer: the deviation is large enough to highlight
    pub emphasize: bool,
}

/// Terminal artifact of the pipeline for one window.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DeviationRow {
    pub window_size: usize,
    pub samples_used: usize,
    pub newest_timestamp_ms: i64,
    pub oldest_timestamp_ms: i64,
    pub overall_average: f64,
    pub overall_price_formatted: String,
    // Sunday first, `None` where the weekday had no samples
    pub deviations: [Option<Deviation>; WEEKDAY_COUNT],
}

impl DeviationRow {
    pub fn deviation(&self, day: WeekdayBucket) -> Option<Deviation> {
        self.deviations[day.index()]
    }

    pub fn span_days(&self) -> f64 {
        TimeUtils::ms_to_days(self.newest_timestamp_ms - self.oldest_timestamp_ms)
    }

    pub fn is_undersized(&self) -> bool {
        self.samples_used < self.window_size
    }

    fn defined(&self) -> impl Iterator<Item = (WeekdayBucket, Deviation)> + '_ {
        ALL_WEEKDAYS
            .iter()
            .zip(self.deviations.iter())
            .filter_map(|(day, deviation)| deviation.map(|d| (*day, d)))
    }

    /// Weekday with the lowest deviation. Ties go to the earlier weekday.
    pub fn cheapest(&self) -> Option<(WeekdayBucket, Deviation)> {
        self.defined()
            .min_by(|(_, a), (_, b)| a.percent.total_cmp(&b.percent))
    }

    /// Weekday with the highest deviation. Ties go to the later weekday.
    pub fn dearest(&self) -> Option<(WeekdayBucket, Deviation)> {
        self.defined()
            .max_by(|(_, a), (_, b)| a.percent.total_cmp(&b.percent))
    }
}
