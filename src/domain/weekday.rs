use std::fmt;

use chrono::{DateTime, Datelike, Local, TimeZone, Weekday};
use serde::{Deserialize, Serialize};
use strum_macros::EnumIter;

use crate::utils::TimeUtils;

pub const WEEKDAY_COUNT: usize = 7;

/// One of the seven day-of-week partitions of a window.
/// Declaration order is the column order of every weekday table and must not change.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, EnumIter)]
pub enum WeekdayBucket {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

pub const ALL_WEEKDAYS: [WeekdayBucket; WEEKDAY_COUNT] = [
    WeekdayBucket::Sunday,
    WeekdayBucket::Monday,
    WeekdayBucket::Tuesday,
    WeekdayBucket::Wednesday,
    WeekdayBucket::Thursday,
    WeekdayBucket::Friday,
    WeekdayBucket::Saturday,
];

impl WeekdayBucket {
    /// 0 for Sunday through 6 for Saturday.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        ALL_WEEKDAYS.get(index).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            WeekdayBucket::Sunday => "Sunday",
            WeekdayBucket::Monday => "Monday",
            WeekdayBucket::Tuesday => "Tuesday",
            WeekdayBucket::Wednesday => "Wednesday",
            WeekdayBucket::Thursday => "Thursday",
            WeekdayBucket::Friday => "Friday",
            WeekdayBucket::Saturday => "Saturday",
        }
    }
}

impl From<Weekday> for WeekdayBucket {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Sun => WeekdayBucket::Sunday,
            Weekday::Mon => WeekdayBucket::Monday,
            Weekday::Tue => WeekdayBucket::Tuesday,
            Weekday::Wed => WeekdayBucket::Wednesday,
            Weekday::Thu => WeekdayBucket::Thursday,
            Weekday::Fri => WeekdayBucket::Friday,
            Weekday::Sat => WeekdayBucket::Saturday,
        }
    }
}

impl fmt::Display for WeekdayBucket {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Day of week of `timestamp_ms` on the calendar of the executing process (not UTC).
pub fn classify(timestamp_ms: i64) -> WeekdayBucket {
    classify_in(timestamp_ms, &Local)
}

/// Day of week of `timestamp_ms` on the calendar of `tz`.
pub fn classify_in<Tz: TimeZone>(timestamp_ms: i64, tz: &Tz) -> WeekdayBucket {
    match DateTime::from_timestamp_millis(timestamp_ms) {
        Some(utc) => utc.with_timezone(tz).weekday().into(),
        None => classify_by_epoch_days(timestamp_ms),
    }
}

// Beyond chrono's representable range. 1970-01-01 was a Thursday.
fn classify_by_epoch_days(timestamp_ms: i64) -> WeekdayBucket {
    let days = timestamp_ms.div_euclid(TimeUtils::MS_IN_D);
    ALL_WEEKDAYS[(days + 4).rem_euclid(WEEKDAY_COUNT as i64) as usize]
}
