use chrono::{DateTime, Local, TimeZone};

pub struct TimeUtils;

impl TimeUtils {
    pub const MS_IN_S: i64 = 1000;
    pub const MS_IN_MIN: i64 = Self::MS_IN_S * 60;
    pub const MS_IN_5_MIN: i64 = Self::MS_IN_S * 60 * 5;
    pub const MS_IN_15_MIN: i64 = Self::MS_IN_S * 60 * 15;
    pub const MS_IN_30_MIN: i64 = Self::MS_IN_S * 60 * 30;
    pub const MS_IN_H: i64 = Self::MS_IN_MIN * 60;
    pub const MS_IN_4_H: i64 = Self::MS_IN_MIN * 60 * 4;
    pub const MS_IN_D: i64 = Self::MS_IN_H * 24;
    pub const MS_IN_W: i64 = Self::MS_IN_D * 7;
    pub const STANDARD_TIME_FORMAT: &str = "%Y-%m-%d";

    /// Convert interval in milliseconds to a Binance-style shorthand (e.g. `30m`, `1h`).
    pub fn interval_to_string(interval_ms: i64) -> &'static str {
        match interval_ms {
            Self::MS_IN_S => "1s",
            Self::MS_IN_MIN => "1m",
            Self::MS_IN_5_MIN => "5m",
            Self::MS_IN_15_MIN => "15m",
            Self::MS_IN_30_MIN => "30m",
            Self::MS_IN_H => "1h",
            Self::MS_IN_4_H => "4h",
            Self::MS_IN_D => "1d",
            Self::MS_IN_W => "1w",
            _ => "unknown",
        }
    }

    /// Length of `span_ms` expressed in (fractional) days.
    pub fn ms_to_days(span_ms: i64) -> f64 {
        span_ms as f64 / Self::MS_IN_D as f64
    }
}

pub fn epoch_ms_to_local(epoch_ms: i64) -> String {
    // local time not UTC time. Useful for display purposes
    if let chrono::LocalResult::Single(datetime) = Local.timestamp_millis_opt(epoch_ms) {
        datetime.format(TimeUtils::STANDARD_TIME_FORMAT).to_string()
    } else {
        // Handle invalid timestamp values
        String::new()
    }
}

pub fn epoch_ms_to_utc(epoch_ms: i64) -> String {
    // Used for display purposes
    match DateTime::from_timestamp_millis(epoch_ms) {
        Some(dt) => dt.format(TimeUtils::STANDARD_TIME_FORMAT).to_string(),
        None => String::new(),
    }
}

pub fn local_now_as_timestamp_ms() -> i64 {
    Local::now().timestamp_millis()
}

pub fn how_many_seconds_ago(past_timestamp_ms: i64) -> i64 {
    // How many seconds ago was the event described by `past_timestamp_ms` ?
    let now_timestamp_ms = local_now_as_timestamp_ms();
    (now_timestamp_ms - past_timestamp_ms) / 1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_shorthand() {
        assert_eq!(TimeUtils::interval_to_string(TimeUtils::MS_IN_H), "1h");
        assert_eq!(TimeUtils::interval_to_string(TimeUtils::MS_IN_D), "1d");
        assert_eq!(TimeUtils::interval_to_string(42), "unknown");
    }

    #[test]
    fn ms_to_days_is_fractional() {
        assert_eq!(TimeUtils::ms_to_days(TimeUtils::MS_IN_D * 3), 3.0);
        assert_eq!(TimeUtils::ms_to_days(TimeUtils::MS_IN_H * 12), 0.5);
    }

    #[test]
    fn utc_formatting() {
        // 2024-01-07T00:00:00Z
        assert_eq!(epoch_ms_to_utc(1_704_585_600_000), "2024-01-07");
        assert_eq!(epoch_ms_to_utc(i64::MAX), "");
    }
}
