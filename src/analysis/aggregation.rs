use chrono::{Local, TimeZone};

use crate::domain::sample::Sample;
use crate::domain::weekday::{WEEKDAY_COUNT, classify_in};
use crate::domain::window_spec::WindowSpec;
use crate::models::aggregate::{AggregateRow, AggregationError};
use crate::utils::maths_utils;

/// Split a window into its seven weekday buckets (Sunday first).
/// Every sample lands in exactly one bucket and keeps its relative order.
pub fn partition_by_weekday_in<Tz: TimeZone>(
    window: &[Sample],
    tz: &Tz,
) -> [Vec<Sample>; WEEKDAY_COUNT] {
    let mut buckets: [Vec<Sample>; WEEKDAY_COUNT] = Default::default();
    for sample in window {
        buckets[classify_in(sample.timestamp_ms, tz).index()].push(*sample);
    }
    buckets
}

fn mean_price(samples: &[Sample]) -> Option<f64> {
    maths_utils::mean(samples.iter().map(|s| s.price))
}

/// Overall and per-weekday averages of `window`, weekdays on the local calendar.
pub fn aggregate(spec: &WindowSpec, window: &[Sample]) -> Result<AggregateRow, AggregationError> {
    aggregate_in(spec, window, &Local)
}

pub fn aggregate_in<Tz: TimeZone>(
    spec: &WindowSpec,
    window: &[Sample],
    tz: &Tz,
) -> Result<AggregateRow, AggregationError> {
    let insufficient = AggregationError::DataInsufficient {
        window_size: spec.size,
    };
    let (newest, oldest) = match (window.first(), window.last()) {
        (Some(newest), Some(oldest)) => (newest, oldest),
        _ => return Err(insufficient),
    };
    let overall_average = mean_price(window).ok_or(insufficient)?;

    let buckets = partition_by_weekday_in(window, tz);
    let weekday_averages = std::array::from_fn(|i| mean_price(&buckets[i]));

    Ok(AggregateRow {
        window_size: spec.size,
        samples_used: window.len(),
        newest_timestamp_ms: newest.timestamp_ms,
        oldest_timestamp_ms: oldest.timestamp_ms,
        overall_average,
        weekday_averages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::weekday::{ALL_WEEKDAYS, WeekdayBucket};
    use crate::utils::TimeUtils;
    use chrono::Utc;

    // 2024-01-13T12:00:00Z, a Saturday
    const SATURDAY_NOON_UTC: i64 = 1_705_147_200_000;

    /// One sample per day going back in time from Saturday, newest first.
    fn daily_newest_first(prices: &[f64]) -> Vec<Sample> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &p)| Sample::new(SATURDAY_NOON_UTC - i as i64 * TimeUtils::MS_IN_D, p))
            .collect()
    }

    /// Hourly samples going back in time, newest first.
    fn hourly_newest_first(count: usize) -> Vec<Sample> {
        (0..count)
            .map(|i| {
                let price = 20_000.0 + ((i * 37) % 101) as f64 * 3.5;
                Sample::new(SATURDAY_NOON_UTC - i as i64 * TimeUtils::MS_IN_H, price)
            })
            .collect()
    }

    #[test]
    fn empty_window_is_data_insufficient() {
        let result = aggregate_in(&WindowSpec::new(10), &[], &Utc);
        assert_eq!(
            result,
            Err(AggregationError::DataInsufficient { window_size: 10 })
        );
    }

    #[test]
    fn one_sample_per_weekday_averages_to_itself() {
        let samples = daily_newest_first(&[100.0, 102.0, 98.0, 101.0, 99.0, 103.0, 97.0]);
        let row = aggregate_in(&WindowSpec::new(7), &samples, &Utc).unwrap();

        assert_eq!(row.overall_average, 100.0);
        assert_eq!(row.samples_used, 7);
        assert_eq!(row.weekday_average(WeekdayBucket::Saturday), Some(100.0));
        assert_eq!(row.weekday_average(WeekdayBucket::Friday), Some(102.0));
        assert_eq!(row.weekday_average(WeekdayBucket::Thursday), Some(98.0));
        assert_eq!(row.weekday_average(WeekdayBucket::Wednesday), Some(101.0));
        assert_eq!(row.weekday_average(WeekdayBucket::Tuesday), Some(99.0));
        assert_eq!(row.weekday_average(WeekdayBucket::Monday), Some(103.0));
        assert_eq!(row.weekday_average(WeekdayBucket::Sunday), Some(97.0));
        assert_eq!(row.span_days(), 6.0);
    }

    #[test]
    fn short_window_leaves_missing_weekdays_undefined() {
        let samples = daily_newest_first(&[10.0, 20.0, 30.0]);
        let row = aggregate_in(&WindowSpec::new(3), &samples, &Utc).unwrap();

        let undefined = row.weekday_averages.iter().filter(|a| a.is_none()).count();
        assert_eq!(undefined, 4);
        assert_eq!(row.weekday_average(WeekdayBucket::Sunday), None);
        assert_eq!(row.overall_average, 20.0);
    }

    #[test]
    fn zero_prices_are_data_not_absence() {
        let samples = daily_newest_first(&[0.0, 0.0]);
        let row = aggregate_in(&WindowSpec::new(2), &samples, &Utc).unwrap();
        assert_eq!(row.weekday_average(WeekdayBucket::Saturday), Some(0.0));
        assert_eq!(row.weekday_average(WeekdayBucket::Monday), None);
    }

    #[test]
    fn weekday_average_is_mean_of_its_own_samples() {
        let samples = hourly_newest_first(24 * 9);
        let row = aggregate_in(&WindowSpec::new(samples.len()), &samples, &Utc).unwrap();

        for day in ALL_WEEKDAYS {
            let own: Vec<f64> = samples
                .iter()
                .filter(|s| classify_in(s.timestamp_ms, &Utc) == day)
                .map(|s| s.price)
                .collect();
            let expected = own.iter().sum::<f64>() / own.len() as f64;
            assert_eq!(row.weekday_average(day), Some(expected), "{}", day);
        }
    }

    #[test]
    fn buckets_partition_the_window() {
        let samples = hourly_newest_first(500);
        let buckets = partition_by_weekday_in(&samples, &Utc);

        let total: usize = buckets.iter().map(Vec::len).sum();
        assert_eq!(total, samples.len(), "every sample lands in exactly one bucket");

        for (i, bucket) in buckets.iter().enumerate() {
            for sample in bucket {
                assert_eq!(classify_in(sample.timestamp_ms, &Utc).index(), i);
            }
        }

        let mut rebuilt: Vec<i64> = buckets
            .iter()
            .flat_map(|b| b.iter().map(|s| s.timestamp_ms))
            .collect();
        let mut original: Vec<i64> = samples.iter().map(|s| s.timestamp_ms).collect();
        rebuilt.sort_unstable();
        original.sort_unstable();
        assert_eq!(rebuilt, original);
    }

    #[test]
    fn local_calendar_variant_matches_explicit_local() {
        let samples = hourly_newest_first(100);
        let spec = WindowSpec::new(100);
        assert_eq!(aggregate(&spec, &samples), aggregate_in(&spec, &samples, &Local));
    }
}
