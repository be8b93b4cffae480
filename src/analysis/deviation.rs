use crate::config::ANALYSIS;
use crate::models::aggregate::AggregateRow;
use crate::models::deviation::{Deviation, DeviationRow, Sign};
use crate::utils::maths_utils::round_to_decimals;

/// Whole-dollar display of a price, e.g. `$43127`.
pub fn format_usd(price: f64) -> String {
    format!("${:.0}", price.round())
}

/// Percent distance of `average` from `baseline`, both rounded to whole units first.
/// The order matters: rounding before the ratio gives different numbers than
/// rounding the final percentage alone.
/// `None` when the rounded baseline is 0, since the ratio is then undefined.
pub fn percent_deviation(average: f64, baseline: f64) -> Option<f64> {
    let baseline = baseline.round();
    if baseline == 0.0 {
        return None;
    }
    let percent = (average.round() - baseline) / baseline * 100.0;
    Some(round_to_decimals(
        percent,
        ANALYSIS.deviation.percent_decimals,
    ))
}

fn classify_percent(percent: f64) -> Deviation {
    Deviation {
        percent,
        sign: Sign::of(percent),
        emphasize: percent.abs() > ANALYSIS.deviation.emphasis_threshold_pct,
    }
}

/// Turn a window's weekday averages into deviations from its overall average.
/// Undefined averages stay undefined.
pub fn deviate(row: &AggregateRow) -> DeviationRow {
    let deviations = std::array::from_fn(|i| {
        row.weekday_averages[i]
            .and_then(|average| percent_deviation(average, row.overall_average))
            .map(classify_percent)
    });

    DeviationRow {
        window_size: row.window_size,
        samples_used: row.samples_used,
        newest_timestamp_ms: row.newest_timestamp_ms,
        oldest_timestamp_ms: row.oldest_timestamp_ms,
        overall_average: row.overall_average,
        overall_price_formatted: format_usd(row.overall_average),
        deviations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::weekday::{WEEKDAY_COUNT, WeekdayBucket};

    fn aggregate_row(overall: f64, averages: [Option<f64>; WEEKDAY_COUNT]) -> AggregateRow {
        AggregateRow {
            window_size: 7,
            samples_used: 7,
            newest_timestamp_ms: 0,
            oldest_timestamp_ms: 0,
            overall_average: overall,
            weekday_averages: averages,
        }
    }

    #[test]
    fn equal_rounded_averages_give_exact_zero() {
        assert_eq!(percent_deviation(100.4, 99.6), Some(0.0));
        let d = classify_percent(0.0);
        assert_eq!(d.sign, Sign::Zero);
        assert!(!d.emphasize);
    }

    #[test]
    fn rounding_happens_before_the_ratio() {
        // Raw ratio would be (100.6 - 100.4) / 100.4 = 0.20%; whole-dollar rounding gives 101 vs 100
        assert_eq!(percent_deviation(100.6, 100.4), Some(1.0));
        // Raw ratio would be (99.5 - 100.49) / 100.49 = -0.99%; rounded operands give 100 vs 100
        assert_eq!(percent_deviation(99.5, 100.49), Some(0.0));
    }

    #[test]
    fn percent_is_rounded_to_two_places() {
        // (30000 - 29000) / 29000 * 100 = 3.448...
        assert_eq!(percent_deviation(30_000.0, 29_000.0), Some(3.45));
        assert_eq!(percent_deviation(29_000.0, 30_000.0), Some(-3.33));
    }

    #[test]
    fn emphasis_threshold_is_strictly_above_one() {
        let at_one = percent_deviation(10_100.0, 10_000.0).map(classify_percent).unwrap();
        assert_eq!(at_one.percent, 1.0);
        assert!(!at_one.emphasize);

        let above_one = percent_deviation(10_101.0, 10_000.0).map(classify_percent).unwrap();
        assert_eq!(above_one.percent, 1.01);
        assert!(above_one.emphasize);

        let below_minus_one = percent_deviation(9_899.0, 10_000.0).map(classify_percent).unwrap();
        assert_eq!(below_minus_one.percent, -1.01);
        assert_eq!(below_minus_one.sign, Sign::Negative);
        assert!(below_minus_one.emphasize);
    }

    #[test]
    fn undefined_average_stays_undefined() {
        let row = aggregate_row(100.0, [None, Some(101.0), None, None, None, None, Some(99.0)]);
        let deviated = deviate(&row);

        assert_eq!(deviated.deviation(WeekdayBucket::Sunday), None);
        assert_eq!(deviated.deviation(WeekdayBucket::Monday).map(|d| d.percent), Some(1.0));
        assert_eq!(
            deviated.deviation(WeekdayBucket::Saturday).map(|d| d.sign),
            Some(Sign::Negative)
        );
        assert_eq!(deviated.deviations.iter().filter(|d| d.is_none()).count(), 5);
    }

    #[test]
    fn sub_unit_baseline_has_no_defined_deviation() {
        let row = aggregate_row(0.3, [Some(0.2); WEEKDAY_COUNT]);
        let deviated = deviate(&row);
        assert!(deviated.deviations.iter().all(Option::is_none));
        assert_eq!(deviated.overall_price_formatted, "$0");
    }

    #[test]
    fn overall_price_is_whole_dollars() {
        assert_eq!(format_usd(43_127.49), "$43127");
        assert_eq!(format_usd(43_127.5), "$43128");
    }
}
