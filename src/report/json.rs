use anyhow::{Context, Result};
use serde::Serialize;

use crate::analysis::WindowOutcome;
use crate::domain::weekday::ALL_WEEKDAYS;
use crate::models::deviation::{Deviation, DeviationRow};
use crate::models::PriceSeries;
use crate::utils::TimeUtils;

#[derive(Serialize, Debug)]
struct JsonCell {
    weekday: &'static str,
    // null when the weekday had no samples
    deviation: Option<Deviation>,
}

#[derive(Serialize, Debug)]
struct JsonRow {
    window_size: usize,
    samples_used: usize,
    span_days: Option<f64>,
    overall_average: Option<f64>,
    overall_price: Option<String>,
    error: Option<String>,
    weekdays: Vec<JsonCell>,
}

#[derive(Serialize, Debug)]
struct JsonReport<'a> {
    asset: &'a str,
    interval: &'static str,
    samples: usize,
    newest_timestamp_ms: Option<i64>,
    windows: Vec<JsonRow>,
}

impl From<&DeviationRow> for JsonRow {
    fn from(row: &DeviationRow) -> Self {
        JsonRow {
            window_size: row.window_size,
            samples_used: row.samples_used,
            span_days: Some(row.span_days()),
            overall_average: Some(row.overall_average),
            overall_price: Some(row.overall_price_formatted.clone()),
            error: None,
            weekdays: ALL_WEEKDAYS
                .iter()
                .map(|day| JsonCell {
                    weekday: day.name(),
                    deviation: row.deviation(*day),
                })
                .collect(),
        }
    }
}

fn json_row(outcome: &WindowOutcome) -> JsonRow {
    match outcome {
        Ok(row) => row.into(),
        Err(e) => JsonRow {
            window_size: e.window_size(),
            samples_used: 0,
            span_days: None,
            overall_average: None,
            overall_price: None,
            error: Some(e.to_string()),
            weekdays: Vec::new(),
        },
    }
}

/// Pretty-printed JSON document with one entry per window, in window order.
pub fn render_json(series: &PriceSeries, outcomes: &[WindowOutcome]) -> Result<String> {
    let report = JsonReport {
        asset: &series.asset,
        interval: TimeUtils::interval_to_string(series.interval_ms),
        samples: series.len(),
        newest_timestamp_ms: series.newest().map(|s| s.timestamp_ms),
        windows: outcomes.iter().map(json_row).collect(),
    };
    serde_json::to_string_pretty(&report).context("Failed to serialize report")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::WeekdayEngine;
    use crate::domain::{Sample, WindowSpec};
    use chrono::Utc;
    use serde_json::Value;

    // 2024-01-13T12:00:00Z, a Saturday
    const SATURDAY_NOON_UTC: i64 = 1_705_147_200_000;

    #[test]
    fn undefined_weekdays_are_null() {
        let samples = [100.0, 102.0, 98.0]
            .iter()
            .enumerate()
            .map(|(i, &p)| Sample::new(SATURDAY_NOON_UTC - i as i64 * TimeUtils::MS_IN_D, p))
            .collect();
        let series = PriceSeries::from_most_recent_first("bitcoin", TimeUtils::MS_IN_D, samples);
        let outcomes = WeekdayEngine::new(WindowSpec::from_sizes(&[3])).run_in(&series, &Utc);

        let json: Value = serde_json::from_str(&render_json(&series, &outcomes).unwrap()).unwrap();
        assert_eq!(json["asset"], "bitcoin");
        assert_eq!(json["interval"], "1d");

        let weekdays = json["windows"][0]["weekdays"].as_array().unwrap();
        assert_eq!(weekdays.len(), 7);
        assert_eq!(weekdays[0]["weekday"], "Sunday");
        assert!(weekdays[0]["deviation"].is_null());
        assert_eq!(weekdays[6]["deviation"]["percent"], 0.0);
        assert_eq!(weekdays[6]["deviation"]["sign"], "zero");
        assert_eq!(weekdays[5]["deviation"]["percent"], 2.0);
        assert_eq!(weekdays[5]["deviation"]["emphasize"], true);
    }

    #[test]
    fn insufficient_window_carries_error() {
        let series = PriceSeries::default();
        let outcomes = WeekdayEngine::new(WindowSpec::from_sizes(&[10])).run_in(&series, &Utc);
        let json: Value = serde_json::from_str(&render_json(&series, &outcomes).unwrap()).unwrap();

        let row = &json["windows"][0];
        assert_eq!(row["window_size"], 10);
        assert!(row["overall_average"].is_null());
        assert!(row["error"].is_string());
        assert!(json["newest_timestamp_ms"].is_null());
    }
}
