use std::time::Instant;

use chrono::{Local, TimeZone};
use rayon::prelude::*;

use crate::analysis::aggregation::aggregate_in;
use crate::analysis::deviation::deviate;
#[cfg(debug_assertions)]
use crate::config::DEBUG_FLAGS;
use crate::domain::window_spec::WindowSpec;
use crate::models::aggregate::AggregationError;
use crate::models::deviation::DeviationRow;
use crate::models::price_series::PriceSeries;

/// Result of the pipeline for one window. An empty window fails on its own
/// without taking the rest of the table down.
pub type WindowOutcome = Result<DeviationRow, AggregationError>;

/// Runs select -> aggregate -> deviate for every configured window.
/// Holds no state between runs; the same series always yields the same rows.
#[derive(Debug, Clone)]
pub struct WeekdayEngine {
    windows: Vec<WindowSpec>,
}

impl WeekdayEngine {
    pub fn new(windows: Vec<WindowSpec>) -> Self {
        Self { windows }
    }

    pub fn windows(&self) -> &[WindowSpec] {
        &self.windows
    }

    /// One outcome per window, in window order. Weekdays use the local calendar.
    pub fn run(&self, series: &PriceSeries) -> Vec<WindowOutcome> {
        self.run_in(series, &Local)
    }

    pub fn run_in<Tz: TimeZone + Sync>(&self, series: &PriceSeries, tz: &Tz) -> Vec<WindowOutcome> {
        let start_time = Instant::now();

        // Windows are independent and the series is read-only
        let outcomes: Vec<WindowOutcome> = self
            .windows
            .par_iter()
            .map(|spec| analyse_window(series, spec, tz))
            .collect();

        log::info!(
            "{}: {} windows over {} samples analysed in {:?}",
            series.asset,
            outcomes.len(),
            series.len(),
            start_time.elapsed()
        );

        #[cfg(debug_assertions)]
        if DEBUG_FLAGS.print_window_rows {
            for outcome in &outcomes {
                log::info!("{:?}", outcome);
            }
        }

        outcomes
    }
}

impl Default for WeekdayEngine {
    fn default() -> Self {
        Self::new(WindowSpec::defaults())
    }
}

/// The full pipeline for a single window.
pub fn analyse_window<Tz: TimeZone>(
    series: &PriceSeries,
    spec: &WindowSpec,
    tz: &Tz,
) -> WindowOutcome {
    let window = series.select(spec);
    if window.len() < spec.size {
        log::debug!(
            "{}: window of {} samples only has {} available",
            series.asset,
            spec.size,
            window.len()
        );
    }
    let row = aggregate_in(spec, window, tz)?;
    Ok(deviate(&row))
}
