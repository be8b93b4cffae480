use colored::Colorize;
use itertools::Itertools;
use strum::IntoEnumIterator;

use crate::analysis::WindowOutcome;
use crate::domain::weekday::WeekdayBucket;
use crate::models::deviation::{Deviation, DeviationRow, Sign};

const WINDOW_WIDTH: usize = 30;
const AVERAGE_WIDTH: usize = 10;
const CELL_WIDTH: usize = 10;

/// Whether cells carry ANSI colour. `main` turns it off when stdout is not a terminal.
#[derive(Debug, Clone, Copy)]
pub struct TableStyle {
    pub color: bool,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self { color: true }
    }
}

pub fn window_label(row: &DeviationRow) -> String {
    let used = if row.is_undersized() {
        format!(" [{} used]", row.samples_used)
    } else {
        String::new()
    };
    format!("{} samples{} ({:.1}d)", row.window_size, used, row.span_days())
}

fn header() -> String {
    let days = WeekdayBucket::iter()
        .map(|day| format!("{:>CELL_WIDTH$}", day.name()))
        .join("");
    format!("{:<WINDOW_WIDTH$}{:>AVERAGE_WIDTH$}{}", "Window", "Average", days)
}

// Padding happens before colouring so escape codes never count towards width
fn cell(deviation: Option<Deviation>, style: &TableStyle) -> String {
    let Some(deviation) = deviation else {
        return format!("{:>CELL_WIDTH$}", "-");
    };
    let text = format!("{:>CELL_WIDTH$.2}", deviation.percent);
    if !style.color {
        return text;
    }
    let colored = match deviation.sign {
        Sign::Positive => text.green(),
        Sign::Negative => text.red(),
        Sign::Zero => text.normal(),
    };
    if deviation.emphasize {
        colored.bold().to_string()
    } else {
        colored.to_string()
    }
}

fn row_line(row: &DeviationRow, style: &TableStyle) -> String {
    let cells = row
        .deviations
        .iter()
        .map(|deviation| cell(*deviation, style))
        .join("");
    format!(
        "{:<WINDOW_WIDTH$}{:>AVERAGE_WIDTH$}{}",
        window_label(row),
        row.overall_price_formatted,
        cells
    )
}

/// Cheapest and dearest weekday of the widest successful window, if any weekday is defined.
pub fn summary_line(outcomes: &[WindowOutcome]) -> Option<String> {
    let row = outcomes
        .iter()
        .flatten()
        .max_by_key(|row| row.samples_used)?;
    let (cheap_day, cheap) = row.cheapest()?;
    let (dear_day, dear) = row.dearest()?;
    Some(format!(
        "Cheapest weekday over the last {} samples: {} ({:.2}%), dearest: {} ({:.2}%)",
        row.samples_used, cheap_day, cheap.percent, dear_day, dear.percent
    ))
}

/// One header line, then one line per window in input order.
pub fn render_table(outcomes: &[WindowOutcome], style: &TableStyle) -> String {
    let mut lines = vec![header()];
    for outcome in outcomes {
        let line = match outcome {
            Ok(row) => row_line(row, style),
            Err(e) => {
                log::debug!("{}", e);
                format!("{:<WINDOW_WIDTH$}{:>AVERAGE_WIDTH$}", format!("{} samples", e.window_size()), "no data")
            }
        };
        lines.push(line);
    }
    if let Some(summary) = summary_line(outcomes) {
        lines.push(String::new());
        lines.push(summary);
    }
    lines.join("\n")
}
