//! Analysis and computation configuration

use crate::utils::TimeUtils;

/// Look-back windows for the weekday table
pub struct WindowConfig {
    // Counted in samples, not days. With an hourly series, 30 means 30 hours.
    pub default_sizes: &'static [usize],
}

/// Settings for the deviation columns
pub struct DeviationSettings {
    // Deviations strictly above this many percentage points are emphasized
    pub emphasis_threshold_pct: f64,
    // Decimal places kept on every percent deviation
    pub percent_decimals: i32,
}

/// Settings for the price series fed into the engine
pub struct SeriesSettings {
    // Nominal spacing between samples as requested from the providers
    pub interval_ms: i64,
    // Only the newest N samples are kept after a fetch
    pub default_limit: usize,
}

/// The Master Analysis Configuration
pub struct AnalysisConfig {
    pub windows: WindowConfig,
    pub deviation: DeviationSettings,
    pub series: SeriesSettings,
}

pub const ANALYSIS: AnalysisConfig = AnalysisConfig {
    windows: WindowConfig {
        default_sizes: &[10, 30, 60, 90, 180, 720, 1080, 1800],
    },

    deviation: DeviationSettings {
        emphasis_threshold_pct: 1.0,
        percent_decimals: 2,
    },

    series: SeriesSettings {
        interval_ms: TimeUtils::MS_IN_H,
        default_limit: 1800,
    },
};
