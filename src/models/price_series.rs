use serde::{Deserialize, Serialize};

use crate::domain::sample::{MalformedSample, RawSample, Sample};
use crate::domain::window_spec::WindowSpec;

// ============================================================================
// PriceSeries: ordered samples for one asset, newest first
// ============================================================================

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    pub asset: String,
    // Nominal spacing between samples. Informational only, never enforced.
    pub interval_ms: i64,
    // Index 0 is the most recent sample
    samples: Vec<Sample>,
}

impl PriceSeries {
    pub fn from_most_recent_first(
        asset: impl Into<String>,
        interval_ms: i64,
        samples: Vec<Sample>,
    ) -> Self {
        PriceSeries {
            asset: asset.into(),
            interval_ms,
            samples,
        }
    }

    /// Providers hand samples over oldest first; flip them on entry.
    pub fn from_chronological(
        asset: impl Into<String>,
        interval_ms: i64,
        mut samples: Vec<Sample>,
    ) -> Self {
        samples.reverse();
        Self::from_most_recent_first(asset, interval_ms, samples)
    }

    /// Builds a series from unvalidated, oldest-first provider output.
    /// Malformed entries never enter the series; they are returned so the caller can report them.
    pub fn from_raw_chronological<I>(
        asset: impl Into<String>,
        interval_ms: i64,
        raw_samples: I,
    ) -> (Self, Vec<MalformedSample>)
    where
        I: IntoIterator<Item = RawSample>,
    {
        let mut samples = Vec::new();
        let mut rejected = Vec::new();
        for raw in raw_samples {
            match Sample::try_from(raw) {
                Ok(sample) => samples.push(sample),
                Err(e) => rejected.push(e),
            }
        }

        let series = Self::from_chronological(asset, interval_ms, samples);
        if let Some(first) = rejected.first() {
            log::warn!(
                "{}: rejected {} malformed samples (first: {})",
                series.asset,
                rejected.len(),
                first
            );
        }
        (series, rejected)
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn newest(&self) -> Option<&Sample> {
        self.samples.first()
    }

    pub fn oldest(&self) -> Option<&Sample> {
        self.samples.last()
    }

    /// Keep only the `limit` most recent samples.
    pub fn truncate(&mut self, limit: usize) {
        self.samples.truncate(limit);
    }

    /// The `spec.size` most recent samples, or the whole series if it is shorter.
    pub fn select(&self, spec: &WindowSpec) -> &[Sample] {
        let end = spec.size.min(self.samples.len());
        &self.samples[..end]
    }
}
