use serde::{Deserialize, Serialize};

use crate::config::ANALYSIS;

/// A look-back window: the `size` most recent samples of a series.
/// This is a sample count, not a duration.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowSpec {
    pub size: usize,
}

impl WindowSpec {
    pub const fn new(size: usize) -> Self {
        WindowSpec { size }
    }

    /// Keeps the caller's order; output rows follow it.
    pub fn from_sizes(sizes: &[usize]) -> Vec<Self> {
        sizes.iter().copied().map(WindowSpec::new).collect()
    }

    pub fn defaults() -> Vec<Self> {
        Self::from_sizes(ANALYSIS.windows.default_sizes)
    }
}

impl std::fmt::Display for WindowSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} samples", self.size)
    }
}
