use std::convert::TryFrom;
use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One price observation. Never mutated once it is part of a series.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub timestamp_ms: i64,
    pub price: f64,
}

impl Sample {
    pub fn new(timestamp_ms: i64, price: f64) -> Self {
        Sample {
            timestamp_ms,
            price,
        }
    }
}

/// A sample as it arrives from a provider, before validation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawSample {
    pub timestamp_ms: Option<i64>,
    pub price: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MalformedSample {
    MissingTimestamp,
    MissingPrice { timestamp_ms: i64 },
    NonFinitePrice { timestamp_ms: i64, price: f64 },
}

impl fmt::Display for MalformedSample {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MalformedSample::MissingTimestamp => write!(f, "sample has no parseable timestamp"),
            MalformedSample::MissingPrice { timestamp_ms } => {
                write!(f, "sample at {} has no numeric price", timestamp_ms)
            }
            MalformedSample::NonFinitePrice {
                timestamp_ms,
                price,
            } => write!(f, "sample at {} has non-finite price {}", timestamp_ms, price),
        }
    }
}

impl Error for MalformedSample {}

impl TryFrom<RawSample> for Sample {
    type Error = MalformedSample;

    fn try_from(raw: RawSample) -> Result<Self, Self::Error> {
        let timestamp_ms = raw.timestamp_ms.ok_or(MalformedSample::MissingTimestamp)?;
        let price = raw
            .price
            .ok_or(MalformedSample::MissingPrice { timestamp_ms })?;
        if !price.is_finite() {
            return Err(MalformedSample::NonFinitePrice {
                timestamp_ms,
                price,
            });
        }
        Ok(Sample::new(timestamp_ms, price))
    }
}
