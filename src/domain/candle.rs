// ============================================================
// Layer 3 — Candle Domain Type
// ============================================================
// One OHLC bar ("kline") for a fixed interval, as written to
// CSV by the market-data client. `start` is the open time of
// the bar in milliseconds since the Unix epoch and is the
// ordering key: the exchange pages bars newest-first, so
// loaders must sort by it before windowing.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::domain::error::TrainError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bar open time, ms since epoch
    pub start: i64,
    pub open:  f64,
    pub high:  f64,
    pub low:   f64,
    pub close: f64,
}

impl Candle {
    pub fn new(start: i64, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self { start, open, high, low, close }
    }

    /// Read one price column of this bar
    pub fn feature(&self, feature: Feature) -> f64 {
        match feature {
            Feature::Open  => self.open,
            Feature::High  => self.high,
            Feature::Low   => self.low,
            Feature::Close => self.close,
        }
    }
}

/// A price column that can be fed to the model or predicted by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Open,
    High,
    Low,
    Close,
}

impl Feature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Open  => "open",
            Feature::High  => "high",
            Feature::Low   => "low",
            Feature::Close => "close",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = TrainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open"  => Ok(Feature::Open),
            "high"  => Ok(Feature::High),
            "low"   => Ok(Feature::Low),
            "close" => Ok(Feature::Close),
            other   => Err(TrainError::config(format!(
                "unknown feature '{other}' (expected open, high, low or close)"
            ))),
        }
    }
}
