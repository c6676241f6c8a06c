//! Rolling indicator series.
//!
//! Each series is aligned 1:1 with the bar sequence. A point's value depends
//! only on bars at or before its index; the first `window - 1` points of a
//! series are invalid (warmup) and must be treated as "no signal".

pub mod atr;
pub mod rolling;

use std::fmt;

/// A single point in an indicator series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorPoint {
    pub valid: bool,
    pub value: f64,
}

/// Indicator identity plus its lookback window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    RollingMax(usize),
    RollingMin(usize),
    Atr(usize),
}

/// A bar-aligned time series of indicator values.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Value at bar `index`, or `None` during warmup or out of range.
    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.values
            .get(index)
            .filter(|p| p.valid)
            .map(|p| p.value)
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::RollingMax(window) => write!(f, "ROLLING_MAX({})", window),
            IndicatorType::RollingMin(window) => write!(f, "ROLLING_MIN({})", window),
            IndicatorType::Atr(window) => write!(f, "ATR({})", window),
        }
    }
}
