//! Average True Range.
//!
//! Simple rolling mean of per-bar True Range over the trailing `window` bars.
//! The first bar has no previous close, so its TR is just high - low; every
//! later bar uses the three-term definition on [`Bar::true_range`].
//! Warmup: first (window-1) points are invalid.

use crate::domain::bar::Bar;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};

pub fn average_true_range(bars: &[Bar], window: usize) -> IndicatorSeries {
    let indicator_type = IndicatorType::Atr(window);
    let mut values = Vec::with_capacity(bars.len());
    if window == 0 {
        values.extend(bars.iter().map(|_| IndicatorPoint {
            valid: false,
            value: 0.0,
        }));
        return IndicatorSeries {
            indicator_type,
            values,
        };
    }

    let mut tr_values: Vec<f64> = Vec::with_capacity(bars.len());
    for (i, bar) in bars.iter().enumerate() {
        let tr = if i == 0 {
            bar.high - bar.low
        } else {
            bar.true_range(bars[i - 1].close)
        };
        tr_values.push(tr);
    }

    let mut running_sum = 0.0;
    for i in 0..bars.len() {
        running_sum += tr_values[i];
        if i >= window {
            running_sum -= tr_values[i - window];
        }

        let valid = i + 1 >= window;
        let value = if valid {
            running_sum / window as f64
        } else {
            0.0
        };
        values.push(IndicatorPoint { valid, value });
    }

    IndicatorSeries {
        indicator_type,
        values,
    }
}
