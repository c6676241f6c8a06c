//! Rolling extremum channels.
//!
//! Highest/lowest close over the trailing `window` bars inclusive of the
//! current bar. Maintained with a monotonic deque of candidate indices, so
//! each bar is pushed and popped at most once regardless of window size.
//! Warmup: first (window-1) points are invalid.

use std::collections::VecDeque;

use crate::domain::bar::Bar;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};

/// Highest close over the trailing `window` bars.
pub fn rolling_max(bars: &[Bar], window: usize) -> IndicatorSeries {
    rolling_extremum(bars, window, IndicatorType::RollingMax(window), |a, b| {
        a >= b
    })
}

/// Lowest close over the trailing `window` bars.
pub fn rolling_min(bars: &[Bar], window: usize) -> IndicatorSeries {
    rolling_extremum(bars, window, IndicatorType::RollingMin(window), |a, b| {
        a <= b
    })
}

fn rolling_extremum(
    bars: &[Bar],
    window: usize,
    indicator_type: IndicatorType,
    dominates: fn(f64, f64) -> bool,
) -> IndicatorSeries {
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

    // Indices whose closes still matter, front = current extremum. A newer
    // close that dominates an older one evicts it permanently; ties keep the
    // newer index so the front always stays inside the window.
    let mut candidates: VecDeque<usize> = VecDeque::new();
    let warmup = window - 1;

    for i in 0..bars.len() {
        while let Some(&back) = candidates.back() {
            if dominates(bars[i].close, bars[back].close) {
                candidates.pop_back();
            } else {
                break;
            }
        }
        candidates.push_back(i);

        if let Some(&front) = candidates.front() {
            if front + window <= i {
                candidates.pop_front();
            }
        }

        let valid = i >= warmup;
        let value = match candidates.front() {
            Some(&front) if valid => bars[front].close,
            _ => 0.0,
        };
        values.push(IndicatorPoint { valid, value });
    }

    IndicatorSeries {
        indicator_type,
        values,
    }
}
