#![allow(dead_code)]

use chrono::NaiveDate;
use turtletrader::domain::bar::Bar;
use turtletrader::domain::error::TurtleError;
use turtletrader::domain::simulation::SimulationConfig;
use turtletrader::ports::data_port::DataPort;

pub fn day(i: usize) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i as i64)
}

pub fn make_bar(i: usize, close: f64) -> Bar {
    Bar {
        date: day(i),
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
    }
}

pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_bar(i, close))
        .collect()
}

/// Prefix that wiggles strictly inside its own channels, so a run with
/// [`small_config`] stays flat until an appended breakout bar.
pub const QUIET: [f64; 5] = [100.0, 102.0, 98.0, 101.0, 99.0];

pub fn quiet_plus(tail: &[f64]) -> Vec<Bar> {
    let mut closes = QUIET.to_vec();
    closes.extend_from_slice(tail);
    make_bars(&closes)
}

/// Short windows so scenarios fit in a handful of bars.
pub fn small_config() -> SimulationConfig {
    SimulationConfig {
        sys1_entry: 3,
        sys1_exit: 2,
        sys2_entry: 5,
        sys2_exit: 3,
        atr_window: 3,
        risk_level: 2.0,
        risk_fraction: 0.02,
        unit_limit: 3,
        starting_cash: 10_000.0,
        commission_rate: 0.0,
    }
}

pub struct MockDataPort {
    pub bars: Vec<Bar>,
}

impl MockDataPort {
    pub fn new(bars: Vec<Bar>) -> Self {
        Self { bars }
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Bar>, TurtleError> {
        Ok(self
            .bars
            .iter()
            .filter(|b| !start.is_some_and(|s| b.date < s) && !end.is_some_and(|e| b.date > e))
            .copied()
            .collect())
    }
}
