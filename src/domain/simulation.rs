//! Simulation configuration and the bar-by-bar replay loop.
//!
//! A run is a pure fold over the ordered bars: precompute the channel and
//! ATR series, then for each bar ask the strategy for actions, apply them to
//! the ledger, and record marked-to-market equity. Identical inputs always
//! produce an identical ledger and report.

use crate::domain::bar::Bar;
use crate::domain::error::TurtleError;
use crate::domain::ledger::Ledger;
use crate::domain::metrics::Metrics;
use crate::domain::strategy::{
    self, Action, ChannelWindows, Channels, StrategyParams, StrategyState,
};

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub sys1_entry: usize,
    pub sys1_exit: usize,
    pub sys2_entry: usize,
    pub sys2_exit: usize,
    pub atr_window: usize,
    pub risk_level: f64,
    pub risk_fraction: f64,
    pub unit_limit: usize,
    pub starting_cash: f64,
    pub commission_rate: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            sys1_entry: 20,
            sys1_exit: 10,
            sys2_entry: 55,
            sys2_exit: 20,
            atr_window: 20,
            risk_level: 2.0,
            risk_fraction: 0.02,
            unit_limit: 5,
            starting_cash: 10_000.0,
            commission_rate: 0.002,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), TurtleError> {
        let windows = [
            ("sys1_entry", self.sys1_entry),
            ("sys1_exit", self.sys1_exit),
            ("sys2_entry", self.sys2_entry),
            ("sys2_exit", self.sys2_exit),
            ("atr_window", self.atr_window),
        ];
        for (name, window) in windows {
            if window == 0 {
                return Err(TurtleError::InvalidConfiguration {
                    parameter: name.into(),
                    reason: "window must be positive".into(),
                });
            }
        }
        if self.unit_limit == 0 {
            return Err(TurtleError::InvalidConfiguration {
                parameter: "unit_limit".into(),
                reason: "must be at least 1".into(),
            });
        }
        if !(self.risk_level > 0.0) || !self.risk_level.is_finite() {
            return Err(TurtleError::InvalidConfiguration {
                parameter: "risk_level".into(),
                reason: "must be positive".into(),
            });
        }
        if !(self.risk_fraction > 0.0) || !self.risk_fraction.is_finite() {
            return Err(TurtleError::InvalidConfiguration {
                parameter: "risk_fraction".into(),
                reason: "must be positive".into(),
            });
        }
        if !(self.starting_cash > 0.0) || !self.starting_cash.is_finite() {
            return Err(TurtleError::InvalidConfiguration {
                parameter: "starting_cash".into(),
                reason: "must be positive".into(),
            });
        }
        if self.commission_rate < 0.0 || !self.commission_rate.is_finite() {
            return Err(TurtleError::InvalidConfiguration {
                parameter: "commission_rate".into(),
                reason: "must be non-negative".into(),
            });
        }
        Ok(())
    }

    /// The largest lookback; the run needs at least this many bars.
    pub fn max_window(&self) -> usize {
        [
            self.sys1_entry,
            self.sys1_exit,
            self.sys2_entry,
            self.sys2_exit,
            self.atr_window,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }

    pub fn channel_windows(&self) -> ChannelWindows {
        ChannelWindows {
            sys1_entry: self.sys1_entry,
            sys1_exit: self.sys1_exit,
            sys2_entry: self.sys2_entry,
            sys2_exit: self.sys2_exit,
            atr: self.atr_window,
        }
    }

    fn strategy_params(&self) -> StrategyParams {
        StrategyParams {
            risk_level: self.risk_level,
            risk_fraction: self.risk_fraction,
            unit_limit: self.unit_limit,
        }
    }
}

/// Everything a run produces: the final ledger (closed trades plus any
/// positions still open at the last bar) and the summary metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub ledger: Ledger,
    pub metrics: Metrics,
}

pub fn run_simulation(
    bars: &[Bar],
    config: &SimulationConfig,
) -> Result<SimulationResult, TurtleError> {
    config.validate()?;

    let minimum = config.max_window();
    if bars.len() < minimum {
        return Err(TurtleError::InsufficientData {
            bars: bars.len(),
            minimum,
        });
    }

    let channels = Channels::compute(bars, &config.channel_windows());
    let params = config.strategy_params();
    let mut ledger = Ledger::new(
        config.starting_cash,
        config.unit_limit,
        config.commission_rate,
    );
    let mut state = StrategyState::default();

    // First bar where every channel is valid on the previous bar.
    for index in minimum..bars.len() {
        let bar = &bars[index];
        let (actions, next_state) =
            strategy::decide(bar, index, &channels, &ledger, &params, state);
        state = next_state;
        apply_actions(&mut ledger, &actions, bar, index)?;

        let marked = ledger.marked_equity(bar.close);
        ledger.record_equity(bar.date, marked);
    }

    let metrics = Metrics::compute(&ledger);
    Ok(SimulationResult { ledger, metrics })
}

fn apply_actions(
    ledger: &mut Ledger,
    actions: &[Action],
    bar: &Bar,
    index: usize,
) -> Result<(), TurtleError> {
    for action in actions {
        match action {
            Action::Close { position_id } => {
                ledger.close_position(*position_id, bar.close, bar.date, index);
            }
            Action::Enter {
                direction,
                system,
                size,
                stop_loss,
            } => {
                ledger.open_position(
                    *direction, *system, bar.close, *size, *stop_loss, bar.date, index,
                )?;
            }
            Action::AddUnit {
                direction,
                system,
                size,
                stop_loss,
            } => {
                let id = ledger.open_position(
                    *direction, *system, bar.close, *size, *stop_loss, bar.date, index,
                )?;
                // Ratchet earlier units toward the new stop; mark_stop drops
                // adverse adjustments on its own.
                let earlier: Vec<u64> = ledger
                    .open_positions()
                    .iter()
                    .filter(|p| p.id != id)
                    .map(|p| p.id)
                    .collect();
                for position_id in earlier {
                    ledger.mark_stop(position_id, *stop_loss);
                }
            }
        }
    }
    Ok(())
}
