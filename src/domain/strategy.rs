//! Turtle strategy decision logic.
//!
//! [`decide`] is a pure function of the current bar, the channel/ATR state,
//! the ledger's open positions, and the threaded [`StrategyState`]. It emits
//! actions for the simulation loop to apply; it never mutates anything.
//!
//! # Evaluation order per bar
//!
//! 1. Exits: every open position whose stop is breached or whose system's
//!    exit channel is touched closes entirely.
//! 2. Entries, only when flat after the exit check: system-1 breakout first
//!    (subject to the last-trade filter), then system 2 (unfiltered).
//! 3. Pyramiding, only while positioned below the unit limit: one more unit
//!    once price has moved a full ATR beyond the newest unit's entry.
//!
//! A breakout compares the close against the channel value of the previous
//! bar — the rolling extreme over the lookback excluding the current bar —
//! never by exact equality against a window that already contains the close.

use crate::domain::bar::Bar;
use crate::domain::indicator::atr::average_true_range;
use crate::domain::indicator::rolling::{rolling_max, rolling_min};
use crate::domain::indicator::IndicatorSeries;
use crate::domain::ledger::Ledger;
use crate::domain::position::{Direction, System};

/// Lookback windows for the channel set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelWindows {
    pub sys1_entry: usize,
    pub sys1_exit: usize,
    pub sys2_entry: usize,
    pub sys2_exit: usize,
    pub atr: usize,
}

/// The precomputed indicator state the strategy reads: entry and exit
/// channels for both systems plus the ATR, all bar-aligned.
#[derive(Debug, Clone, PartialEq)]
pub struct Channels {
    pub sys1_long: IndicatorSeries,
    pub sys1_short: IndicatorSeries,
    pub sys1_exit_long: IndicatorSeries,
    pub sys1_exit_short: IndicatorSeries,
    pub sys2_long: IndicatorSeries,
    pub sys2_short: IndicatorSeries,
    pub sys2_exit_long: IndicatorSeries,
    pub sys2_exit_short: IndicatorSeries,
    pub atr: IndicatorSeries,
}

impl Channels {
    pub fn compute(bars: &[Bar], windows: &ChannelWindows) -> Self {
        Channels {
            sys1_long: rolling_max(bars, windows.sys1_entry),
            sys1_short: rolling_min(bars, windows.sys1_entry),
            sys1_exit_long: rolling_min(bars, windows.sys1_exit),
            sys1_exit_short: rolling_max(bars, windows.sys1_exit),
            sys2_long: rolling_max(bars, windows.sys2_entry),
            sys2_short: rolling_min(bars, windows.sys2_entry),
            sys2_exit_long: rolling_min(bars, windows.sys2_exit),
            sys2_exit_short: rolling_max(bars, windows.sys2_exit),
            atr: average_true_range(bars, windows.atr),
        }
    }
}

/// Strategy parameters the decision function needs beyond the channels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategyParams {
    pub risk_level: f64,
    pub risk_fraction: f64,
    pub unit_limit: usize,
}

/// Strategy state threaded through the simulation loop: one value in and
/// one value out of every decision step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StrategyState {
    /// Whether the most recently closed system-1 unit was a winner. A
    /// winning S1 trade suppresses the next S1 breakout entry; system 2
    /// carries no filter.
    pub last_s1_win: bool,
}

/// An instruction for the simulation loop to apply to the ledger.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Close an open position entirely at the current close.
    Close { position_id: u64 },
    /// Open the first unit of a new position stack.
    Enter {
        direction: Direction,
        system: System,
        size: u64,
        stop_loss: f64,
    },
    /// Add one unit to the existing stack. Earlier units' stops ratchet
    /// toward the new unit's stop.
    AddUnit {
        direction: Direction,
        system: System,
        size: u64,
        stop_loss: f64,
    },
}

/// Unit size: floor(risk_fraction * equity / (risk_level * atr)).
/// A size of zero means no trade.
pub fn unit_size(risk_fraction: f64, equity: f64, risk_level: f64, atr: f64) -> u64 {
    let risk_per_unit = risk_level * atr;
    if risk_per_unit <= 0.0 || equity <= 0.0 {
        return 0;
    }
    let units = (risk_fraction * equity / risk_per_unit).floor();
    if units.is_finite() && units > 0.0 {
        units as u64
    } else {
        0
    }
}

/// Stop distance is `risk_level` ATRs against the position.
pub fn stop_price(direction: Direction, entry: f64, risk_level: f64, atr: f64) -> f64 {
    entry - direction.sign() * risk_level * atr
}

/// Channel value over the lookback ending at the previous bar.
fn prev_value(series: &IndicatorSeries, index: usize) -> Option<f64> {
    index.checked_sub(1).and_then(|i| series.value_at(i))
}

pub fn decide(
    bar: &Bar,
    index: usize,
    channels: &Channels,
    ledger: &Ledger,
    params: &StrategyParams,
    state: StrategyState,
) -> (Vec<Action>, StrategyState) {
    let price = bar.close;
    let mut actions = Vec::new();
    let mut next_state = state;

    // 1. Exits.
    let mut closing: Vec<u64> = Vec::new();
    for position in ledger.open_positions() {
        let exit_channel = match (position.direction, position.system) {
            (Direction::Long, System::One) => prev_value(&channels.sys1_exit_long, index),
            (Direction::Long, System::Two) => prev_value(&channels.sys2_exit_long, index),
            (Direction::Short, System::One) => prev_value(&channels.sys1_exit_short, index),
            (Direction::Short, System::Two) => prev_value(&channels.sys2_exit_short, index),
        };
        let channel_touched = exit_channel.is_some_and(|c| match position.direction {
            Direction::Long => price <= c,
            Direction::Short => price >= c,
        });

        if position.is_stop_breached(price) || channel_touched {
            actions.push(Action::Close {
                position_id: position.id,
            });
            closing.push(position.id);
            if position.system == System::One {
                next_state.last_s1_win =
                    (price - position.entry_price) * position.direction.sign() > 0.0;
            }
        }
    }

    let remaining = ledger.open_count() - closing.len();
    let Some(atr) = channels.atr.value_at(index).filter(|a| *a > 0.0) else {
        return (actions, next_state);
    };

    if remaining == 0 {
        // 2. Entries. Equity is marked at the current close for sizing.
        let equity = ledger.marked_equity(price);
        let size = unit_size(params.risk_fraction, equity, params.risk_level, atr);
        if size == 0 {
            return (actions, next_state);
        }

        let breakout_up =
            |series: &IndicatorSeries| prev_value(series, index).is_some_and(|c| price >= c);
        let breakout_down =
            |series: &IndicatorSeries| prev_value(series, index).is_some_and(|c| price <= c);

        // The filter reads the post-exit state: an S1 unit closed earlier
        // this bar counts as the previous S1 trade.
        let entry = if breakout_up(&channels.sys1_long) && !next_state.last_s1_win {
            Some((Direction::Long, System::One))
        } else if breakout_down(&channels.sys1_short) && !next_state.last_s1_win {
            Some((Direction::Short, System::One))
        } else if breakout_up(&channels.sys2_long) {
            Some((Direction::Long, System::Two))
        } else if breakout_down(&channels.sys2_short) {
            Some((Direction::Short, System::Two))
        } else {
            None
        };

        if let Some((direction, system)) = entry {
            actions.push(Action::Enter {
                direction,
                system,
                size,
                stop_loss: stop_price(direction, price, params.risk_level, atr),
            });
        }
    } else if remaining < params.unit_limit {
        // 3. Pyramiding off the newest unit that survives this bar's exits.
        let newest = ledger
            .open_positions()
            .iter()
            .rev()
            .find(|p| !closing.contains(&p.id));
        if let Some(unit) = newest {
            let favorable = match unit.direction {
                Direction::Long => price >= unit.entry_price + atr,
                Direction::Short => price <= unit.entry_price - atr,
            };
            if favorable {
                let equity = ledger.marked_equity(price);
                let size = unit_size(params.risk_fraction, equity, params.risk_level, atr);
                if size > 0 {
                    actions.push(Action::AddUnit {
                        direction: unit.direction,
                        system: unit.system,
                        size,
                        stop_loss: stop_price(unit.direction, price, params.risk_level, atr),
                    });
                }
            }
        }
    }

    (actions, next_state)
}
