//! Open-position and closed-trade ledger.
//!
//! The ledger owns every position and the equity scalar; all mutation goes
//! through the operations here, so two invariants hold after every call:
//! the open set never exceeds `unit_limit`, and every open position shares
//! one direction.

use chrono::NaiveDate;

use crate::domain::error::TurtleError;
use crate::domain::position::{ClosedTrade, Direction, Position, System};

#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
    pub open_units: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    pub starting_cash: f64,
    pub unit_limit: usize,
    pub commission_rate: f64,
    pub equity_curve: Vec<EquityPoint>,
    equity: f64,
    open: Vec<Position>,
    closed: Vec<ClosedTrade>,
    next_id: u64,
}

impl Ledger {
    pub fn new(starting_cash: f64, unit_limit: usize, commission_rate: f64) -> Self {
        Ledger {
            starting_cash,
            unit_limit,
            commission_rate,
            equity_curve: Vec::new(),
            equity: starting_cash,
            open: Vec::new(),
            closed: Vec::new(),
            next_id: 1,
        }
    }

    /// Realized equity: starting cash plus the P&L of every closed trade.
    pub fn equity(&self) -> f64 {
        self.equity
    }

    /// Realized equity plus unrealized P&L of open positions at `price`.
    pub fn marked_equity(&self, price: f64) -> f64 {
        self.equity
            + self
                .open
                .iter()
                .map(|p| p.unrealized_pnl(price))
                .sum::<f64>()
    }

    /// Open positions in entry order; the last element is the newest unit.
    pub fn open_positions(&self) -> &[Position] {
        &self.open
    }

    pub fn closed_trades(&self) -> &[ClosedTrade] {
        &self.closed
    }

    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    pub fn is_flat(&self) -> bool {
        self.open.is_empty()
    }

    /// Direction shared by all open positions, if any are open.
    pub fn direction(&self) -> Option<Direction> {
        self.open.first().map(|p| p.direction)
    }

    pub fn position(&self, id: u64) -> Option<&Position> {
        self.open.iter().find(|p| p.id == id)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn open_position(
        &mut self,
        direction: Direction,
        system: System,
        price: f64,
        size: u64,
        stop_loss: f64,
        date: NaiveDate,
        index: usize,
    ) -> Result<u64, TurtleError> {
        if self.open.len() >= self.unit_limit {
            return Err(TurtleError::LimitExceeded {
                limit: self.unit_limit,
            });
        }
        if let Some(open_direction) = self.direction() {
            if open_direction != direction {
                return Err(TurtleError::DirectionConflict {
                    open: open_direction,
                    requested: direction,
                });
            }
        }

        let id = self.next_id;
        self.next_id += 1;
        self.open.push(Position {
            id,
            direction,
            system,
            size,
            entry_price: price,
            entry_date: date,
            entry_index: index,
            stop_loss,
        });
        Ok(id)
    }

    /// Close an open position entirely at `price`. Realized P&L is
    /// `(exit - entry) * size * sign(direction)` minus the round-trip
    /// commission, and is applied to equity before this returns.
    ///
    /// Returns `None` when no open position has this id.
    pub fn close_position(
        &mut self,
        id: u64,
        price: f64,
        date: NaiveDate,
        index: usize,
    ) -> Option<ClosedTrade> {
        let slot = self.open.iter().position(|p| p.id == id)?;
        let position = self.open.remove(slot);

        let size = position.size as f64;
        let commission = self.commission_rate * size * (position.entry_price + price);
        let pnl = (price - position.entry_price) * size * position.direction.sign() - commission;
        self.equity += pnl;

        let trade = ClosedTrade {
            direction: position.direction,
            system: position.system,
            size: position.size,
            entry_price: position.entry_price,
            exit_price: price,
            entry_date: position.entry_date,
            exit_date: date,
            entry_index: position.entry_index,
            exit_index: index,
            pnl,
        };
        self.closed.push(trade.clone());
        Some(trade)
    }

    /// Tighten a stop. Adjustments in the adverse direction (down for a
    /// long, up for a short) are ignored. Returns whether the stop moved.
    pub fn mark_stop(&mut self, id: u64, new_stop: f64) -> bool {
        let Some(position) = self.open.iter_mut().find(|p| p.id == id) else {
            return false;
        };
        let tightens = match position.direction {
            Direction::Long => new_stop > position.stop_loss,
            Direction::Short => new_stop < position.stop_loss,
        };
        if tightens {
            position.stop_loss = new_stop;
        }
        tightens
    }

    pub fn record_equity(&mut self, date: NaiveDate, equity: f64) {
        self.equity_curve.push(EquityPoint {
            date,
            equity,
            open_units: self.open.len(),
        });
    }
}
