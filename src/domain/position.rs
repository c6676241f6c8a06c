//! Position and closed-trade records.

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// +1.0 for long, -1.0 for short; the sign of favorable price movement.
    pub fn sign(&self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Long => Direction::Short,
            Direction::Short => Direction::Long,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "long"),
            Direction::Short => write!(f, "short"),
        }
    }
}

/// Which breakout system opened a unit. A unit exits on its own system's
/// exit channel: S1 on the shorter channel, S2 on the longer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum System {
    One,
    Two,
}

impl fmt::Display for System {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            System::One => write!(f, "S1"),
            System::Two => write!(f, "S2"),
        }
    }
}

/// One open unit. Owned exclusively by the ledger; mutated only through
/// stop adjustment, removed only by close.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub id: u64,
    pub direction: Direction,
    pub system: System,
    pub size: u64,
    pub entry_price: f64,
    pub entry_date: NaiveDate,
    pub entry_index: usize,
    pub stop_loss: f64,
}

impl Position {
    pub fn is_stop_breached(&self, price: f64) -> bool {
        match self.direction {
            Direction::Long => price <= self.stop_loss,
            Direction::Short => price >= self.stop_loss,
        }
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        (price - self.entry_price) * self.size as f64 * self.direction.sign()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClosedTrade {
    pub direction: Direction,
    pub system: System,
    pub size: u64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub entry_index: usize,
    pub exit_index: usize,
    pub pnl: f64,
}
