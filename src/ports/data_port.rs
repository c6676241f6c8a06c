//! Data access port trait.

use chrono::NaiveDate;

use crate::domain::bar::Bar;
use crate::domain::error::TurtleError;

/// Produces the ordered bar table the simulation consumes. Implementations
/// own gap handling (forward-fill etc.); the engine assumes a clean,
/// chronologically sorted series.
pub trait DataPort {
    fn fetch_bars(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Bar>, TurtleError>;
}
