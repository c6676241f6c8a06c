//! Domain error types.

use crate::domain::position::Direction;

/// Top-level error type for turtletrader.
///
/// Every error is raised synchronously at the point of violation and aborts
/// the current simulation run; there is no retry path.
#[derive(Debug, thiserror::Error)]
pub enum TurtleError {
    #[error("insufficient data: have {bars} bars, need at least {minimum}")]
    InsufficientData { bars: usize, minimum: usize },

    #[error("unit limit of {limit} open positions reached")]
    LimitExceeded { limit: usize },

    #[error("cannot open a {requested} position while a {open} position is open")]
    DirectionConflict {
        open: Direction,
        requested: Direction,
    },

    #[error("invalid configuration: {parameter}: {reason}")]
    InvalidConfiguration { parameter: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&TurtleError> for std::process::ExitCode {
    fn from(err: &TurtleError) -> Self {
        let code: u8 = match err {
            TurtleError::Io(_) => 1,
            TurtleError::ConfigParse { .. }
            | TurtleError::ConfigInvalid { .. }
            | TurtleError::InvalidConfiguration { .. } => 2,
            TurtleError::Data { .. } => 3,
            TurtleError::LimitExceeded { .. } | TurtleError::DirectionConflict { .. } => 4,
            TurtleError::InsufficientData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_message() {
        let err = TurtleError::InsufficientData {
            bars: 10,
            minimum: 55,
        };
        assert_eq!(
            err.to_string(),
            "insufficient data: have 10 bars, need at least 55"
        );
    }

    #[test]
    fn direction_conflict_message() {
        let err = TurtleError::DirectionConflict {
            open: Direction::Long,
            requested: Direction::Short,
        };
        assert_eq!(
            err.to_string(),
            "cannot open a short position while a long position is open"
        );
    }

    #[test]
    fn invalid_configuration_message() {
        let err = TurtleError::InvalidConfiguration {
            parameter: "atr_window".into(),
            reason: "must be positive".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid configuration: atr_window: must be positive"
        );
    }
}
