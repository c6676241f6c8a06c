//! End-to-end simulation tests.
//!
//! Covers:
//! - Full long and short round trips with hand-checked arithmetic
//! - Pyramiding up to the unit limit with stop ratcheting
//! - Open positions left at the end of a run
//! - Insufficient-data and accounting invariants
//! - Determinism over a long synthetic series

mod common;

use common::*;
use turtletrader::domain::error::TurtleError;
use turtletrader::domain::position::Direction;
use turtletrader::domain::simulation::{run_simulation, SimulationConfig};
use turtletrader::ports::data_port::DataPort;

mod full_simulation {
    use super::*;

    #[test]
    fn long_breakout_round_trip() {
        // Quiet prefix, breakout at index 5, exit-channel touch at index 7.
        let bars = quiet_plus(&[110.0, 111.0, 104.0]);
        let config = small_config();

        let result = run_simulation(&bars, &config).unwrap();

        assert!(result.ledger.is_flat());
        assert_eq!(result.ledger.closed_trades().len(), 1);

        let trade = &result.ledger.closed_trades()[0];
        assert_eq!(trade.direction, Direction::Long);
        assert_eq!(trade.entry_index, 5);
        assert_eq!(trade.exit_index, 7);
        // ATR(3) at entry is (4+3+12)/3; size = floor(0.02*10000 / (2*ATR)).
        assert_eq!(trade.size, 15);
        assert!((trade.entry_price - 110.0).abs() < f64::EPSILON);
        assert!((trade.exit_price - 104.0).abs() < f64::EPSILON);
        assert!((trade.pnl - (-90.0)).abs() < 1e-9);

        assert!((result.ledger.equity() - 9_910.0).abs() < 1e-9);
        assert_eq!(result.metrics.total_trades, 1);
        assert_eq!(result.metrics.trades_lost, 1);
        assert!((result.metrics.win_rate - 0.0).abs() < f64::EPSILON);
        // In market at indices 5 and 6 of the three recorded bars.
        assert!((result.metrics.exposure - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn short_breakdown_pyramids_and_ratchets_stops() {
        let bars = quiet_plus(&[90.0, 80.0, 86.0]);
        let config = small_config();

        let result = run_simulation(&bars, &config).unwrap();

        assert!(result.ledger.closed_trades().is_empty());
        assert_eq!(result.ledger.open_count(), 2);
        assert_eq!(result.ledger.direction(), Some(Direction::Short));

        let positions = result.ledger.open_positions();
        assert_eq!(positions[0].size, 17);
        assert_eq!(positions[1].size, 12);
        // The add at 80 computes stop 80 + 2*8 = 96 and pulls the first
        // unit's stop down from 101.33 to match.
        for position in positions {
            assert!((position.stop_loss - 96.0).abs() < 1e-9);
        }
    }

    #[test]
    fn pyramids_up_to_the_unit_limit() {
        let bars = quiet_plus(&[104.0, 109.0, 114.0, 119.0, 124.0, 129.0]);
        let config = small_config();

        let result = run_simulation(&bars, &config).unwrap();

        assert_eq!(result.ledger.open_count(), config.unit_limit);
        assert!(result.ledger.closed_trades().is_empty());
        for point in &result.ledger.equity_curve {
            assert!(point.open_units <= config.unit_limit);
        }
        assert_eq!(
            result.ledger.equity_curve.last().unwrap().open_units,
            config.unit_limit
        );
        // Fully invested from the first breakout bar onwards.
        assert!((result.metrics.exposure - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn open_positions_excluded_from_realized_stats() {
        let bars = quiet_plus(&[110.0]);
        let result = run_simulation(&bars, &small_config()).unwrap();

        assert_eq!(result.ledger.open_count(), 1);
        assert_eq!(result.metrics.total_trades, 0);
        assert!((result.metrics.total_return - 0.0).abs() < 1e-9);
        assert!(result.metrics.exposure > 0.0);
    }
}

mod error_handling {
    use super::*;

    #[test]
    fn too_short_series_aborts_with_insufficient_data() {
        let bars = make_bars(&QUIET[..4]);
        let err = run_simulation(&bars, &small_config()).unwrap_err();
        assert!(matches!(
            err,
            TurtleError::InsufficientData {
                bars: 4,
                minimum: 5,
            }
        ));
    }

    #[test]
    fn default_config_needs_the_sys2_window() {
        let closes: Vec<f64> = (0..54).map(|i| 100.0 + (i as f64 * 0.5).sin()).collect();
        let bars = make_bars(&closes);

        let err = run_simulation(&bars, &SimulationConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            TurtleError::InsufficientData {
                bars: 54,
                minimum: 55,
            }
        ));
    }

    #[test]
    fn invalid_config_aborts_before_touching_data() {
        let bars = quiet_plus(&[110.0]);
        let config = SimulationConfig {
            risk_fraction: 0.0,
            ..small_config()
        };

        let err = run_simulation(&bars, &config).unwrap_err();
        assert!(matches!(err, TurtleError::InvalidConfiguration { .. }));
    }
}

mod accounting {
    use super::*;

    fn wavy_closes(len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| 100.0 + 20.0 * (i as f64 * 0.15).sin() + 0.1 * i as f64)
            .collect()
    }

    #[test]
    fn equity_equals_starting_cash_plus_realized_pnl() {
        let bars = make_bars(&wavy_closes(200));
        let config = SimulationConfig::default();

        let result = run_simulation(&bars, &config).unwrap();

        let realized: f64 = result.ledger.closed_trades().iter().map(|t| t.pnl).sum();
        assert!((result.ledger.equity() - (config.starting_cash + realized)).abs() < 1e-6);
    }

    #[test]
    fn identical_runs_produce_identical_reports() {
        let bars = make_bars(&wavy_closes(200));
        let config = SimulationConfig::default();

        let first = run_simulation(&bars, &config).unwrap();
        let second = run_simulation(&bars, &config).unwrap();

        assert_eq!(first.ledger, second.ledger);
        assert_eq!(first.metrics, second.metrics);
    }

    #[test]
    fn commission_reduces_realized_pnl() {
        let bars = quiet_plus(&[110.0, 111.0, 104.0]);
        let free = small_config();
        let costly = SimulationConfig {
            commission_rate: 0.002,
            ..small_config()
        };

        let without = run_simulation(&bars, &free).unwrap();
        let with = run_simulation(&bars, &costly).unwrap();

        assert_eq!(without.ledger.closed_trades().len(), 1);
        assert_eq!(with.ledger.closed_trades().len(), 1);
        let expected_commission = 0.002 * 15.0 * (110.0 + 104.0);
        let gross = without.ledger.closed_trades()[0].pnl;
        let net = with.ledger.closed_trades()[0].pnl;
        assert!((gross - net - expected_commission).abs() < 1e-9);
    }
}

mod data_port {
    use super::*;

    #[test]
    fn pipeline_runs_through_a_data_port() {
        let port = MockDataPort::new(quiet_plus(&[110.0, 111.0, 104.0]));

        let bars = port.fetch_bars(None, None).unwrap();
        let result = run_simulation(&bars, &small_config()).unwrap();

        assert_eq!(result.ledger.closed_trades().len(), 1);
    }

    #[test]
    fn date_range_filters_the_table() {
        let port = MockDataPort::new(quiet_plus(&[110.0, 111.0, 104.0]));

        let bars = port.fetch_bars(Some(day(1)), Some(day(6))).unwrap();
        assert_eq!(bars.len(), 6);
        assert_eq!(bars.first().unwrap().date, day(1));
        assert_eq!(bars.last().unwrap().date, day(6));
    }
}
