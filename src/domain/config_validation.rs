//! Configuration loading and validation.
//!
//! Reads the `[simulation]` section of a [`ConfigPort`] into a
//! [`SimulationConfig`]. Absent keys take the built-in defaults; present
//! keys must parse, and the assembled config must pass range validation —
//! a malformed file aborts instead of silently producing an empty report.

use std::str::FromStr;

use crate::domain::error::TurtleError;
use crate::domain::simulation::SimulationConfig;
use crate::ports::config_port::ConfigPort;

const SECTION: &str = "simulation";

pub fn build_simulation_config(config: &dyn ConfigPort) -> Result<SimulationConfig, TurtleError> {
    let defaults = SimulationConfig::default();
    let built = SimulationConfig {
        sys1_entry: get_or(config, "sys1_entry", defaults.sys1_entry)?,
        sys1_exit: get_or(config, "sys1_exit", defaults.sys1_exit)?,
        sys2_entry: get_or(config, "sys2_entry", defaults.sys2_entry)?,
        sys2_exit: get_or(config, "sys2_exit", defaults.sys2_exit)?,
        atr_window: get_or(config, "atr_window", defaults.atr_window)?,
        risk_level: get_or(config, "risk_level", defaults.risk_level)?,
        risk_fraction: get_or(config, "risk_fraction", defaults.risk_fraction)?,
        unit_limit: get_or(config, "unit_limit", defaults.unit_limit)?,
        starting_cash: get_or(config, "starting_cash", defaults.starting_cash)?,
        commission_rate: get_or(config, "commission_rate", defaults.commission_rate)?,
    };
    built.validate()?;
    Ok(built)
}

fn get_or<T: FromStr>(
    config: &dyn ConfigPort,
    key: &str,
    default: T,
) -> Result<T, TurtleError> {
    match config.get_string(SECTION, key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| TurtleError::ConfigInvalid {
                section: SECTION.to_string(),
                key: key.to_string(),
                reason: format!("cannot parse {:?}", raw),
            }),
    }
}
