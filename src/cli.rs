//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::build_simulation_config;
use crate::domain::error::TurtleError;
use crate::domain::simulation::{run_simulation, SimulationConfig, SimulationResult};
use crate::ports::data_port::DataPort;

#[derive(Parser, Debug)]
#[command(name = "turtletrader", about = "Turtle trend-following backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a simulation over a CSV price series
    Backtest {
        /// INI file with a [simulation] section; defaults apply when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// CSV price series (date,open,high,low,close)
        #[arg(short, long)]
        data: PathBuf,
        /// Ignore bars before this date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Ignore bars after this date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,
    },
    /// Validate a configuration file without running
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            data,
            start,
            end,
        } => run_backtest(config.as_ref(), &data, start, end),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_simulation_config(path: Option<&PathBuf>) -> Result<SimulationConfig, TurtleError> {
    match path {
        None => Ok(SimulationConfig::default()),
        Some(path) => {
            let adapter =
                FileConfigAdapter::from_file(path).map_err(|e| TurtleError::ConfigParse {
                    file: path.display().to_string(),
                    reason: e.to_string(),
                })?;
            build_simulation_config(&adapter)
        }
    }
}

fn run_backtest(
    config_path: Option<&PathBuf>,
    data_path: &PathBuf,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> ExitCode {
    let config = match load_simulation_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("Loading bars from {}", data_path.display());
    let source = CsvAdapter::new(data_path.clone());
    let bars = match source.fetch_bars(start, end) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!(
        "Running simulation: {} bars, largest window {}",
        bars.len(),
        config.max_window(),
    );
    let result = match run_simulation(&bars, &config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    print_summary(&result);
    ExitCode::SUCCESS
}

fn print_summary(result: &SimulationResult) {
    let metrics = &result.metrics;

    eprintln!("\n=== Results ===");
    eprintln!("Total Return:     {:.2}%", metrics.total_return * 100.0);
    eprintln!("Annualized:       {:.2}%", metrics.annualized_return * 100.0);
    eprintln!("Sharpe Ratio:     {:.2}", metrics.sharpe_ratio);
    eprintln!("Sortino Ratio:    {:.2}", metrics.sortino_ratio);
    eprintln!("Max Drawdown:     -{:.1}%", metrics.max_drawdown * 100.0);
    eprintln!("Total Trades:     {}", metrics.total_trades);
    eprintln!("Win Rate:         {:.1}%", metrics.win_rate * 100.0);
    eprintln!("Profit Factor:    {:.2}", metrics.profit_factor);
    eprintln!("Exposure:         {:.1}%", metrics.exposure * 100.0);

    if !result.ledger.closed_trades().is_empty() {
        eprintln!("\n=== Closed Trades ===");
        for trade in result.ledger.closed_trades() {
            eprintln!(
                "  {} -> {}  {} {} {}u  {:+.2}",
                trade.entry_date,
                trade.exit_date,
                trade.system,
                trade.direction,
                trade.size,
                trade.pnl,
            );
        }
    }

    if !result.ledger.open_positions().is_empty() {
        eprintln!("\n=== Open Positions ===");
        for position in result.ledger.open_positions() {
            eprintln!(
                "  {}  {} {} {}u @ {:.2} (stop {:.2})",
                position.entry_date,
                position.system,
                position.direction,
                position.size,
                position.entry_price,
                position.stop_loss,
            );
        }
    }
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    match load_simulation_config(Some(config_path)) {
        Ok(config) => {
            eprintln!("Config validated successfully");
            eprintln!("  largest window: {} bars", config.max_window());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}
