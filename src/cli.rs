//! CLI definition and dispatch.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use crate::adapters::best_result_file::BestResultFile;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{evaluate, BacktestResult};
use crate::domain::calendar::date_of;
use crate::domain::config_validation::{
    best_result_path, build_backtest_config, build_data_config, build_param_grid,
    build_strategy_params, build_sweep_config, validate_all,
};
use crate::domain::error::SweepError;
use crate::domain::indicator_store::IndicatorStore;
use crate::domain::metrics::Metrics;
use crate::domain::sweep::{run_sweep, SweepSummary};
use crate::domain::universe::{load_universe, LoadedUniverse};
use crate::ports::config_port::ConfigPort;
use crate::ports::result_port::BestResultPort;

#[derive(Parser, Debug)]
#[command(
    name = "sweeptrader",
    about = "Multi-asset long-only backtester with parameter sweeps"
)]
pub struct Cli {
    /// Verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay a single parameter tuple and print its metrics
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Evaluate every tuple of the configured grid and keep the best
    Sweep {
        #[arg(short, long)]
        config: PathBuf,
        /// Overrides [sweep] best_result_file
        #[arg(long)]
        best_file: Option<PathBuf>,
    },
    /// Check a configuration without loading data
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the bars available for each configured asset
    Info {
        #[arg(short, long)]
        config: PathBuf,
    },
}

impl Cli {
    pub fn init_logging(&self) {
        let level = match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };

        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(false)
            .with_writer(std::io::stderr)
            .finish();

        // a subscriber may already be installed when run from tests
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}

pub fn run(cli: Cli) -> ExitCode {
    cli.init_logging();

    let result = match &cli.command {
        Command::Backtest { config } => run_backtest(config),
        Command::Sweep { config, best_file } => run_sweep_command(config, best_file.as_deref()),
        Command::Validate { config } => run_validate(config),
        Command::Info { config } => run_info(config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, SweepError> {
    eprintln!("Loading config from {}", path.display());
    FileConfigAdapter::from_file(path)
}

/// Load every configured asset from the `[data]` directory.
pub fn load_market_data(config: &dyn ConfigPort) -> Result<LoadedUniverse, SweepError> {
    let data_config = build_data_config(config)?;
    let adapter = CsvAdapter::new(data_config.directory, data_config.delimiter);
    let universe = load_universe(&adapter, &data_config.assets, data_config.min_bars)?;
    for skipped in &universe.skipped {
        eprintln!("warning: skipping {} ({:?})", skipped.asset, skipped.reason);
    }
    Ok(universe)
}

/// Replay the single configured tuple.
pub fn backtest(config: &dyn ConfigPort) -> Result<BacktestResult, SweepError> {
    let bt_config = build_backtest_config(config)?;
    let params = build_strategy_params(config)?;
    let universe = load_market_data(config)?;

    info!(%params, assets = universe.data.asset_count(), bars = universe.data.len(), "running backtest");
    let store = IndicatorStore::new();
    Ok(evaluate(&universe.data, &store, &params, &bt_config))
}

/// Run the configured grid. When a best-result file is configured (or given),
/// the winner is persisted if it improves on what the file holds.
pub fn sweep(
    config: &dyn ConfigPort,
    best_file_override: Option<&Path>,
) -> Result<SweepSummary, SweepError> {
    let bt_config = build_backtest_config(config)?;
    let mut grid = build_param_grid(config)?;
    let sweep_config = build_sweep_config(config)?;
    let best_path = best_file_override
        .map(Path::to_path_buf)
        .or_else(|| best_result_path(config));

    let universe = load_market_data(config)?;
    if sweep_config.shuffle {
        grid.shuffle(sweep_config.seed);
    }

    let summary = run_sweep(&universe.data, &grid, &bt_config, &sweep_config);

    if let (Some(best), Some(path)) = (&summary.best, best_path) {
        let file = BestResultFile::new(path.clone());
        if file.persist_if_better(&best.result, best.rank_value)? {
            eprintln!("Best result written to: {}", path.display());
        } else {
            warn!(path = %path.display(), "stored best result not improved");
        }
    }
    Ok(summary)
}

fn run_backtest(config_path: &Path) -> Result<(), SweepError> {
    let adapter = load_config(config_path)?;
    let result = backtest(&adapter)?;

    eprintln!("\n=== {} ===", result.params);
    eprintln!("Max Open Trades:  {}", result.max_open_trades);
    eprint!("{}", format_metrics(&result.metrics));
    Ok(())
}

fn run_sweep_command(config_path: &Path, best_file: Option<&Path>) -> Result<(), SweepError> {
    let adapter = load_config(config_path)?;
    let summary = sweep(&adapter, best_file)?;

    eprintln!(
        "\nTested {} runs, {} accepted",
        summary.tested, summary.accepted
    );
    match &summary.best {
        Some(best) => {
            eprintln!("\n=== Best: {} ===", best.result.params);
            eprintln!("Rank Value:       {:.4}", best.rank_value);
            eprintln!("Max Open Trades:  {}", best.result.max_open_trades);
            eprint!("{}", format_metrics(&best.result.metrics));
        }
        None => eprintln!("No run passed the acceptance thresholds"),
    }
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), SweepError> {
    let adapter = load_config(config_path)?;
    validate_all(&adapter)?;

    let grid = build_param_grid(&adapter)?;
    let sweep_config = build_sweep_config(&adapter)?;
    eprintln!("Configuration is valid");
    eprintln!("  Strategy:         {}", grid.family);
    eprintln!("  Valid tuples:     {}", grid.len());
    eprintln!(
        "  Sweep runs:       {}",
        grid.len() * sweep_config.max_open_trades.len()
    );
    Ok(())
}

fn run_info(config_path: &Path) -> Result<(), SweepError> {
    let adapter = load_config(config_path)?;
    let universe = load_market_data(&adapter)?;
    let data = &universe.data;

    eprintln!("Timeline: {} bars", data.len());
    for series in &data.series {
        let first = data.timeline[series.start_index];
        let last = data.timeline[data.len() - 1];
        eprintln!(
            "  {}: {} bars, starts at index {}, {} to {}",
            series.asset,
            series.real_bar_count(),
            series.start_index,
            date_of(first),
            date_of(last),
        );
    }
    Ok(())
}

pub fn format_metrics(m: &Metrics) -> String {
    format!(
        "Final Equity:     {:.2}\n\
         Gain:             {:.2}%\n\
         Win Rate:         {:.1}%\n\
         Max Drawdown:     {:.2}%\n\
         DDC:              {:.2}\n\
         Score:            {:.4}\n\
         Calmar:           {:.4}\n\
         Calmar (monthly): {:.4}\n\
         Gain / DDC:       {:.4}\n\
         Trades:           {} ({} won, {} lost)\n\
         Fees:             {:.2}\n",
        m.final_equity,
        m.gain_pct,
        m.win_rate_pct,
        m.max_drawdown_pct,
        m.ddc,
        m.score,
        m.calmar_ratio,
        m.calmar_ratio_monthly,
        m.gain_over_ddc,
        m.trades_entered,
        m.profitable_exits,
        m.losing_exits,
        m.total_fees,
    )
}
