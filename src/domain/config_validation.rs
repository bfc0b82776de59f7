//! Configuration validation.
//!
//! Every section is checked and turned into its typed form before a run starts,
//! so a bad value fails fast with the section and key that caused it.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::domain::backtest::{BacktestConfig, EquitySampling};
use crate::domain::error::SweepError;
use crate::domain::indicator::IndicatorType;
use crate::domain::strategies::{ParamKind, StrategyFamily, StrategyParams};
use crate::domain::sweep::{Axis, ParamGrid, RankBy, SweepConfig};
use crate::domain::universe::{parse_assets, DEFAULT_MIN_BARS};
use crate::ports::config_port::ConfigPort;

/// `[data]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct DataConfig {
    pub directory: PathBuf,
    pub assets: Vec<String>,
    pub delimiter: u8,
    pub min_bars: usize,
}

/// Check every section without running anything.
pub fn validate_all(config: &dyn ConfigPort) -> Result<(), SweepError> {
    build_data_config(config)?;
    build_backtest_config(config)?;
    build_param_grid(config)?;
    build_sweep_config(config)?;
    Ok(())
}

pub fn build_data_config(config: &dyn ConfigPort) -> Result<DataConfig, SweepError> {
    let directory = config
        .get_string("data", "directory")
        .ok_or_else(|| SweepError::missing("data", "directory"))?;
    let assets_raw = config
        .get_string("data", "assets")
        .ok_or_else(|| SweepError::missing("data", "assets"))?;
    let assets = parse_assets(&assets_raw)?;

    let delimiter = match config.get_string("data", "delimiter") {
        None => b';',
        Some(raw) => parse_delimiter(&raw)?,
    };
    let min_bars = read_usize(config, "data", "min_bars", DEFAULT_MIN_BARS)?;
    if min_bars < 2 {
        return Err(SweepError::invalid("data", "min_bars", "min_bars must be at least 2"));
    }

    Ok(DataConfig {
        directory: PathBuf::from(directory),
        assets,
        delimiter,
        min_bars,
    })
}

fn parse_delimiter(raw: &str) -> Result<u8, SweepError> {
    let raw = raw.trim();
    let value = match raw {
        "tab" | "\\t" => "\t",
        "comma" => ",",
        "semicolon" => ";",
        other => other,
    };
    match value.as_bytes() {
        [byte] if byte.is_ascii() => Ok(*byte),
        _ => Err(SweepError::invalid(
            "data",
            "delimiter",
            format!("delimiter must be a single ASCII character, got '{raw}'"),
        )),
    }
}

pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, SweepError> {
    let initial_capital = read_f64(config, "backtest", "initial_capital", 1000.0)?;
    if initial_capital <= 0.0 || !initial_capital.is_finite() {
        return Err(SweepError::invalid(
            "backtest",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }

    let fee_pct = read_f64(config, "backtest", "fee_pct", 0.0)?;
    if !(0.0..100.0).contains(&fee_pct) {
        return Err(SweepError::invalid(
            "backtest",
            "fee_pct",
            "fee_pct must be in [0, 100)",
        ));
    }

    let max_open_trades = read_usize(config, "backtest", "max_open_trades", 1)?;
    if max_open_trades == 0 {
        return Err(SweepError::invalid(
            "backtest",
            "max_open_trades",
            "max_open_trades must be at least 1",
        ));
    }

    let warmup_bars = read_usize(config, "backtest", "warmup_bars", 0)?;
    let sampling = match config.get_string("backtest", "equity_sampling") {
        None => EquitySampling::default(),
        Some(raw) => raw.parse()?,
    };

    Ok(BacktestConfig {
        initial_capital,
        fee_pct,
        max_open_trades,
        warmup_bars,
        sampling,
    })
}

pub fn build_strategy_family(config: &dyn ConfigPort) -> Result<StrategyFamily, SweepError> {
    config
        .get_string("strategy", "name")
        .ok_or_else(|| SweepError::missing("strategy", "name"))?
        .parse()
}

/// Parameter axes of the `[strategy]` section, in the family's parameter order.
pub fn build_axes(config: &dyn ConfigPort) -> Result<(StrategyFamily, Vec<Axis>), SweepError> {
    let family = build_strategy_family(config)?;
    let known = family.parameters();

    for key in config.keys("strategy") {
        if key != "name" && !known.iter().any(|(name, _)| *name == key) {
            return Err(SweepError::invalid(
                "strategy",
                &key,
                format!("unknown parameter for {family}"),
            ));
        }
    }

    let mut axes = Vec::new();
    for &(name, kind) in known {
        let Some(raw) = config.get_string("strategy", name) else {
            continue;
        };
        let values =
            parse_axis(&raw).map_err(|reason| SweepError::invalid("strategy", name, reason))?;
        for &value in &values {
            check_param_value(name, kind, value)
                .map_err(|reason| SweepError::invalid("strategy", name, reason))?;
        }
        axes.push((name.to_string(), values));
    }
    Ok((family, axes))
}

fn check_param_value(name: &str, kind: ParamKind, value: f64) -> Result<(), String> {
    if !value.is_finite() {
        return Err(format!("{value} is not a finite number"));
    }
    if kind == ParamKind::Period && (value < 1.0 || value.fract() != 0.0) {
        return Err(format!("{value} is not a positive whole number of bars"));
    }
    // the SuperTrend key keeps two decimals
    if name == "supertrend_multiplier" && !IndicatorType::supertrend_multiplier_is_exact(value) {
        return Err(format!("{value} is not a positive multiple of 0.01"));
    }
    Ok(())
}

/// Grid for `sweep`. Fails when no valid tuple remains.
pub fn build_param_grid(config: &dyn ConfigPort) -> Result<ParamGrid, SweepError> {
    let (family, axes) = build_axes(config)?;
    let grid = ParamGrid::build(family, &axes);
    if grid.is_empty() {
        return Err(SweepError::invalid(
            "strategy",
            "name",
            format!("no valid {family} parameter tuple in the configured ranges"),
        ));
    }
    Ok(grid)
}

/// The single tuple for `backtest`; every parameter must have exactly one value.
pub fn build_strategy_params(config: &dyn ConfigPort) -> Result<StrategyParams, SweepError> {
    let (family, axes) = build_axes(config)?;
    if let Some((name, values)) = axes.iter().find(|(_, values)| values.len() != 1) {
        return Err(SweepError::invalid(
            "strategy",
            name,
            format!("backtest needs a single value, got {}", values.len()),
        ));
    }
    let values: HashMap<String, f64> = axes
        .into_iter()
        .map(|(name, values)| (name, values[0]))
        .collect();
    let params = StrategyParams::with_values(family, &values);
    if !params.is_valid() {
        return Err(SweepError::invalid(
            "strategy",
            "name",
            format!("{params} is not a valid parameter tuple"),
        ));
    }
    Ok(params)
}

pub fn build_sweep_config(config: &dyn ConfigPort) -> Result<SweepConfig, SweepError> {
    let defaults = SweepConfig::default();

    let max_open_trades = match config.get_string("sweep", "max_open_trades") {
        Some(raw) => {
            let values = parse_axis(&raw)
                .map_err(|reason| SweepError::invalid("sweep", "max_open_trades", reason))?;
            let mut slots = Vec::with_capacity(values.len());
            for value in values {
                check_param_value("max_open_trades", ParamKind::Period, value)
                    .map_err(|reason| SweepError::invalid("sweep", "max_open_trades", reason))?;
                slots.push(value as usize);
            }
            slots
        }
        None => vec![read_usize(config, "backtest", "max_open_trades", 1)?.max(1)],
    };

    let min_gain_pct = read_f64(config, "sweep", "min_gain_pct", defaults.min_gain_pct)?;
    let max_gain_pct = read_f64(config, "sweep", "max_gain_pct", defaults.max_gain_pct)?;
    if min_gain_pct > max_gain_pct {
        return Err(SweepError::invalid(
            "sweep",
            "min_gain_pct",
            "min_gain_pct must not exceed max_gain_pct",
        ));
    }

    let min_max_drawdown_pct = read_f64(
        config,
        "sweep",
        "min_max_drawdown_pct",
        defaults.min_max_drawdown_pct,
    )?;
    if !(-100.0..=0.0).contains(&min_max_drawdown_pct) {
        return Err(SweepError::invalid(
            "sweep",
            "min_max_drawdown_pct",
            "min_max_drawdown_pct must be in [-100, 0]",
        ));
    }

    let rank_by = match config.get_string("sweep", "rank_by") {
        None => RankBy::default(),
        Some(raw) => raw.parse()?,
    };

    let seed = match config.get_string("sweep", "seed") {
        None => defaults.seed,
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|e| SweepError::invalid("sweep", "seed", e.to_string()))?,
    };

    Ok(SweepConfig {
        max_open_trades,
        min_trades: read_usize(config, "sweep", "min_trades", defaults.min_trades)?,
        min_gain_pct,
        max_gain_pct,
        min_max_drawdown_pct,
        rank_by,
        shuffle: config.get_bool("sweep", "shuffle", defaults.shuffle),
        seed,
    })
}

pub fn best_result_path(config: &dyn ConfigPort) -> Option<PathBuf> {
    config.get_string("sweep", "best_result_file").map(PathBuf::from)
}

/// Comma-separated values; each item is a number, `a..b` (end excluded) or
/// `a..=b` (end included), ranges taking an optional `:step` (default 1).
pub fn parse_axis(raw: &str) -> Result<Vec<f64>, String> {
    let mut values = Vec::new();
    for item in raw.split(',').map(str::trim) {
        if item.is_empty() {
            return Err("empty item in list".to_string());
        }
        match item.split_once("..") {
            None => values.push(parse_number(item)?),
            Some((start, rest)) => values.extend(parse_range(item, start, rest)?),
        }
    }
    Ok(values)
}

fn parse_range(item: &str, start: &str, rest: &str) -> Result<Vec<f64>, String> {
    let (inclusive, rest) = match rest.strip_prefix('=') {
        Some(rest) => (true, rest),
        None => (false, rest),
    };
    let (end, step) = match rest.split_once(':') {
        Some((end, step)) => (end, parse_integer(step)?),
        None => (rest, 1),
    };
    let start = parse_integer(start)?;
    let end = parse_integer(end)?;
    if step <= 0 {
        return Err(format!("range '{item}' needs a positive step"));
    }
    if start > end {
        return Err(format!("range '{item}' starts after it ends"));
    }

    let mut values = Vec::new();
    let mut v = start;
    while v < end || (inclusive && v == end) {
        values.push(v as f64);
        v += step;
    }
    if values.is_empty() {
        return Err(format!("range '{item}' is empty"));
    }
    Ok(values)
}

fn parse_number(raw: &str) -> Result<f64, String> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| format!("'{}' is not a number", raw.trim()))
}

fn parse_integer(raw: &str) -> Result<i64, String> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| format!("'{}' is not an integer", raw.trim()))
}

fn read_f64(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, SweepError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => parse_number(&raw).map_err(|reason| SweepError::invalid(section, key, reason)),
    }
}

fn read_usize(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, SweepError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<usize>().map_err(|_| {
            SweepError::invalid(
                section,
                key,
                format!("'{}' is not a non-negative integer", raw.trim()),
            )
        }),
    }
}
