//! Parameter sweep: grid expansion, parallel evaluation and best-result selection.
//!
//! Every (max_open_trades, parameter tuple) pair is one independent replay. Replays
//! run on the rayon pool and share the market data and one [`IndicatorStore`], so
//! an indicator needed by many tuples is computed once per asset.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use tracing::{debug, info};

use super::backtest::{evaluate, BacktestConfig, BacktestResult};
use super::error::SweepError;
use super::indicator_store::IndicatorStore;
use super::metrics::Metrics;
use super::price_series::MarketData;
use super::strategies::{StrategyFamily, StrategyParams};

/// Metric that orders accepted results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankBy {
    Score,
    #[default]
    Calmar,
    CalmarMonthly,
    GainOverDdc,
}

impl RankBy {
    pub fn value(&self, metrics: &Metrics) -> f64 {
        match self {
            RankBy::Score => metrics.score,
            RankBy::Calmar => metrics.calmar_ratio,
            RankBy::CalmarMonthly => metrics.calmar_ratio_monthly,
            RankBy::GainOverDdc => metrics.gain_over_ddc,
        }
    }
}

impl FromStr for RankBy {
    type Err = SweepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "score" => Ok(RankBy::Score),
            "calmar" => Ok(RankBy::Calmar),
            "calmar_monthly" => Ok(RankBy::CalmarMonthly),
            "gain_over_ddc" => Ok(RankBy::GainOverDdc),
            other => Err(SweepError::invalid(
                "sweep",
                "rank_by",
                format!("expected score, calmar, calmar_monthly or gain_over_ddc, got '{other}'"),
            )),
        }
    }
}

impl fmt::Display for RankBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RankBy::Score => "score",
            RankBy::Calmar => "calmar",
            RankBy::CalmarMonthly => "calmar_monthly",
            RankBy::GainOverDdc => "gain_over_ddc",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepConfig {
    pub max_open_trades: Vec<usize>,
    pub min_trades: usize,
    pub min_gain_pct: f64,
    pub max_gain_pct: f64,
    /// Runs whose drawdown reaches this percentage (e.g. -50) are rejected.
    pub min_max_drawdown_pct: f64,
    pub rank_by: RankBy,
    pub shuffle: bool,
    pub seed: u64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        SweepConfig {
            max_open_trades: vec![1],
            min_trades: 1,
            min_gain_pct: f64::NEG_INFINITY,
            max_gain_pct: f64::INFINITY,
            min_max_drawdown_pct: -100.0,
            rank_by: RankBy::Calmar,
            shuffle: false,
            seed: 0,
        }
    }
}

impl SweepConfig {
    /// Acceptance thresholds; a run without closed trades is never accepted.
    pub fn accepts(&self, metrics: &Metrics) -> bool {
        !metrics.is_no_trades()
            && metrics.trades_entered >= self.min_trades
            && metrics.gain_pct >= self.min_gain_pct
            && metrics.gain_pct <= self.max_gain_pct
            && metrics.max_drawdown_pct > self.min_max_drawdown_pct
    }
}

/// Candidate values for one named parameter.
pub type Axis = (String, Vec<f64>);

/// Valid parameter tuples of one strategy family, in evaluation order.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamGrid {
    pub family: StrategyFamily,
    tuples: Vec<StrategyParams>,
}

impl ParamGrid {
    /// Cartesian product of `axes`; parameters without an axis keep their default.
    /// Invalid tuples are dropped.
    pub fn build(family: StrategyFamily, axes: &[Axis]) -> Self {
        let axes: Vec<&Axis> = axes.iter().filter(|(_, values)| !values.is_empty()).collect();
        let mut tuples = Vec::new();
        let mut skipped = 0usize;
        let mut cursor = vec![0usize; axes.len()];

        loop {
            let values: HashMap<String, f64> = axes
                .iter()
                .zip(&cursor)
                .map(|((name, values), &i)| (name.clone(), values[i]))
                .collect();
            let params = StrategyParams::with_values(family, &values);
            if params.is_valid() {
                tuples.push(params);
            } else {
                skipped += 1;
            }

            // odometer over the axes, last axis fastest
            let mut position = axes.len();
            loop {
                if position == 0 {
                    debug!(%family, tuples = tuples.len(), skipped, "parameter grid built");
                    return ParamGrid { family, tuples };
                }
                position -= 1;
                cursor[position] += 1;
                if cursor[position] < axes[position].1.len() {
                    break;
                }
                cursor[position] = 0;
            }
        }
    }

    /// Deterministic permutation of the tuples.
    pub fn shuffle(&mut self, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        self.tuples.shuffle(&mut rng);
    }

    pub fn tuples(&self) -> &[StrategyParams] {
        &self.tuples
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedResult {
    pub rank_value: f64,
    pub result: BacktestResult,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepSummary {
    pub tested: usize,
    pub accepted: usize,
    pub best: Option<RankedResult>,
}

/// Evaluate every tuple for every `max_open_trades` value and keep the best accepted run.
///
/// Ties on the rank value keep the run that comes first in grid order.
pub fn run_sweep(
    data: &MarketData,
    grid: &ParamGrid,
    backtest: &BacktestConfig,
    sweep: &SweepConfig,
) -> SweepSummary {
    let store = IndicatorStore::new();
    let jobs: Vec<(usize, &StrategyParams)> = sweep
        .max_open_trades
        .iter()
        .flat_map(|&slots| grid.tuples().iter().map(move |params| (slots, params)))
        .collect();
    let total = jobs.len();
    let progress_step = (total / 20).max(1);

    info!(
        family = %grid.family,
        tuples = grid.len(),
        runs = total,
        rank_by = %sweep.rank_by,
        "starting sweep"
    );

    let done = AtomicUsize::new(0);
    let accepted = AtomicUsize::new(0);

    let best = jobs
        .par_iter()
        .enumerate()
        .filter_map(|(order, &(slots, params))| {
            let config = BacktestConfig {
                max_open_trades: slots,
                ..backtest.clone()
            };
            let result = evaluate(data, &store, params, &config);

            let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
            if finished % progress_step == 0 || finished == total {
                info!(finished, total, "sweep progress");
            }

            if !sweep.accepts(&result.metrics) {
                return None;
            }
            accepted.fetch_add(1, Ordering::Relaxed);
            let rank_value = sweep.rank_by.value(&result.metrics);
            debug!(%params, slots, rank_value, "accepted");
            Some((order, RankedResult { rank_value, result }))
        })
        .reduce_with(|a, b| if is_better(&b, &a) { b } else { a })
        .map(|(_, ranked)| ranked);

    let summary = SweepSummary {
        tested: total,
        accepted: accepted.into_inner(),
        best,
    };
    info!(
        tested = summary.tested,
        accepted = summary.accepted,
        store_series = store.len(),
        "sweep finished"
    );
    summary
}

fn is_better(candidate: &(usize, RankedResult), current: &(usize, RankedResult)) -> bool {
    let (candidate_order, candidate) = candidate;
    let (current_order, current) = current;
    if candidate.rank_value.is_nan() {
        return false;
    }
    if current.rank_value.is_nan() || candidate.rank_value > current.rank_value {
        return true;
    }
    candidate.rank_value == current.rank_value && candidate_order < current_order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::strategies::{BigWill, BuyAndHold};

    fn metrics(trades: usize, gain: f64, drawdown: f64) -> Metrics {
        Metrics {
            final_equity: 1000.0 * (1.0 + gain / 100.0),
            gain_pct: gain,
            win_rate_pct: 50.0,
            max_drawdown_pct: drawdown,
            ddc: 10.0,
            score: 1.0,
            calmar_ratio: 2.0,
            calmar_ratio_monthly: 3.0,
            gain_over_ddc: 4.0,
            trades_entered: trades,
            profitable_exits: trades / 2,
            losing_exits: trades - trades / 2,
            total_fees: 0.0,
        }
    }

    fn ranked(value: f64) -> RankedResult {
        RankedResult {
            rank_value: value,
            result: BacktestResult {
                params: StrategyParams::BuyAndHold(BuyAndHold),
                max_open_trades: 1,
                metrics: metrics(2, 1.0, -1.0),
            },
        }
    }

    #[test]
    fn rank_by_picks_metric() {
        let m = metrics(4, 10.0, -5.0);
        assert_eq!(RankBy::Score.value(&m), 1.0);
        assert_eq!(RankBy::Calmar.value(&m), 2.0);
        assert_eq!(RankBy::CalmarMonthly.value(&m), 3.0);
        assert_eq!(RankBy::GainOverDdc.value(&m), 4.0);
        assert_eq!("Calmar_Monthly".parse::<RankBy>().unwrap(), RankBy::CalmarMonthly);
        assert!("sharpe".parse::<RankBy>().is_err());
    }

    #[test]
    fn acceptance_thresholds() {
        let config = SweepConfig {
            min_trades: 10,
            min_gain_pct: 0.0,
            max_gain_pct: 500.0,
            min_max_drawdown_pct: -50.0,
            ..SweepConfig::default()
        };
        assert!(config.accepts(&metrics(10, 20.0, -30.0)));
        assert!(!config.accepts(&metrics(9, 20.0, -30.0)));
        assert!(!config.accepts(&metrics(10, -1.0, -30.0)));
        assert!(!config.accepts(&metrics(10, 600.0, -30.0)));
        assert!(!config.accepts(&metrics(10, 20.0, -50.0)));
        assert!(!config.accepts(&metrics(0, 0.0, 0.0)));
    }

    #[test]
    fn grid_is_cartesian_and_filtered() {
        let axes = vec![
            ("ao_fast".to_string(), vec![5.0, 10.0]),
            ("ao_slow".to_string(), vec![10.0, 20.0, 30.0]),
        ];
        let grid = ParamGrid::build(StrategyFamily::BigWill, &axes);
        // (10, 10) is dropped
        assert_eq!(grid.len(), 5);
        assert_eq!(
            grid.tuples()[0],
            StrategyParams::BigWill(BigWill {
                ao_fast: 5,
                ao_slow: 10,
                ..BigWill::default()
            })
        );
        assert_eq!(
            grid.tuples()[1],
            StrategyParams::BigWill(BigWill {
                ao_fast: 5,
                ao_slow: 20,
                ..BigWill::default()
            })
        );
    }

    #[test]
    fn grid_without_axes_is_the_default_tuple() {
        let grid = ParamGrid::build(StrategyFamily::BuyAndHold, &[]);
        assert_eq!(grid.tuples(), &[StrategyParams::BuyAndHold(BuyAndHold)]);
    }

    #[test]
    fn shuffle_is_deterministic() {
        let axes = vec![("ao_slow".to_string(), (6..40).map(f64::from).collect())];
        let mut a = ParamGrid::build(StrategyFamily::BigWill, &axes);
        let mut b = a.clone();
        let original = a.clone();
        a.shuffle(42);
        b.shuffle(42);
        assert_eq!(a, b);
        assert_ne!(a, original);
        assert_eq!(a.len(), original.len());
    }

    #[test]
    fn ties_keep_grid_order() {
        assert!(is_better(&(1, ranked(2.0)), &(5, ranked(2.0))));
        assert!(!is_better(&(5, ranked(2.0)), &(1, ranked(2.0))));
        assert!(is_better(&(5, ranked(3.0)), &(1, ranked(2.0))));
        assert!(!is_better(&(0, ranked(f64::NAN)), &(1, ranked(2.0))));
    }
}
