//! Portfolio replay over an aligned multi-asset timeline.
//!
//! One run walks every bar once. Per asset the close decision is applied before
//! the open decision, so an asset closed on a bar can be reopened on that same bar.
//! Every position still open on the last bar is liquidated at its close.

use std::fmt;
use std::str::FromStr;

use tracing::trace;

use super::calendar::month_key;
use super::error::SweepError;
use super::execution::{enter_long, exit_position, ExecutionConfig};
use super::indicator_store::IndicatorStore;
use super::metrics::Metrics;
use super::portfolio::Portfolio;
use super::price_series::MarketData;
use super::strategies::StrategyParams;
use super::strategy::{BarContext, IndicatorSet, Strategy};

/// When the equity curve is sampled in addition to bars with a closed trade and the last bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EquitySampling {
    #[default]
    OnClose,
    /// Also on the first bar of every calendar month.
    Monthly,
}

impl FromStr for EquitySampling {
    type Err = SweepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "on_close" => Ok(EquitySampling::OnClose),
            "monthly" => Ok(EquitySampling::Monthly),
            other => Err(SweepError::invalid(
                "backtest",
                "equity_sampling",
                format!("expected on_close or monthly, got '{other}'"),
            )),
        }
    }
}

impl fmt::Display for EquitySampling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EquitySampling::OnClose => f.write_str("on_close"),
            EquitySampling::Monthly => f.write_str("monthly"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    pub fee_pct: f64,
    pub max_open_trades: usize,
    /// Bars after an asset's first real bar before it may trade.
    pub warmup_bars: usize,
    pub sampling: EquitySampling,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: 1000.0,
            fee_pct: 0.0,
            max_open_trades: 1,
            warmup_bars: 0,
            sampling: EquitySampling::OnClose,
        }
    }
}

impl BacktestConfig {
    pub fn execution(&self) -> ExecutionConfig {
        ExecutionConfig {
            fee_pct: self.fee_pct,
            max_open_trades: self.max_open_trades,
        }
    }
}

/// Final state of one replay.
#[derive(Debug, Clone)]
pub struct SimulationOutcome {
    pub portfolio: Portfolio,
    /// First bar index that was replayed.
    pub first_index: usize,
    pub bars_simulated: usize,
}

/// Replay `strategy` over `data`.
///
/// Indicators come from `store`, so repeated runs over the same data reuse them.
/// Assets are skipped until `start_index + warmup_bars`; the replay starts one bar
/// after the earliest such index.
pub fn run_backtest(
    data: &MarketData,
    store: &IndicatorStore,
    strategy: &dyn Strategy,
    config: &BacktestConfig,
) -> SimulationOutcome {
    let execution = config.execution();
    let mut portfolio = Portfolio::new(config.initial_capital);

    let tradable: Vec<usize> = data
        .series
        .iter()
        .map(|s| s.start_index + config.warmup_bars)
        .collect();
    let first_index = tradable.iter().min().map_or(data.len(), |&i| i + 1);

    if data.is_empty() || first_index >= data.len() {
        return SimulationOutcome {
            portfolio,
            first_index,
            bars_simulated: 0,
        };
    }

    let kinds = strategy.required_indicators();
    let indicator_sets: Vec<IndicatorSet> = (0..data.asset_count())
        .map(|asset| {
            kinds
                .iter()
                .map(|&kind| (kind, store.get_or_compute(data, asset, kind)))
                .collect()
        })
        .collect();

    let last = data.len() - 1;
    let mut prices = vec![0.0; data.asset_count()];

    for i in first_index..=last {
        let timestamp = data.timeline[i];
        let is_last = i == last;
        let mut closed_any = false;

        for (asset, series) in data.series.iter().enumerate() {
            prices[asset] = series.bars[i].close;
            if i < tradable[asset] {
                continue;
            }
            let ctx = BarContext::new(i, series, &indicator_sets[asset]);

            let should_exit = match portfolio.get_position_mut(asset) {
                Some(position) => {
                    strategy.on_bar(&ctx, position);
                    is_last || strategy.should_close(&ctx, position)
                }
                None => false,
            };
            if should_exit
                && exit_position(&mut portfolio, asset, ctx.close(), timestamp, &execution).is_some()
            {
                closed_any = true;
            }

            if !is_last
                && !portfolio.has_position(asset)
                && portfolio.active_open_count() < execution.max_open_trades
                && strategy.should_open(&ctx)
            {
                let snapshot = strategy.entry_snapshot(&ctx);
                enter_long(&mut portfolio, asset, ctx.close(), timestamp, snapshot, &execution);
            }
            debug_assert!(portfolio.active_open_count() <= execution.max_open_trades);
        }

        let month_crossed = config.sampling == EquitySampling::Monthly
            && month_key(data.timeline[i - 1]) != month_key(timestamp);
        if closed_any || is_last || month_crossed {
            let equity = portfolio.total_equity(&prices);
            portfolio.record_equity(timestamp, equity);
        }
    }

    trace!(
        strategy = strategy.name(),
        trades = portfolio.trades_entered,
        final_equity = portfolio.final_equity(),
        "replay finished"
    );

    SimulationOutcome {
        portfolio,
        first_index,
        bars_simulated: data.len() - first_index,
    }
}

/// Scored outcome of one parameter tuple.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub params: StrategyParams,
    pub max_open_trades: usize,
    pub metrics: Metrics,
}

impl BacktestResult {
    pub fn from_outcome(
        params: StrategyParams,
        config: &BacktestConfig,
        outcome: &SimulationOutcome,
    ) -> Self {
        BacktestResult {
            params,
            max_open_trades: config.max_open_trades,
            metrics: Metrics::compute(&outcome.portfolio),
        }
    }
}

/// Replay one parameter tuple and score it.
pub fn evaluate(
    data: &MarketData,
    store: &IndicatorStore,
    params: &StrategyParams,
    config: &BacktestConfig,
) -> BacktestResult {
    let outcome = run_backtest(data, store, params.as_strategy(), config);
    BacktestResult::from_outcome(params.clone(), config, &outcome)
}
