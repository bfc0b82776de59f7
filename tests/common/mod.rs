#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use sweeptrader::domain::error::SweepError;
use sweeptrader::domain::portfolio::EquityPoint;
pub use sweeptrader::domain::ohlcv::Bar;
use sweeptrader::domain::price_series::{MarketData, PriceSeries};
use sweeptrader::ports::data_port::DataPort;

pub const DAY: i64 = 86_400;
/// 2021-01-01T00:00:00Z
pub const EPOCH_2021: i64 = 1_609_459_200;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, asset: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(asset.to_string(), bars);
        self
    }

    pub fn with_error(mut self, asset: &str, reason: &str) -> Self {
        self.errors.insert(asset.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn load_bars(&self, asset: &str) -> Result<Vec<Bar>, SweepError> {
        if let Some(reason) = self.errors.get(asset) {
            return Err(SweepError::DataLoad {
                asset: asset.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(asset).cloned().unwrap_or_default())
    }
}

/// Daily bars with open = high = low = close.
pub fn flat_bars(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            timestamp: EPOCH_2021 + i as i64 * DAY,
            open: close,
            high: close,
            low: close,
            close,
        })
        .collect()
}

/// Daily bars around `closes` with a 1% range either side.
pub fn ranged_bars(closes: &[f64]) -> Vec<Bar> {
    flat_bars(closes)
        .into_iter()
        .map(|bar| Bar {
            high: bar.close * 1.01,
            low: bar.close * 0.99,
            ..bar
        })
        .collect()
}

/// `100 + step * i` for `count` bars.
pub fn linear_closes(count: usize, step: f64) -> Vec<f64> {
    (0..count).map(|i| 100.0 + step * i as f64).collect()
}

/// Rises linearly from 100 to 200 over `half` bars, then back to 100.
pub fn double_then_return(half: usize) -> Vec<f64> {
    let up = (0..=half).map(|i| 100.0 + 100.0 * i as f64 / half as f64);
    let down = (1..=half).map(|i| 200.0 - 100.0 * i as f64 / half as f64);
    up.chain(down).collect()
}

/// Deterministic oscillating prices for strategy smoke tests.
pub fn wave_closes(count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| {
            let t = i as f64;
            100.0 + 0.05 * t + 15.0 * (t / 9.0).sin() + 6.0 * (t / 2.3).cos()
        })
        .collect()
}

/// Worst decline from the running peak of `curve`, in percent, recomputed
/// independently of the portfolio's running tracker.
pub fn curve_drawdown(initial_capital: f64, curve: &[EquityPoint]) -> f64 {
    let mut peak = initial_capital;
    let mut worst = 0.0_f64;
    for point in curve {
        peak = peak.max(point.equity);
        if peak > 0.0 {
            worst = worst.min((point.equity - peak) / peak * 100.0);
        }
    }
    worst
}

/// Every asset shares the same timeline starting at index 0.
pub fn market(assets: &[(&str, Vec<Bar>)]) -> MarketData {
    let timeline = assets[0].1.iter().map(|b| b.timestamp).collect();
    let series = assets
        .iter()
        .map(|(name, bars)| PriceSeries::new(*name, bars.clone(), 0))
        .collect();
    MarketData::new(timeline, series)
}

/// Write `bars` as a `<asset>.csv` file in the on-disk layout (milliseconds, `;`).
pub fn write_csv(dir: &Path, asset: &str, bars: &[Bar]) {
    let content: String = bars
        .iter()
        .map(|b| {
            format!(
                "{};{};{};{};{};1\n",
                b.timestamp * 1000,
                b.open,
                b.high,
                b.low,
                b.close
            )
        })
        .collect();
    fs::write(dir.join(format!("{asset}.csv")), content).unwrap();
}
