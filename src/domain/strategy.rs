//! Strategy seam of the simulator.
//!
//! A strategy decides, per asset and bar, whether to open or close a long
//! position. It reads prices and precomputed indicators through [`BarContext`];
//! warm-up indicator points read as `None`, and a rule with a missing input is
//! simply not satisfied.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::indicator::supertrend::bands_at;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::Bar;
use crate::domain::position::{EntrySnapshot, Position};
use crate::domain::price_series::PriceSeries;

pub type IndicatorSet = HashMap<IndicatorType, Arc<IndicatorSeries>>;

pub trait Strategy: Send + Sync {
    fn name(&self) -> &str;

    /// Every indicator the rules below read.
    fn required_indicators(&self) -> Vec<IndicatorType>;

    fn should_open(&self, ctx: &BarContext<'_>) -> bool;

    fn should_close(&self, ctx: &BarContext<'_>, position: &Position) -> bool;

    /// Readings stored on the position at entry.
    fn entry_snapshot(&self, _ctx: &BarContext<'_>) -> EntrySnapshot {
        EntrySnapshot::default()
    }

    /// Per-bar update of an open position before its close rule runs.
    fn on_bar(&self, _ctx: &BarContext<'_>, _position: &mut Position) {}
}

/// One asset at one bar.
pub struct BarContext<'a> {
    pub index: usize,
    pub series: &'a PriceSeries,
    pub indicators: &'a IndicatorSet,
}

impl<'a> BarContext<'a> {
    pub fn new(index: usize, series: &'a PriceSeries, indicators: &'a IndicatorSet) -> Self {
        Self {
            index,
            series,
            indicators,
        }
    }

    pub fn bar(&self) -> &Bar {
        &self.series.bars[self.index]
    }

    pub fn close(&self) -> f64 {
        self.bar().close
    }

    pub fn high(&self) -> f64 {
        self.bar().high
    }

    pub fn low(&self) -> f64 {
        self.bar().low
    }

    pub fn timestamp(&self) -> i64 {
        self.bar().timestamp
    }

    /// Indicator reading at the current bar.
    pub fn value(&self, kind: IndicatorType) -> Option<f64> {
        self.value_at(kind, self.index)
    }

    /// Indicator reading at the previous bar.
    pub fn previous(&self, kind: IndicatorType) -> Option<f64> {
        self.index
            .checked_sub(1)
            .and_then(|i| self.value_at(kind, i))
    }

    /// SuperTrend (direction, upper, lower) at the current bar.
    pub fn supertrend(&self, kind: IndicatorType) -> Option<(i8, f64, f64)> {
        self.indicators
            .get(&kind)
            .and_then(|series| bands_at(series, self.index))
    }

    fn value_at(&self, kind: IndicatorType, index: usize) -> Option<f64> {
        self.indicators.get(&kind).and_then(|series| series.simple(index))
    }
}
