//! Indicator dispatch over aligned price series.

use tracing::debug;

use crate::domain::indicator::atr::calculate_atr;
use crate::domain::indicator::awesome::calculate_awesome;
use crate::domain::indicator::ema::calculate_ema;
use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::indicator::stoch_rsi::{
    calculate_stoch_rsi, calculate_stoch_rsi_d, calculate_stoch_rsi_k,
};
use crate::domain::indicator::supertrend::calculate_supertrend;
use crate::domain::indicator::trix::calculate_trix;
use crate::domain::indicator::williams_r::calculate_williams_r;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::price_series::PriceSeries;

/// Compute one indicator over the real (non-padded) bars of `series`.
///
/// The result spans the full padded length; padding points are invalid. An asset
/// with fewer real bars than the indicator needs gets a series with no valid point.
pub fn compute_indicator(series: &PriceSeries, kind: IndicatorType) -> IndicatorSeries {
    let real = &series.bars[series.start_index..];
    if real.len() < kind.min_bars() {
        debug!(
            asset = %series.asset,
            indicator = %kind,
            bars = real.len(),
            "not enough bars for indicator"
        );
        return IndicatorSeries::unavailable(kind, series.len());
    }

    let closes: Vec<f64> = real.iter().map(|b| b.close).collect();
    let highs: Vec<f64> = real.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = real.iter().map(|b| b.low).collect();

    let computed = match kind {
        IndicatorType::Sma(period) => calculate_sma(&closes, period),
        IndicatorType::Ema(period) => calculate_ema(&closes, period),
        IndicatorType::Rsi(period) => calculate_rsi(&closes, period),
        IndicatorType::Atr(period) => calculate_atr(&highs, &lows, &closes, period),
        IndicatorType::WilliamsR(period) => calculate_williams_r(&highs, &lows, &closes, period),
        IndicatorType::StochRsi {
            stoch_window,
            rsi_period,
        } => calculate_stoch_rsi(&closes, stoch_window, rsi_period),
        IndicatorType::StochRsiK {
            rsi_period,
            stoch_period,
            k_smooth,
            d_smooth,
        } => calculate_stoch_rsi_k(&closes, rsi_period, stoch_period, k_smooth, d_smooth),
        IndicatorType::StochRsiD {
            rsi_period,
            stoch_period,
            k_smooth,
            d_smooth,
        } => calculate_stoch_rsi_d(&closes, rsi_period, stoch_period, k_smooth, d_smooth),
        IndicatorType::Trix { length, signal } => calculate_trix(&closes, length, signal),
        IndicatorType::Awesome { fast, slow } => calculate_awesome(&highs, &lows, fast, slow),
        IndicatorType::SuperTrend {
            atr_period,
            multiplier_x100,
        } => calculate_supertrend(
            &highs,
            &lows,
            &closes,
            atr_period,
            multiplier_x100 as f64 / 100.0,
        ),
    };

    computed.left_pad(series.start_index)
}
