//! Stochastic RSI.
//!
//! The stochastic oscillator applied to RSI instead of price:
//! raw = (rsi - min(rsi, w)) / (max(rsi, w) - min(rsi, w)), in [0, 1].
//! A degenerate window (max == min) or a non-finite ratio reads 0.
//!
//! Two flavours:
//! - not averaged: the raw reading rounded to 3 decimals
//! - K/D: K = SMA(raw, k_smooth), D = SMA(K, d_smooth)

use crate::domain::indicator::rolling::{rolling_max, rolling_min, round_to, sma_values};
use crate::domain::indicator::rsi::rsi_values;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};

pub fn calculate_stoch_rsi(
    closes: &[f64],
    stoch_window: usize,
    rsi_period: usize,
) -> IndicatorSeries {
    check_periods(closes, rsi_period, stoch_window);
    let raw: Vec<f64> = raw_stoch_rsi(closes, stoch_window, rsi_period)
        .into_iter()
        .map(|v| round_to(v, 3))
        .collect();
    IndicatorSeries::from_tail(
        IndicatorType::StochRsi {
            stoch_window,
            rsi_period,
        },
        closes.len(),
        raw,
    )
}

pub fn calculate_stoch_rsi_k(
    closes: &[f64],
    rsi_period: usize,
    stoch_period: usize,
    k_smooth: usize,
    d_smooth: usize,
) -> IndicatorSeries {
    check_periods(closes, rsi_period, stoch_period);
    assert!(k_smooth > 0, "StochRSI K smoothing must be positive");
    let raw = raw_stoch_rsi(closes, stoch_period, rsi_period);
    IndicatorSeries::from_tail(
        IndicatorType::StochRsiK {
            rsi_period,
            stoch_period,
            k_smooth,
            d_smooth,
        },
        closes.len(),
        sma_values(&raw, k_smooth),
    )
}

pub fn calculate_stoch_rsi_d(
    closes: &[f64],
    rsi_period: usize,
    stoch_period: usize,
    k_smooth: usize,
    d_smooth: usize,
) -> IndicatorSeries {
    check_periods(closes, rsi_period, stoch_period);
    assert!(
        k_smooth > 0 && d_smooth > 0,
        "StochRSI K/D smoothing must be positive"
    );
    let raw = raw_stoch_rsi(closes, stoch_period, rsi_period);
    let k = sma_values(&raw, k_smooth);
    IndicatorSeries::from_tail(
        IndicatorType::StochRsiD {
            rsi_period,
            stoch_period,
            k_smooth,
            d_smooth,
        },
        closes.len(),
        sma_values(&k, d_smooth),
    )
}

fn check_periods(closes: &[f64], rsi_period: usize, stoch_window: usize) {
    assert!(
        rsi_period > 0 && stoch_window > 0,
        "StochRSI periods must be positive"
    );
    assert!(
        rsi_period < closes.len(),
        "StochRSI RSI({rsi_period}) needs at least {} values, got {}",
        rsi_period + 1,
        closes.len()
    );
}

fn raw_stoch_rsi(closes: &[f64], stoch_window: usize, rsi_period: usize) -> Vec<f64> {
    let rsi = rsi_values(closes, rsi_period);
    let lows = rolling_min(&rsi, stoch_window);
    let highs = rolling_max(&rsi, stoch_window);
    if lows.is_empty() {
        return Vec::new();
    }
    rsi[stoch_window.saturating_sub(1)..]
        .iter()
        .zip(lows.iter().zip(&highs))
        .map(|(&value, (&low, &high))| {
            let ratio = (value - low) / (high - low);
            if ratio.is_finite() { ratio } else { 0.0 }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zigzag(len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| 100.0 + ((i * 7) % 11) as f64 - ((i * 3) % 5) as f64)
            .collect()
    }

    #[test]
    fn stoch_rsi_warmup() {
        let closes = zigzag(40);
        let series = calculate_stoch_rsi(&closes, 14, 14);
        assert_eq!(series.len(), 40);
        // RSI valid from 14, first full window ends at 14 + 13
        assert_eq!(series.warmup(), 27);
    }

    #[test]
    fn stoch_rsi_in_unit_range_and_rounded() {
        let closes = zigzag(80);
        let series = calculate_stoch_rsi(&closes, 5, 6);
        for i in series.warmup()..series.len() {
            let v = series.simple(i).unwrap();
            assert!((0.0..=1.0).contains(&v), "StochRSI {} out of range", v);
            assert!(((v * 1000.0).round() - v * 1000.0).abs() < 1e-9);
        }
    }

    #[test]
    fn stoch_rsi_degenerate_window_is_zero() {
        let series = calculate_stoch_rsi(&[100.0; 30], 5, 5);
        for i in series.warmup()..series.len() {
            assert_eq!(series.simple(i), Some(0.0));
        }
    }

    #[test]
    fn stoch_rsi_monotonic_rise_is_zero() {
        // RSI pinned at 100: every window is flat
        let closes: Vec<f64> = (0..30).map(|i| 10.0 + i as f64).collect();
        let series = calculate_stoch_rsi(&closes, 4, 4);
        for i in series.warmup()..series.len() {
            assert_eq!(series.simple(i), Some(0.0));
        }
    }

    #[test]
    fn k_is_sma_of_raw() {
        let closes = zigzag(60);
        let k = calculate_stoch_rsi_k(&closes, 6, 5, 3, 3);
        assert_eq!(k.warmup(), 6 + 4 + 2);
        for i in k.warmup()..k.len() {
            let v = k.simple(i).unwrap();
            assert!((0.0..=1.0 + 1e-12).contains(&v));
        }
    }

    #[test]
    fn d_trails_k_by_d_smooth() {
        let closes = zigzag(60);
        let k = calculate_stoch_rsi_k(&closes, 6, 5, 3, 3);
        let d = calculate_stoch_rsi_d(&closes, 6, 5, 3, 3);
        assert_eq!(d.warmup(), k.warmup() + 2);

        let i = d.warmup() + 4;
        let expected = (k.simple(i).unwrap() + k.simple(i - 1).unwrap() + k.simple(i - 2).unwrap()) / 3.0;
        assert!((d.simple(i).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn k_and_d_are_zero_once_raw_settles_at_zero() {
        // a steady decline pins RSI at the bottom of every window
        let mut closes = zigzag(40);
        let last = closes[closes.len() - 1];
        closes.extend((1..=20).map(|i| last - i as f64));
        let k = calculate_stoch_rsi_k(&closes, 6, 5, 3, 3);
        let d = calculate_stoch_rsi_d(&closes, 6, 5, 3, 3);
        for i in closes.len() - 8..closes.len() {
            assert_eq!(k.simple(i), Some(0.0), "K at {i}");
            assert_eq!(d.simple(i), Some(0.0), "D at {i}");
        }
    }

    #[test]
    fn short_input_is_unavailable_past_rsi() {
        let closes = zigzag(10);
        let series = calculate_stoch_rsi(&closes, 14, 5);
        assert_eq!(series.len(), 10);
        assert_eq!(series.warmup(), 10);
    }
}
