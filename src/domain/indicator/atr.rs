//! Average True Range with Wilder smoothing.
//!
//! TR[i] = max(H-L, |H-C[i-1]|, |L-C[i-1]|) needs a previous close, so the first
//! ATR is the mean of TR[1..=n] at index n; afterwards ATR = (prev*(n-1) + TR) / n.
//! Warmup: first n points are invalid.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::Bar;

pub fn calculate_atr(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> IndicatorSeries {
    assert!(period > 0, "ATR period must be positive");
    assert!(
        highs.len() == lows.len() && lows.len() == closes.len(),
        "ATR inputs must have equal lengths"
    );
    assert!(
        period < closes.len(),
        "ATR({period}) needs at least {} values, got {}",
        period + 1,
        closes.len()
    );
    IndicatorSeries::from_tail(
        IndicatorType::Atr(period),
        closes.len(),
        atr_values(highs, lows, closes, period),
    )
}

/// ATR readings from index `period` onward.
pub(crate) fn atr_values(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() <= period {
        return Vec::new();
    }

    let true_ranges: Vec<f64> = (1..closes.len())
        .map(|i| {
            let bar = Bar {
                timestamp: 0,
                open: closes[i],
                high: highs[i],
                low: lows[i],
                close: closes[i],
            };
            bar.true_range(closes[i - 1])
        })
        .collect();

    let n = period as f64;
    let mut atr = true_ranges[..period].iter().sum::<f64>() / n;
    let mut out = Vec::with_capacity(closes.len() - period);
    out.push(atr);
    for &tr in &true_ranges[period..] {
        atr = (atr * (n - 1.0) + tr) / n;
        out.push(atr);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atr_warmup() {
        let highs = [110.0; 6];
        let lows = [90.0; 6];
        let closes = [100.0; 6];
        let series = calculate_atr(&highs, &lows, &closes, 3);

        assert_eq!(series.len(), 6);
        assert_eq!(series.warmup(), 3);
        for i in 3..6 {
            assert!((series.simple(i).unwrap() - 20.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn atr_seed_is_average_of_true_ranges() {
        let highs = [110.0, 115.0, 120.0, 118.0];
        let lows = [100.0, 105.0, 110.0, 100.0];
        let closes = [105.0, 110.0, 115.0, 101.0];
        let series = calculate_atr(&highs, &lows, &closes, 2);

        // TR[1] = max(10, 10, 0) = 10, TR[2] = max(10, 10, 0) = 10
        assert!((series.simple(2).unwrap() - 10.0).abs() < f64::EPSILON);
        // TR[3] = max(18, 3, 15) = 18 → (10 * 1 + 18) / 2
        assert!((series.simple(3).unwrap() - 14.0).abs() < f64::EPSILON);
    }

    #[test]
    fn atr_uses_gaps() {
        let highs = [10.0, 30.0, 31.0];
        let lows = [9.0, 29.0, 30.0];
        let closes = [10.0, 30.0, 30.5];
        let series = calculate_atr(&highs, &lows, &closes, 1);
        // gap up: |30 - 10| = 20
        assert!((series.simple(1).unwrap() - 20.0).abs() < f64::EPSILON);
        assert!((series.simple(2).unwrap() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    #[should_panic(expected = "equal lengths")]
    fn atr_rejects_ragged_inputs() {
        calculate_atr(&[1.0, 2.0], &[1.0], &[1.0, 2.0], 1);
    }
}
