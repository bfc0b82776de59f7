//! Awesome Oscillator.
//!
//! AO = SMA(median, fast) - SMA(median, slow) with median = (H + L) / 2.
//! The windows are swapped when given in reverse order.
//! Warmup: first (slow-1) points are invalid.

use crate::domain::indicator::rolling::sma_values;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};

pub fn calculate_awesome(highs: &[f64], lows: &[f64], fast: usize, slow: usize) -> IndicatorSeries {
    let (fast, slow) = if fast > slow { (slow, fast) } else { (fast, slow) };
    assert!(fast > 0, "AO periods must be positive");
    assert_eq!(highs.len(), lows.len(), "AO inputs must have equal lengths");
    assert!(
        slow <= highs.len(),
        "AO({fast},{slow}) needs at least {slow} values, got {}",
        highs.len()
    );

    let median: Vec<f64> = highs.iter().zip(lows).map(|(h, l)| (h + l) / 2.0).collect();
    let fast_sma = sma_values(&median, fast);
    let slow_sma = sma_values(&median, slow);
    let offset = slow - fast;
    let values = slow_sma
        .iter()
        .zip(&fast_sma[offset..])
        .map(|(s, f)| f - s)
        .collect();

    IndicatorSeries::from_tail(IndicatorType::Awesome { fast, slow }, highs.len(), values)
}
