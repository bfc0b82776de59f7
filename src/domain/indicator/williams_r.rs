//! Williams %R.
//!
//! %R = -100 * (HH - C) / (HH - LL) over the trailing n bars, in [-100, 0].
//! A flat window (HH == LL) reads 0. Warmup: first (n-1) points are invalid.

use crate::domain::indicator::rolling::{rolling_max, rolling_min};
use crate::domain::indicator::{IndicatorSeries, IndicatorType};

pub fn calculate_williams_r(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    period: usize,
) -> IndicatorSeries {
    assert!(period > 0, "Williams %R period must be positive");
    assert!(
        highs.len() == lows.len() && lows.len() == closes.len(),
        "Williams %R inputs must have equal lengths"
    );
    assert!(
        period <= closes.len(),
        "WILLR({period}) needs at least {period} values, got {}",
        closes.len()
    );

    let highest = rolling_max(highs, period);
    let lowest = rolling_min(lows, period);
    let values = closes[period - 1..]
        .iter()
        .zip(highest.iter().zip(&lowest))
        .map(|(&close, (&hh, &ll))| {
            let range = hh - ll;
            if range == 0.0 {
                0.0
            } else {
                -100.0 * (hh - close) / range
            }
        })
        .collect();

    IndicatorSeries::from_tail(IndicatorType::WilliamsR(period), closes.len(), values)
}
