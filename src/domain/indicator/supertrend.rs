//! SuperTrend with ratcheted bands.
//!
//! Bands are hl2 ± multiplier * ATR(period). The direction starts at +1 on the
//! first bar with an ATR and flips to +1 when the close breaks above the previous
//! upper band, or to -1 when it breaks below the previous lower band.
//!
//! On a bar that breaks neither band the direction holds and the active band
//! only moves with the trend: the lower band never decreases in an uptrend and
//! the upper band never increases in a downtrend. A breakout bar keeps its
//! fresh bands, even when it confirms the current direction.
//!
//! Warmup: first `period` points are invalid (direction 0).

use crate::domain::indicator::atr::atr_values;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};

pub fn calculate_supertrend(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    atr_period: usize,
    multiplier: f64,
) -> IndicatorSeries {
    assert!(atr_period > 0, "SuperTrend ATR period must be positive");
    assert!(
        highs.len() == lows.len() && lows.len() == closes.len(),
        "SuperTrend inputs must have equal lengths"
    );
    assert!(
        atr_period < closes.len(),
        "SuperTrend ATR({atr_period}) needs at least {} values, got {}",
        atr_period + 1,
        closes.len()
    );

    let indicator_type = IndicatorType::supertrend(atr_period, multiplier);
    let atr = atr_values(highs, lows, closes, atr_period);
    let mut values: Vec<IndicatorPoint> = Vec::with_capacity(closes.len());
    values.extend((0..atr_period).map(|_| IndicatorPoint {
        valid: false,
        value: IndicatorValue::SuperTrend {
            direction: 0,
            upper: 0.0,
            lower: 0.0,
        },
    }));

    let mut direction: i8 = 1;
    let mut prev_upper = 0.0;
    let mut prev_lower = 0.0;

    for (offset, &atr_value) in atr.iter().enumerate() {
        let i = atr_period + offset;
        let hl2 = (highs[i] + lows[i]) / 2.0;
        let mut upper = hl2 + multiplier * atr_value;
        let mut lower = hl2 - multiplier * atr_value;

        if offset > 0 {
            if closes[i] > prev_upper {
                direction = 1;
            } else if closes[i] < prev_lower {
                direction = -1;
            } else {
                // hold: only a bar without a breakout ratchets
                if direction > 0 && lower < prev_lower {
                    lower = prev_lower;
                }
                if direction < 0 && upper > prev_upper {
                    upper = prev_upper;
                }
            }
        }

        values.push(IndicatorPoint {
            valid: true,
            value: IndicatorValue::SuperTrend {
                direction,
                upper,
                lower,
            },
        });
        prev_upper = upper;
        prev_lower = lower;
    }

    IndicatorSeries {
        indicator_type,
        values,
    }
}

/// Band pair at `index`, if valid.
pub fn bands_at(series: &IndicatorSeries, index: usize) -> Option<(i8, f64, f64)> {
    match series.get(index)? {
        IndicatorValue::SuperTrend {
            direction,
            upper,
            lower,
        } => Some((direction, upper, lower)),
        IndicatorValue::Simple(_) => None,
    }
}
