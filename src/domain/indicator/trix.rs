//! TRIX histogram.
//!
//! EMA(length) applied three times, each pass starting where the previous one
//! becomes valid. The percent change of the triple EMA is the TRIX line; the
//! output is TRIX - SMA(TRIX, signal). A non-finite percent change reads 0.
//! Warmup: 3*(length-1) + signal points are invalid.

use crate::domain::indicator::rolling::{ema_values, sma_values};
use crate::domain::indicator::{IndicatorSeries, IndicatorType};

pub fn calculate_trix(closes: &[f64], length: usize, signal: usize) -> IndicatorSeries {
    assert!(length > 0 && signal > 0, "TRIX periods must be positive");
    assert!(
        length <= closes.len(),
        "TRIX({length},{signal}) needs at least {length} values, got {}",
        closes.len()
    );

    let first = ema_values(closes, length);
    let second = ema_values(&first, length);
    let third = ema_values(&second, length);

    let pct: Vec<f64> = third
        .windows(2)
        .map(|w| {
            let change = (w[1] - w[0]) / w[0] * 100.0;
            if change.is_finite() { change } else { 0.0 }
        })
        .collect();
    let signal_line = sma_values(&pct, signal);
    let histogram = if signal_line.is_empty() {
        Vec::new()
    } else {
        pct[signal - 1..]
            .iter()
            .zip(&signal_line)
            .map(|(p, s)| p - s)
            .collect()
    };

    IndicatorSeries::from_tail(
        IndicatorType::Trix { length, signal },
        closes.len(),
        histogram,
    )
}
